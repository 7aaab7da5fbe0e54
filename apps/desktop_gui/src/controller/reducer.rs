//! Consultation workflow state machine. Owns all mutable UI state and
//! is independent of any rendering surface, so every transition is
//! unit-testable.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use shared::domain::{ConsultationResponse, RuleSummary, Symptom, SymptomId};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Transient banners disappear after this long, matching the
/// original front end's five-second dismissal.
pub const BANNER_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Selecting,
    Submitting,
    Presenting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Banner {
    pub text: String,
    pub severity: BannerSeverity,
    raised_at: Instant,
    /// Persistent banners (catalog failures) never auto-expire.
    persistent: bool,
}

impl Banner {
    fn transient(text: String, severity: BannerSeverity, now: Instant) -> Self {
        Self {
            text,
            severity,
            raised_at: now,
            persistent: false,
        }
    }

    fn persistent(text: String, now: Instant) -> Self {
        Self {
            text,
            severity: BannerSeverity::Error,
            raised_at: now,
            persistent: true,
        }
    }

    fn expired(&self, now: Instant) -> bool {
        !self.persistent && now.duration_since(self.raised_at) >= BANNER_TTL
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Full symptom catalog plus the live search query. Filtering is
/// recomputed on every call; there is no cache to go stale.
#[derive(Debug, Default)]
pub struct CatalogStore {
    symptoms: Vec<Symptom>,
    pub query: String,
}

impl CatalogStore {
    fn replace(&mut self, symptoms: Vec<Symptom>) {
        self.symptoms = symptoms;
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    pub fn is_known(&self, id: &SymptomId) -> bool {
        self.symptoms.iter().any(|s| &s.id == id)
    }

    /// Case-insensitive substring match against both id and name; an
    /// empty query yields the whole catalog in service order.
    pub fn filtered(&self) -> Vec<&Symptom> {
        let needle = self.query.trim().to_lowercase();
        self.symptoms
            .iter()
            .filter(|s| {
                needle.is_empty()
                    || s.id.as_str().to_lowercase().contains(&needle)
                    || s.name.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

/// The set of currently chosen symptom ids. Only valid catalog ids
/// ever enter; unknown ids are dropped by the controller before they
/// reach this set.
#[derive(Debug, Default)]
pub struct SelectionState {
    chosen: HashSet<SymptomId>,
}

impl SelectionState {
    pub fn toggle(&mut self, id: SymptomId, selected: bool) {
        if selected {
            self.chosen.insert(id);
        } else {
            self.chosen.remove(&id);
        }
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
    }

    pub fn contains(&self, id: &SymptomId) -> bool {
        self.chosen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// Detached copy for an outgoing request; sorted so request bodies
    /// are deterministic (the service matches order-independently).
    pub fn snapshot(&self) -> Vec<SymptomId> {
        let mut ids: Vec<SymptomId> = self.chosen.iter().cloned().collect();
        ids.sort();
        ids
    }
}

pub struct ConsultationController {
    pub phase: Phase,
    pub catalog: CatalogStore,
    pub catalog_status: CatalogStatus,
    pub selection: SelectionState,
    pub response: Option<ConsultationResponse>,
    pub banner: Option<Banner>,
    pub show_reasoning: bool,
    pub rules: Option<Vec<RuleSummary>>,
    pub show_rules: bool,
}

impl ConsultationController {
    pub fn new() -> Self {
        Self {
            phase: Phase::Selecting,
            catalog: CatalogStore::default(),
            catalog_status: CatalogStatus::Loading,
            selection: SelectionState::default(),
            response: None,
            banner: None,
            show_reasoning: false,
            rules: None,
            show_rules: false,
        }
    }

    /// Toggles a symptom. Unknown ids are ignored outright; the grid
    /// only renders catalog entries, so this guard is defensive.
    pub fn toggle_symptom(&mut self, id: SymptomId, selected: bool) {
        if !self.catalog.is_known(&id) {
            tracing::debug!(%id, "ignoring toggle for unknown symptom id");
            return;
        }
        self.selection.toggle(id, selected);
    }

    /// The run control is enabled iff at least one symptom is chosen.
    pub fn run_enabled(&self) -> bool {
        !self.selection.is_empty()
    }

    /// `Selecting -> Submitting`. Returns the command to queue, or
    /// `None` when the transition is rejected (wrong phase or empty
    /// selection). Rejection never touches the network.
    pub fn start_diagnosis(&mut self, now: Instant) -> Option<BackendCommand> {
        if self.phase != Phase::Selecting {
            return None;
        }
        if self.selection.is_empty() {
            self.raise(
                "Select at least one symptom first.",
                BannerSeverity::Warning,
                now,
            );
            return None;
        }
        self.phase = Phase::Submitting;
        Some(BackendCommand::RunDiagnosis {
            symptoms: self.selection.snapshot(),
        })
    }

    /// Clears selection and search query without leaving `Selecting`.
    pub fn reset_selection(&mut self) {
        if self.phase != Phase::Selecting {
            return;
        }
        self.selection.clear();
        self.catalog.query.clear();
    }

    /// `Presenting -> Selecting`: drops the stored response and starts
    /// a fresh cycle.
    pub fn new_consultation(&mut self) {
        if self.phase != Phase::Presenting {
            return;
        }
        self.response = None;
        self.show_reasoning = false;
        self.selection.clear();
        self.catalog.query.clear();
        self.phase = Phase::Selecting;
    }

    /// Re-issues the catalog fetch after a `CatalogUnavailable`.
    pub fn retry_catalog(&mut self) -> BackendCommand {
        self.catalog_status = CatalogStatus::Loading;
        self.banner = None;
        BackendCommand::LoadCatalog
    }

    /// Opens the knowledge-base browser, fetching the rule list the
    /// first time around.
    pub fn open_rules(&mut self) -> Option<BackendCommand> {
        if self.rules.is_some() {
            self.show_rules = true;
            return None;
        }
        Some(BackendCommand::FetchRules)
    }

    pub fn apply(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::CatalogLoaded(symptoms) => {
                self.catalog.replace(symptoms);
                self.catalog_status = CatalogStatus::Ready;
            }
            UiEvent::CatalogFailed(reason) => {
                self.catalog_status = CatalogStatus::Failed(reason.clone());
                self.banner = Some(Banner::persistent(reason, now));
            }
            UiEvent::DiagnosisReady(consultation) => {
                if self.phase != Phase::Submitting {
                    tracing::warn!("dropping diagnosis response outside Submitting");
                    return;
                }
                self.response = Some(*consultation);
                self.show_reasoning = false;
                self.phase = Phase::Presenting;
            }
            UiEvent::DiagnosisFailed(reason) => {
                if self.phase != Phase::Submitting {
                    tracing::warn!("dropping diagnosis failure outside Submitting");
                    return;
                }
                // Selection is preserved so the user can retry as-is.
                self.phase = Phase::Selecting;
                self.raise(reason, BannerSeverity::Error, now);
            }
            UiEvent::RulesLoaded(rules) => {
                self.rules = Some(rules);
                self.show_rules = true;
            }
            UiEvent::RulesFailed(reason) => {
                self.raise(reason, BannerSeverity::Error, now);
            }
        }
    }

    pub fn raise(&mut self, text: impl Into<String>, severity: BannerSeverity, now: Instant) {
        self.banner = Some(Banner::transient(text.into(), severity, now));
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Drops an expired transient banner. Called once per frame.
    pub fn tick(&mut self, now: Instant) {
        if self.banner.as_ref().is_some_and(|b| b.expired(now)) {
            self.banner = None;
        }
    }
}

impl Default for ConsultationController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symptom(id: &str, name: &str) -> Symptom {
        Symptom {
            id: SymptomId::new(id),
            name: name.to_string(),
            cf: None,
        }
    }

    fn loaded_controller() -> ConsultationController {
        let mut controller = ConsultationController::new();
        controller.apply(
            UiEvent::CatalogLoaded(vec![
                symptom("S1", "Overheating"),
                symptom("S2", "Noise"),
                symptom("S3", "Vibration"),
            ]),
            Instant::now(),
        );
        controller
    }

    fn one_block_response(confidence: f64) -> ConsultationResponse {
        ConsultationResponse {
            total_diagnoses: 1,
            diagnoses: vec![shared::domain::DiagnosisResult {
                name: "Overheated spindle".to_string(),
                description: String::new(),
                confidence,
                cf_value: None,
                severity: None,
                risk_level: "HIGH".to_string(),
                maintenance_time: String::new(),
                causes: vec![],
                solutions: vec![],
                tools_required: vec![],
            }],
            reasoning: vec![shared::domain::ReasoningStep {
                rule_id: shared::domain::RuleId::new("R1"),
                rule_description: String::new(),
                evidence: vec![],
                conclusion: "overheated_spindle".to_string(),
                cf: confidence / 100.0,
            }],
        }
    }

    #[test]
    fn toggle_replay_yields_odd_parity_set_and_ignores_unknown_ids() {
        let mut controller = loaded_controller();

        // S1 toggled three times on/off/on, S2 once, S3 twice, plus an
        // id that is not in the catalog at all.
        controller.toggle_symptom(SymptomId::new("S1"), true);
        controller.toggle_symptom(SymptomId::new("S1"), false);
        controller.toggle_symptom(SymptomId::new("S1"), true);
        controller.toggle_symptom(SymptomId::new("S2"), true);
        controller.toggle_symptom(SymptomId::new("S3"), true);
        controller.toggle_symptom(SymptomId::new("S3"), false);
        controller.toggle_symptom(SymptomId::new("BOGUS"), true);

        assert_eq!(controller.selection.len(), 2);
        assert!(controller.selection.contains(&SymptomId::new("S1")));
        assert!(controller.selection.contains(&SymptomId::new("S2")));
        assert!(!controller.selection.contains(&SymptomId::new("BOGUS")));
    }

    #[test]
    fn toggle_to_selected_is_idempotent() {
        let mut controller = loaded_controller();
        controller.toggle_symptom(SymptomId::new("S1"), true);
        controller.toggle_symptom(SymptomId::new("S1"), true);
        assert_eq!(controller.selection.len(), 1);
    }

    #[test]
    fn run_enabled_tracks_selection_emptiness() {
        let mut controller = loaded_controller();
        assert!(!controller.run_enabled());
        controller.toggle_symptom(SymptomId::new("S1"), true);
        assert!(controller.run_enabled());
        controller.toggle_symptom(SymptomId::new("S1"), false);
        assert!(!controller.run_enabled());
    }

    #[test]
    fn empty_selection_rejects_run_with_warning_and_no_command() {
        let mut controller = loaded_controller();
        let cmd = controller.start_diagnosis(Instant::now());
        assert!(cmd.is_none());
        assert_eq!(controller.phase, Phase::Selecting);
        let banner = controller.banner.as_ref().expect("warning banner");
        assert_eq!(banner.severity, BannerSeverity::Warning);
    }

    #[test]
    fn start_diagnosis_snapshots_selection_and_enters_submitting() {
        let mut controller = loaded_controller();
        controller.toggle_symptom(SymptomId::new("S2"), true);
        controller.toggle_symptom(SymptomId::new("S1"), true);

        let cmd = controller.start_diagnosis(Instant::now()).expect("command");
        assert_eq!(controller.phase, Phase::Submitting);
        let BackendCommand::RunDiagnosis { symptoms } = cmd else {
            panic!("expected RunDiagnosis");
        };
        assert_eq!(symptoms, vec![SymptomId::new("S1"), SymptomId::new("S2")]);

        // Later toggles are impossible through the UI while Submitting,
        // but even a direct mutation cannot touch the snapshot already
        // handed to the bridge.
        controller.selection.toggle(SymptomId::new("S3"), true);
        assert_eq!(symptoms.len(), 2);
    }

    #[test]
    fn second_run_while_submitting_is_rejected() {
        let mut controller = loaded_controller();
        controller.toggle_symptom(SymptomId::new("S1"), true);
        assert!(controller.start_diagnosis(Instant::now()).is_some());
        assert_eq!(controller.phase, Phase::Submitting);
        assert!(controller.start_diagnosis(Instant::now()).is_none());
        assert_eq!(controller.phase, Phase::Submitting);
    }

    #[test]
    fn success_response_moves_to_presenting_with_stored_response() {
        let mut controller = loaded_controller();
        controller.toggle_symptom(SymptomId::new("S1"), true);
        controller.start_diagnosis(Instant::now());

        controller.apply(
            UiEvent::DiagnosisReady(Box::new(one_block_response(87.0))),
            Instant::now(),
        );
        assert_eq!(controller.phase, Phase::Presenting);
        let response = controller.response.as_ref().expect("stored response");
        assert_eq!(response.diagnoses[0].confidence, 87.0);
    }

    #[test]
    fn failure_returns_to_selecting_with_selection_preserved() {
        let mut controller = loaded_controller();
        controller.toggle_symptom(SymptomId::new("S1"), true);
        controller.start_diagnosis(Instant::now());

        controller.apply(
            UiEvent::DiagnosisFailed("diagnosis request failed: timeout".to_string()),
            Instant::now(),
        );
        assert_eq!(controller.phase, Phase::Selecting);
        assert!(controller.selection.contains(&SymptomId::new("S1")));
        let banner = controller.banner.as_ref().expect("error banner");
        assert_eq!(banner.severity, BannerSeverity::Error);
        assert!(banner.text.contains("timeout"));
    }

    #[test]
    fn new_consultation_discards_response_selection_and_query() {
        let mut controller = loaded_controller();
        controller.toggle_symptom(SymptomId::new("S1"), true);
        controller.catalog.query = "over".to_string();
        controller.start_diagnosis(Instant::now());
        controller.apply(
            UiEvent::DiagnosisReady(Box::new(one_block_response(50.0))),
            Instant::now(),
        );

        controller.new_consultation();
        assert_eq!(controller.phase, Phase::Selecting);
        assert!(controller.response.is_none());
        assert!(controller.selection.is_empty());
        assert!(controller.catalog.query.is_empty());
    }

    #[test]
    fn reset_only_acts_in_selecting() {
        let mut controller = loaded_controller();
        controller.toggle_symptom(SymptomId::new("S1"), true);
        controller.start_diagnosis(Instant::now());

        controller.reset_selection();
        assert_eq!(controller.selection.len(), 1);

        controller.apply(
            UiEvent::DiagnosisFailed("boom".to_string()),
            Instant::now(),
        );
        controller.catalog.query = "noise".to_string();
        controller.reset_selection();
        assert!(controller.selection.is_empty());
        assert!(controller.catalog.query.is_empty());
        assert_eq!(controller.phase, Phase::Selecting);
    }

    #[test]
    fn catalog_failure_raises_persistent_banner_and_keeps_store_empty() {
        let mut controller = ConsultationController::new();
        let raised = Instant::now();
        controller.apply(UiEvent::CatalogFailed("connect refused".to_string()), raised);

        assert!(controller.catalog.is_empty());
        assert!(matches!(controller.catalog_status, CatalogStatus::Failed(_)));

        // Persistent banners survive well past the transient TTL.
        controller.tick(raised + BANNER_TTL * 4);
        assert!(controller.banner.is_some());
    }

    #[test]
    fn transient_banner_auto_expires() {
        let mut controller = loaded_controller();
        let raised = Instant::now();
        controller.raise("heads up", BannerSeverity::Info, raised);

        controller.tick(raised + Duration::from_secs(1));
        assert!(controller.banner.is_some());
        controller.tick(raised + BANNER_TTL);
        assert!(controller.banner.is_none());
    }

    #[test]
    fn filter_matches_id_and_name_case_insensitively() {
        let controller = loaded_controller();
        let store = &controller.catalog;

        let mut with_query = CatalogStore {
            symptoms: store.filtered().into_iter().cloned().collect(),
            query: "s2".to_string(),
        };
        assert_eq!(with_query.filtered().len(), 1);
        assert_eq!(with_query.filtered()[0].name, "Noise");

        with_query.query = "VIBRA".to_string();
        assert_eq!(with_query.filtered().len(), 1);
        assert_eq!(with_query.filtered()[0].id, SymptomId::new("S3"));

        with_query.query.clear();
        assert_eq!(with_query.filtered().len(), 3);

        with_query.query = "no such thing".to_string();
        assert!(with_query.filtered().is_empty());
    }

    #[test]
    fn rules_are_fetched_once_then_cached() {
        let mut controller = loaded_controller();
        assert!(matches!(
            controller.open_rules(),
            Some(BackendCommand::FetchRules)
        ));

        controller.apply(UiEvent::RulesLoaded(vec![]), Instant::now());
        assert!(controller.show_rules);

        controller.show_rules = false;
        assert!(controller.open_rules().is_none());
        assert!(controller.show_rules);
    }

    #[test]
    fn stale_diagnosis_events_outside_submitting_are_dropped() {
        let mut controller = loaded_controller();
        controller.apply(
            UiEvent::DiagnosisReady(Box::new(one_block_response(10.0))),
            Instant::now(),
        );
        assert_eq!(controller.phase, Phase::Selecting);
        assert!(controller.response.is_none());
    }
}
