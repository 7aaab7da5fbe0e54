//! Pure mappings from service responses to presentation trees. No
//! egui types here; the builders are asserted on directly in tests
//! and painted by `ui::app`.

use shared::domain::{ConsultationResponse, ReasoningStep, RiskLevel, RuleSummary};

/// Accent tags cycle by rank for visual grouping only; five entries,
/// like the original front end's palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentColor {
    Blue,
    Gray,
    Green,
    Amber,
    Teal,
}

pub const ACCENT_PALETTE: [AccentColor; 5] = [
    AccentColor::Blue,
    AccentColor::Gray,
    AccentColor::Green,
    AccentColor::Amber,
    AccentColor::Teal,
];

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    /// Zero matches is an informational state, never an empty list.
    NoMatch { title: String, detail: String },
    Ranked {
        summary: String,
        blocks: Vec<DiagnosisBlock>,
        /// The reasoning control only appears when steps exist.
        has_reasoning: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisBlock {
    pub rank: usize,
    pub accent: AccentColor,
    pub name: String,
    pub description: String,
    pub confidence_label: String,
    /// Fill fraction for the confidence bar, clamped to [0, 1].
    pub confidence_fraction: f32,
    /// Verbatim service string; `risk` is the styling key only.
    pub risk_label: String,
    pub risk: RiskLevel,
    pub maintenance_time: String,
    pub causes: Vec<String>,
    pub solutions: Vec<String>,
    pub tools_required: Vec<String>,
}

pub fn build_results_view(consultation: &ConsultationResponse) -> ResultsView {
    if consultation.total_diagnoses == 0 || consultation.diagnoses.is_empty() {
        return ResultsView::NoMatch {
            title: "No matching diagnosis".to_string(),
            detail: "The selected symptoms do not match any rule in the knowledge base."
                .to_string(),
        };
    }

    let blocks = consultation
        .diagnoses
        .iter()
        .enumerate()
        .map(|(rank, diagnosis)| DiagnosisBlock {
            rank,
            accent: ACCENT_PALETTE[rank % ACCENT_PALETTE.len()],
            name: diagnosis.name.clone(),
            description: diagnosis.description.clone(),
            confidence_label: format!("{}%", diagnosis.confidence),
            confidence_fraction: (diagnosis.confidence / 100.0).clamp(0.0, 1.0) as f32,
            risk_label: diagnosis.risk_level.clone(),
            risk: diagnosis.risk(),
            maintenance_time: diagnosis.maintenance_time.clone(),
            causes: diagnosis.causes.clone(),
            solutions: diagnosis.solutions.clone(),
            tools_required: diagnosis.tools_required.clone(),
        })
        .collect();

    ResultsView::Ranked {
        summary: format!(
            "Found {} possible diagnosis(es)",
            consultation.total_diagnoses
        ),
        blocks,
        has_reasoning: !consultation.reasoning.is_empty(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationTable {
    pub rows: Vec<ExplanationRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationRow {
    pub rule_id: String,
    pub description: String,
    pub evidence: String,
    pub conclusion: String,
    pub cf_percent: String,
}

/// One row per fired rule, in engine order. Duplicate rule firings
/// stay separate rows; merging is the engine's business.
pub fn build_explanation_table(steps: &[ReasoningStep]) -> ExplanationTable {
    ExplanationTable {
        rows: steps
            .iter()
            .map(|step| ExplanationRow {
                rule_id: step.rule_id.to_string(),
                description: step.rule_description.clone(),
                evidence: step.evidence.join(", "),
                conclusion: step.conclusion.clone(),
                cf_percent: format_cf_percent(step.cf),
            })
            .collect(),
    }
}

/// CF in [0, 1] rendered as a percentage with exactly two decimals.
pub fn format_cf_percent(cf: f64) -> String {
    format!("{:.2}%", cf * 100.0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesTable {
    pub rows: Vec<RuleRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRow {
    pub id: String,
    pub description: String,
    pub conditions: String,
    pub conclusion: String,
    pub cf_percent: String,
}

pub fn build_rules_table(rules: &[RuleSummary]) -> RulesTable {
    RulesTable {
        rows: rules
            .iter()
            .map(|rule| RuleRow {
                id: rule.id.to_string(),
                description: rule.description.clone(),
                conditions: rule.conditions.join(", "),
                conclusion: rule.conclusion.clone(),
                cf_percent: format_cf_percent(rule.cf),
            })
            .collect(),
    }
}
