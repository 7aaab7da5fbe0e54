//! Backend->UI events for the consultation workflow.

use shared::domain::{ConsultationResponse, RuleSummary, Symptom};

pub enum UiEvent {
    CatalogLoaded(Vec<Symptom>),
    CatalogFailed(String),
    DiagnosisReady(Box<ConsultationResponse>),
    DiagnosisFailed(String),
    RulesLoaded(Vec<RuleSummary>),
    RulesFailed(String),
}
