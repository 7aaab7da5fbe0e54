use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(SymptomId);
id_newtype!(RuleId);

/// One catalog entry served by the diagnosis engine. Immutable once
/// fetched; `cf` is the engine's evidence weight and is never used in
/// client logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub id: SymptomId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cf: Option<f64>,
}

/// Styling key derived from the engine's free-form `risk_level`
/// string. Display always uses the verbatim string; this enum only
/// picks a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    Unknown,
}

impl RiskLevel {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            "critical" => RiskLevel::Critical,
            _ => RiskLevel::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Percentage in [0, 100], already aggregated by the engine.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cf_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub maintenance_time: String,
    #[serde(default)]
    pub causes: Vec<String>,
    /// Numbered repair steps; order is part of the contract.
    #[serde(default)]
    pub solutions: Vec<String>,
    #[serde(default)]
    pub tools_required: Vec<String>,
}

impl DiagnosisResult {
    pub fn risk(&self) -> RiskLevel {
        RiskLevel::from_label(&self.risk_level)
    }
}

/// One fired rule in the engine's reasoning trace. `cf` is in [0, 1];
/// steps sharing a conclusion are already combined by the engine and
/// must not be merged again here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub rule_id: RuleId,
    #[serde(default)]
    pub rule_description: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    pub conclusion: String,
    pub cf: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationResponse {
    pub total_diagnoses: usize,
    #[serde(default)]
    pub diagnoses: Vec<DiagnosisResult>,
    #[serde(default)]
    pub reasoning: Vec<ReasoningStep>,
}

/// One knowledge-base rule as listed by the explanation facility
/// endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub id: RuleId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    pub conclusion: String,
    pub cf: f64,
}
