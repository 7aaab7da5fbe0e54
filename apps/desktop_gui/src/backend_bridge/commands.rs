//! Backend commands queued from UI to the backend worker.

use shared::domain::SymptomId;

pub enum BackendCommand {
    LoadCatalog,
    RunDiagnosis {
        /// Snapshot of the selection at submit time; later toggles
        /// must not affect an in-flight request.
        symptoms: Vec<SymptomId>,
    },
    FetchRules,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadCatalog => "load_catalog",
            BackendCommand::RunDiagnosis { .. } => "run_diagnosis",
            BackendCommand::FetchRules => "fetch_rules",
        }
    }
}
