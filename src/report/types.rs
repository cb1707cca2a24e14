use crate::runner::state::{RunSummary, ScenarioStateReport, SessionReport};
use serde::{Deserialize, Serialize};

/// Test results for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub session_id: String,
    pub scenarios: Vec<ScenarioStateReport>,
    pub summary: RunSummary,
    pub generated_at: String,
}

impl TestResults {
    pub fn from_session(session: SessionReport) -> Self {
        Self {
            session_id: session.session_id.clone(),
            scenarios: session.scenarios,
            summary: session.summary,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
