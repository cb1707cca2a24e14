use crate::utils::StrategyKind;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Step execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Passed,
    Failed { kind: String, error: String },
    Skipped { reason: String },
    Retrying { attempt: u32, max_attempts: u32 },
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Passed | StepStatus::Failed { .. } | StepStatus::Skipped { .. }
        )
    }
}

/// State for a single step execution
#[derive(Debug, Clone)]
pub struct StepState {
    pub index: usize,
    pub step_text: String,
    pub action_display: String,
    pub optional: bool,
    pub status: StepStatus,
    /// Strategy that produced the element, when one was needed
    pub strategy: Option<StrategyKind>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub duration_ms: Option<u64>,
    pub retry_count: u32,
}

impl StepState {
    pub fn new(index: usize, step_text: &str, action_display: &str, optional: bool) -> Self {
        Self {
            index,
            step_text: step_text.to_string(),
            action_display: action_display.to_string(),
            optional,
            status: StepStatus::Pending,
            strategy: None,
            started_at: None,
            finished_at: None,
            duration_ms: None,
            retry_count: 0,
        }
    }

    pub fn start(&mut self) {
        self.status = StepStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self, strategy: Option<StrategyKind>) {
        self.strategy = strategy;
        self.finish(StepStatus::Passed);
    }

    pub fn fail(&mut self, kind: &str, error: String) {
        self.finish(StepStatus::Failed {
            kind: kind.to_string(),
            error,
        });
    }

    pub fn skip(&mut self, reason: String) {
        self.status = StepStatus::Skipped { reason };
    }

    pub fn retry(&mut self, attempt: u32, max_attempts: u32) {
        self.status = StepStatus::Retrying {
            attempt,
            max_attempts,
        };
        self.retry_count = attempt;
    }

    fn finish(&mut self, status: StepStatus) {
        self.status = status;
        self.finished_at = Some(Instant::now());
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    /// Serialize state for reporting (without Instant which isn't serializable)
    pub fn to_report(&self) -> StepStateReport {
        StepStateReport {
            index: self.index,
            step_text: self.step_text.clone(),
            action_display: self.action_display.clone(),
            optional: self.optional,
            status: self.status.clone(),
            strategy: self.strategy,
            duration_ms: self.duration_ms,
            retry_count: self.retry_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStateReport {
    pub index: usize,
    pub step_text: String,
    pub action_display: String,
    pub optional: bool,
    pub status: StepStatus,
    pub strategy: Option<StrategyKind>,
    pub duration_ms: Option<u64>,
    pub retry_count: u32,
}

/// State for one scenario execution
#[derive(Debug, Clone)]
pub struct ScenarioState {
    pub scenario_name: String,
    pub feature_path: String,
    pub tags: Vec<String>,
    pub status: ScenarioStatus,
    pub steps: Vec<StepState>,
    pub current_index: usize,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub total_duration_ms: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScenarioStatus {
    Pending,
    Running,
    Passed,
    Failed,
}

impl ScenarioState {
    pub fn new(name: &str, path: &str, tags: Vec<String>, steps: Vec<StepState>) -> Self {
        Self {
            scenario_name: name.to_string(),
            feature_path: path.to_string(),
            tags,
            status: ScenarioStatus::Pending,
            steps,
            current_index: 0,
            started_at: None,
            finished_at: None,
            total_duration_ms: None,
            error: None,
        }
    }

    pub fn start(&mut self) {
        self.status = ScenarioStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn current_step(&mut self) -> Option<&mut StepState> {
        self.steps.get_mut(self.current_index)
    }

    pub fn advance(&mut self) -> bool {
        self.current_index += 1;
        self.current_index < self.steps.len()
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
        if let Some(start) = self.started_at {
            self.total_duration_ms = Some(start.elapsed().as_millis() as u64);
        }

        // One non-optional failure fails the scenario; optional-step
        // failures are recorded but never count, and skipped steps do not
        // alter the outcome
        let failed = self
            .steps
            .iter()
            .any(|step| matches!(step.status, StepStatus::Failed { .. }) && !step.optional);

        self.status = if failed {
            ScenarioStatus::Failed
        } else {
            ScenarioStatus::Passed
        };
    }

    pub fn skip_remaining(&mut self, reason: &str) {
        for step in &mut self.steps[self.current_index..] {
            if matches!(step.status, StepStatus::Pending) {
                step.skip(reason.to_string());
            }
        }
    }

    /// Serialize state for reporting
    pub fn to_report(&self) -> ScenarioStateReport {
        ScenarioStateReport {
            scenario_name: self.scenario_name.clone(),
            feature_path: self.feature_path.clone(),
            tags: self.tags.clone(),
            status: self.status.clone(),
            steps: self.steps.iter().map(|s| s.to_report()).collect(),
            total_duration_ms: self.total_duration_ms,
            error: self.error.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioStateReport {
    pub scenario_name: String,
    pub feature_path: String,
    pub tags: Vec<String>,
    pub status: ScenarioStatus,
    pub steps: Vec<StepStateReport>,
    pub total_duration_ms: Option<u64>,
    pub error: Option<String>,
}

/// Global test session state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: String,
    pub scenarios: Vec<ScenarioState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl SessionState {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            scenarios: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn add_scenario(&mut self, scenario: ScenarioState) {
        self.scenarios.push(scenario);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn summary(&self) -> RunSummary {
        let mut total_steps = 0;
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for scenario in &self.scenarios {
            for step in &scenario.steps {
                total_steps += 1;
                match step.status {
                    StepStatus::Passed => passed += 1,
                    StepStatus::Failed { .. } => failed += 1,
                    StepStatus::Skipped { .. } => skipped += 1,
                    _ => {}
                }
            }
        }

        let total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        RunSummary {
            session_id: self.session_id.clone(),
            total_scenarios: self.scenarios.len() as u32,
            total_steps,
            passed,
            failed,
            skipped,
            total_duration_ms,
        }
    }

    /// Serialize state for reporting
    pub fn to_report(&self) -> SessionReport {
        SessionReport {
            session_id: self.session_id.clone(),
            scenarios: self.scenarios.iter().map(|s| s.to_report()).collect(),
            summary: self.summary(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub session_id: String,
    pub total_scenarios: u32,
    pub total_steps: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total_duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    pub scenarios: Vec<ScenarioStateReport>,
    pub summary: RunSummary,
}
