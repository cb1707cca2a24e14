use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::context::VariableStore;
use super::dispatch::dispatch;
use super::events::{ConsoleEventListener, EventEmitter, TestEvent};
use super::state::{ScenarioState, SessionReport, SessionState, StepState};
use crate::driver::UiDriver;
use crate::error::{EngineError, EngineResult};
use crate::parser::feature::parse_feature_file;
use crate::parser::types::{Action, Scenario, Step};
use crate::parser::StepParser;
use crate::resolver::{Descriptor, ElementKind, Resolver, UiSnapshot};
use crate::utils::{EngineConfig, StrategyKind};

pub struct TestExecutor {
    driver: Box<dyn UiDriver>,
    config: EngineConfig,
    parser: StepParser,
    resolver: Arc<Resolver>,
    session: SessionState,
    emitter: EventEmitter,
    continue_on_failure: bool,
    target_tags: Option<Vec<String>>,
    cancelled: Arc<AtomicBool>,
}

/// What a successful step execution reports back.
struct StepOutcome {
    strategy: Option<StrategyKind>,
}

impl TestExecutor {
    pub fn new(
        driver: Box<dyn UiDriver>,
        config: EngineConfig,
        resolver: Resolver,
        continue_on_failure: bool,
        target_tags: Option<Vec<String>>,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        let (emitter, receiver) = EventEmitter::new();

        // Start console listener in background
        tokio::spawn(ConsoleEventListener::listen(receiver));

        let mut session = SessionState::new(&Uuid::new_v4().to_string());
        session.start();

        Self {
            driver,
            config,
            parser: StepParser::new(),
            resolver: Arc::new(resolver),
            session,
            emitter,
            continue_on_failure,
            target_tags,
            cancelled,
        }
    }

    /// Subscribe to test execution events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<TestEvent> {
        self.emitter.subscribe()
    }

    pub fn announce(&self) {
        self.emitter.emit(TestEvent::SessionStarted {
            session_id: self.session.session_id.clone(),
        });
    }

    /// Run every scenario in a single feature file
    pub async fn run_file(&mut self, path: &Path) -> Result<()> {
        let feature = parse_feature_file(path)?;
        let feature_path = path.display().to_string();

        for scenario in &feature.scenarios {
            if self.cancelled.load(Ordering::SeqCst) {
                self.emitter.emit(TestEvent::Log {
                    message: format!("{} Run cancelled, stopping", "ℹ".blue()),
                });
                break;
            }

            if let Some(ref required_tags) = self.target_tags {
                let matches_all = required_tags.iter().all(|req| scenario.tags.contains(req));
                if !matches_all {
                    self.emitter.emit(TestEvent::Log {
                        message: format!(
                            "{} Skipping scenario \"{}\" due to tag mismatch. Required: {:?}, tags: {:?}",
                            "ℹ".blue(),
                            scenario.name,
                            required_tags,
                            scenario.tags
                        ),
                    });
                    continue;
                }
            }

            let failed = self.run_scenario(scenario, &feature_path).await?;
            if failed && !self.continue_on_failure {
                anyhow::bail!("Scenario failed: {}", scenario.name);
            }
        }

        Ok(())
    }

    /// Run one scenario; returns whether it ended in failure.
    async fn run_scenario(&mut self, scenario: &Scenario, feature_path: &str) -> Result<bool> {
        let step_states: Vec<StepState> = scenario
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| StepState::new(i, &step.raw, &step.text, step.directives.optional))
            .collect();

        let mut scenario_state = ScenarioState::new(
            &scenario.name,
            feature_path,
            scenario.tags.clone(),
            step_states,
        );

        self.emitter.emit(TestEvent::ScenarioStarted {
            scenario_name: scenario.name.clone(),
            feature_path: feature_path.to_string(),
            step_count: scenario.steps.len(),
        });

        scenario_state.start();

        // Bindings never outlive the scenario
        let mut store = VariableStore::new();

        for (i, step) in scenario.steps.iter().enumerate() {
            if self.cancelled.load(Ordering::SeqCst) {
                scenario_state.skip_remaining("run cancelled");
                break;
            }

            if let Some(step_state) = scenario_state.steps.get_mut(i) {
                step_state.start();

                self.emitter.emit(TestEvent::StepStarted {
                    scenario_name: scenario.name.clone(),
                    index: i,
                    step: step.text.clone(),
                });
            }

            let result = self
                .execute_step(step, &mut store, &scenario.name, i, &mut scenario_state)
                .await;

            let step_state = &mut scenario_state.steps[i];
            match result {
                Ok(outcome) => {
                    step_state.pass(outcome.strategy);
                    let duration = step_state.duration_ms.unwrap_or(0);
                    self.emitter.emit(TestEvent::StepPassed {
                        scenario_name: scenario.name.clone(),
                        index: i,
                        strategy: outcome.strategy.map(|s| s.as_str()),
                        duration_ms: duration,
                    });
                }
                Err(e) => {
                    step_state.fail(e.kind(), e.to_string());
                    let duration = step_state.duration_ms.unwrap_or(0);
                    self.emitter.emit(TestEvent::StepFailed {
                        scenario_name: scenario.name.clone(),
                        index: i,
                        error: e.to_string(),
                        duration_ms: duration,
                    });

                    if step.directives.optional {
                        self.emitter.emit(TestEvent::Log {
                            message: format!(
                                "{} Optional step failed, continuing: {}",
                                "⚠".yellow(),
                                e
                            ),
                        });
                    } else {
                        scenario_state.current_index = i + 1;
                        scenario_state.skip_remaining("previous step failed");
                        for skipped in &scenario_state.steps[i + 1..] {
                            self.emitter.emit(TestEvent::StepSkipped {
                                scenario_name: scenario.name.clone(),
                                index: skipped.index,
                                reason: "previous step failed".to_string(),
                            });
                        }
                        break;
                    }
                }
            }

            scenario_state.current_index = i + 1;
        }

        scenario_state.finish();

        let status = scenario_state.status.clone();
        self.emitter.emit(TestEvent::ScenarioFinished {
            scenario_name: scenario.name.clone(),
            status: status.clone(),
            duration_ms: scenario_state.total_duration_ms,
        });

        let failed = status != super::state::ScenarioStatus::Passed;
        self.session.add_scenario(scenario_state);
        Ok(failed)
    }

    /// Execute a single step: parse, substitute variables, resolve the
    /// target if one is needed, then dispatch.
    async fn execute_step(
        &mut self,
        step: &Step,
        store: &mut VariableStore,
        scenario_name: &str,
        index: usize,
        scenario_state: &mut ScenarioState,
    ) -> EngineResult<StepOutcome> {
        let action = self.parser.parse(&step.text)?;
        let action = store.resolve_action(&action)?;
        log::debug!("executing {}", action.display_name());

        // Variable-store actions run without touching the UI
        match &action {
            Action::GenerateDatetime { expression, name } => {
                let value = store.generate_datetime(expression, name, chrono::Local::now())?;
                self.emitter.emit(TestEvent::Log {
                    message: format!("${{{name}}} = {value}"),
                });
                return Ok(StepOutcome { strategy: None });
            }
            Action::StoreVariable { name, value } => {
                store.set(name, value.clone());
                return Ok(StepOutcome { strategy: None });
            }
            _ => {}
        }

        let force = step.directives.force_strategy;
        let max_attempts = self.config.resolve_retries + 1;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let result = self.try_step(&action, force).await;
            match result {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    self.emitter.emit(TestEvent::StepRetrying {
                        scenario_name: scenario_name.to_string(),
                        index,
                        attempt,
                        max_attempts: max_attempts - 1,
                    });
                    if let Some(step_state) = scenario_state.steps.get_mut(index) {
                        step_state.retry(attempt, max_attempts - 1);
                    }
                    tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One attempt: fresh snapshot, resolution, dispatch.
    async fn try_step(
        &self,
        action: &Action,
        force: Option<StrategyKind>,
    ) -> EngineResult<StepOutcome> {
        let timeout = Duration::from_millis(self.config.operation_timeout_ms);

        // Actions always observe the current UI; earlier steps may have
        // changed it
        let snapshot: UiSnapshot = tokio::time::timeout(timeout, self.driver.snapshot())
            .await
            .map_err(|_| timeout_error(action))?
            .map_err(|e| EngineError::Driver(e.to_string()))?;

        let resolution = match action.target_descriptor() {
            Some(phrase) => {
                let mut descriptor = Descriptor::parse(phrase);
                if let Some(hint) = kind_hint(action) {
                    descriptor = descriptor.with_kind_hint(hint);
                }
                // The semantic strategy may call out to a model, so
                // resolution runs off the async thread under the same
                // timeout as driver calls
                let resolver = Arc::clone(&self.resolver);
                let scan = snapshot.clone();
                let resolved = tokio::time::timeout(
                    timeout,
                    tokio::task::spawn_blocking(move || {
                        resolver.resolve(&descriptor, &scan, force)
                    }),
                )
                .await
                .map_err(|_| timeout_error(action))?
                .map_err(|e| EngineError::Driver(e.to_string()))??;
                Some(resolved)
            }
            None => None,
        };

        tokio::time::timeout(
            timeout,
            dispatch(action, resolution.map(|r| r.node), &snapshot, &*self.driver),
        )
        .await
        .map_err(|_| timeout_error(action))??;

        Ok(StepOutcome {
            strategy: resolution.map(|r| r.strategy),
        })
    }

    /// Close the session and hand back the full report.
    pub fn finish(&mut self) -> SessionReport {
        self.session.finish();
        self.emitter.emit(TestEvent::SessionFinished {
            summary: self.session.summary(),
        });
        self.session.to_report()
    }
}

/// A timed-out UI operation reads the same as an element that never
/// appeared, which keeps it inside the retry policy.
fn timeout_error(action: &Action) -> EngineError {
    match action.target_descriptor() {
        Some(phrase) => EngineError::ElementNotFound(phrase.to_string()),
        None => EngineError::Driver("operation timed out".to_string()),
    }
}

/// Element kind implied by the action when the phrase names none.
fn kind_hint(action: &Action) -> Option<ElementKind> {
    match action {
        Action::TypeText { .. } => Some(ElementKind::Input),
        Action::SelectOption { .. } => Some(ElementKind::Dropdown),
        Action::SelectRadio { .. } => Some(ElementKind::Radio),
        Action::SelectCheckbox { .. } => Some(ElementKind::Checkbox),
        Action::SelectDateRange { .. } => Some(ElementKind::DateRange),
        _ => None,
    }
}
