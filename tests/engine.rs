use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use plainstep::driver::MemoryDriver;
use plainstep::resolver::{
    Descriptor, LexicalRanker, NodeId, Resolver, SemanticRanker, UiNode, UiSnapshot,
};
use plainstep::runner::executor::TestExecutor;
use plainstep::runner::state::{ScenarioStatus, StepStatus};
use plainstep::utils::{EngineConfig, StrategyKind};

fn node(id: u32, role: &str, text: Option<&str>, label: Option<&str>) -> UiNode {
    UiNode {
        id,
        role: role.to_string(),
        name: None,
        label: label.map(str::to_string),
        identifier: None,
        text: text.map(str::to_string),
        placeholder: None,
        value: None,
        selected: false,
        enabled: true,
        visible: true,
    }
}

fn challenge_form() -> UiSnapshot {
    UiSnapshot {
        nodes: vec![
            node(1, "link", Some("Challenges"), None),
            node(2, "input", None, Some("Challenge Name")),
            node(3, "select", None, Some("Category")),
            node(4, "radio", Some("Public"), None),
            node(5, "radio", Some("Private"), None),
            node(6, "checkbox", None, Some("Terms")),
            node(7, "daterange", None, Some("Challenge Period")),
        ],
    }
}

fn quick_config() -> EngineConfig {
    EngineConfig {
        resolve_retries: 1,
        retry_backoff_ms: 1,
        ..EngineConfig::default()
    }
}

fn write_feature(content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "plainstep-test-{}.feature",
        uuid::Uuid::new_v4()
    ));
    std::fs::write(&path, content).unwrap();
    path
}

fn executor_with(
    driver: MemoryDriver,
    config: EngineConfig,
    continue_on_failure: bool,
) -> TestExecutor {
    let resolver = Resolver::new(&config, Arc::new(LexicalRanker));
    TestExecutor::new(
        Box::new(driver),
        config,
        resolver,
        continue_on_failure,
        None,
        Arc::new(AtomicBool::new(false)),
    )
}

#[tokio::test]
async fn test_create_challenge_scenario_end_to_end() {
    let feature = write_feature(
        r#"
Feature: Challenge creation

Scenario: Create a challenge
  Given I click on "Challenges"
  When I enter "Test Auto Challenge" in the "Challenge Name" field
  And I select "Fitness" from "Category" dropdown
  And I select "Public" radio button
  And I select "Terms" checkbox
  Then I verify text "Test Auto Challenge"
  And I verify "Public" option is selected
"#,
    );

    let driver = MemoryDriver::new(challenge_form());
    let handle = driver.clone();
    let mut executor = executor_with(driver, quick_config(), false);

    executor.run_file(&feature).await.unwrap();
    let report = executor.finish();

    assert_eq!(report.scenarios.len(), 1);
    let scenario = &report.scenarios[0];
    assert_eq!(scenario.status, ScenarioStatus::Passed);
    assert!(scenario
        .steps
        .iter()
        .all(|s| matches!(s.status, StepStatus::Passed)));

    // The typed value is visible to the later verification step
    let snap = handle.current().await;
    assert_eq!(
        snap.node(2).unwrap().value.as_deref(),
        Some("Test Auto Challenge")
    );
    assert!(snap.node(4).unwrap().selected);
    assert!(!snap.node(5).unwrap().selected);
    assert!(snap.node(6).unwrap().selected);

    std::fs::remove_file(&feature).ok();
}

#[tokio::test]
async fn test_generated_datetimes_flow_into_date_range() {
    let feature = write_feature(
        r#"
Feature: Challenge scheduling

Scenario: Schedule a challenge
  Given I generate datetime "tomorrow at 10:00 am" and store it as "ChallengeStartTime"
  And I generate datetime "3 days from now at 10:00 am" and store it as "ChallengeEndTime"
  When I select date range "${ChallengeStartTime}" to "${ChallengeEndTime}" in "Challenge Period" field
"#,
    );

    let driver = MemoryDriver::new(challenge_form());
    let handle = driver.clone();
    let mut executor = executor_with(driver, quick_config(), false);

    executor.run_file(&feature).await.unwrap();
    let report = executor.finish();
    assert_eq!(report.scenarios[0].status, ScenarioStatus::Passed);

    let value = handle
        .current()
        .await
        .node(7)
        .unwrap()
        .value
        .clone()
        .unwrap();
    // "YYYY/MM/DD HH:MM - YYYY/MM/DD HH:MM", both at 10:00
    let range = regex::Regex::new(
        r"^\d{4}/\d{2}/\d{2} 10:00 - \d{4}/\d{2}/\d{2} 10:00$",
    )
    .unwrap();
    assert!(range.is_match(&value), "unexpected range value: {value}");

    std::fs::remove_file(&feature).ok();
}

#[tokio::test]
async fn test_failure_skips_remaining_steps() {
    let feature = write_feature(
        r#"
Feature: Aggregation

Scenario: Failure mid-scenario
  Given I click on "Challenges"
  When I enter "x" in the "Challenge Name" field
  Then I verify text "text that is nowhere on the page"
  And I click on "Challenges"
  And I verify text "x"
"#,
    );

    let driver = MemoryDriver::new(challenge_form());
    let mut executor = executor_with(driver, quick_config(), true);

    executor.run_file(&feature).await.unwrap();
    let report = executor.finish();

    let summary = &report.summary;
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 2);

    // A single non-optional failure fails the whole scenario
    assert_eq!(report.scenarios[0].status, ScenarioStatus::Failed);

    let steps = &report.scenarios[0].steps;
    assert!(matches!(
        steps[2].status,
        StepStatus::Failed { ref kind, .. } if kind == "assertionMismatch"
    ));
    assert!(matches!(steps[3].status, StepStatus::Skipped { .. }));
    assert!(matches!(steps[4].status, StepStatus::Skipped { .. }));

    std::fs::remove_file(&feature).ok();
}

#[tokio::test]
async fn test_optional_step_failure_does_not_fail_scenario() {
    let feature = write_feature(
        r#"
Feature: Optional steps

Scenario: Banner may be absent
  Given I click on "Promo Banner" [optional]
  When I click on "Challenges"
"#,
    );

    let driver = MemoryDriver::new(challenge_form());
    let mut executor = executor_with(driver, quick_config(), false);

    executor.run_file(&feature).await.unwrap();
    let report = executor.finish();

    let scenario = &report.scenarios[0];
    assert_eq!(scenario.status, ScenarioStatus::Passed);
    assert!(matches!(
        scenario.steps[0].status,
        StepStatus::Failed { ref kind, .. } if kind == "elementNotFound"
    ));
    assert!(matches!(scenario.steps[1].status, StepStatus::Passed));

    std::fs::remove_file(&feature).ok();
}

#[tokio::test]
async fn test_element_not_found_retries_with_fresh_snapshots() {
    let feature = write_feature(
        r#"
Feature: Retry

Scenario: Element appears late
  Given I click on "Challenges"
"#,
    );

    let config = EngineConfig {
        resolve_retries: 3,
        retry_backoff_ms: 1,
        ..EngineConfig::default()
    };

    let driver = MemoryDriver::new(challenge_form());
    // First two scans show a page still rendering
    driver
        .stage(vec![UiSnapshot::default(), UiSnapshot::default()])
        .await;
    let handle = driver.clone();
    let mut executor = executor_with(driver, config, false);

    executor.run_file(&feature).await.unwrap();
    let report = executor.finish();

    let step = &report.scenarios[0].steps[0];
    assert!(matches!(step.status, StepStatus::Passed));
    assert_eq!(step.retry_count, 2);
    assert!(handle
        .operations()
        .await
        .iter()
        .any(|op| op == "click(1)"));

    std::fs::remove_file(&feature).ok();
}

#[tokio::test]
async fn test_retry_attempts_are_bounded() {
    let feature = write_feature(
        r#"
Feature: Retry bound

Scenario: Element never appears
  Given I click on "No Such Button"
"#,
    );

    let driver = MemoryDriver::new(challenge_form());
    let handle = driver.clone();
    let mut executor = executor_with(driver, quick_config(), true);

    executor.run_file(&feature).await.unwrap();
    let report = executor.finish();

    let step = &report.scenarios[0].steps[0];
    assert!(matches!(
        step.status,
        StepStatus::Failed { ref kind, .. } if kind == "elementNotFound"
    ));
    // resolve_retries = 1: one initial attempt plus one retry
    assert_eq!(step.retry_count, 1);
    assert!(handle.operations().await.is_empty());

    std::fs::remove_file(&feature).ok();
}

struct SpyRanker {
    called: Arc<AtomicBool>,
}

impl SemanticRanker for SpyRanker {
    fn rank(&self, _: &Descriptor, _: &UiSnapshot) -> Vec<(NodeId, f64)> {
        self.called.store(true, Ordering::SeqCst);
        vec![(1, 0.9)]
    }
}

#[tokio::test]
async fn test_forced_ai_strategy_bypasses_cascade() {
    let feature = write_feature(
        r#"
Feature: Forced strategy

Scenario: Force the semantic strategy
  Given I click on "Challenges" [force ai]
"#,
    );

    let called = Arc::new(AtomicBool::new(false));
    let config = quick_config();
    let resolver = Resolver::new(
        &config,
        Arc::new(SpyRanker {
            called: called.clone(),
        }),
    );
    let mut executor = TestExecutor::new(
        Box::new(MemoryDriver::new(challenge_form())),
        config,
        resolver,
        false,
        None,
        Arc::new(AtomicBool::new(false)),
    );

    executor.run_file(&feature).await.unwrap();
    let report = executor.finish();

    let step = &report.scenarios[0].steps[0];
    assert!(matches!(step.status, StepStatus::Passed));
    // The exact strategy would have matched too; the directive pinned
    // resolution to the semantic ranker
    assert_eq!(step.strategy, Some(StrategyKind::Ai));
    assert!(called.load(Ordering::SeqCst));

    std::fs::remove_file(&feature).ok();
}

struct StallingRanker;

impl SemanticRanker for StallingRanker {
    fn rank(&self, _: &Descriptor, _: &UiSnapshot) -> Vec<(NodeId, f64)> {
        std::thread::sleep(std::time::Duration::from_millis(500));
        vec![(1, 0.9)]
    }
}

#[tokio::test]
async fn test_slow_ranker_is_bounded_by_operation_timeout() {
    let feature = write_feature(
        r#"
Feature: Ranker timeout

Scenario: Model call stalls
  Given I click on "Challenges" [force ai]
"#,
    );

    let config = EngineConfig {
        resolve_retries: 0,
        operation_timeout_ms: 50,
        ..EngineConfig::default()
    };
    let resolver = Resolver::new(&config, Arc::new(StallingRanker));
    let mut executor = TestExecutor::new(
        Box::new(MemoryDriver::new(challenge_form())),
        config,
        resolver,
        true,
        None,
        Arc::new(AtomicBool::new(false)),
    );

    executor.run_file(&feature).await.unwrap();
    let report = executor.finish();

    // The stalled resolution is cut off and reads as a missing element
    let step = &report.scenarios[0].steps[0];
    assert!(matches!(
        step.status,
        StepStatus::Failed { ref kind, .. } if kind == "elementNotFound"
    ));

    std::fs::remove_file(&feature).ok();
}

#[tokio::test]
async fn test_tag_filter_skips_scenarios() {
    let feature = write_feature(
        r#"
Feature: Tagged

@smoke
Scenario: Runs
  Given I click on "Challenges"

@slow
Scenario: Skipped entirely
  Given I click on "No Such Button"
"#,
    );

    let config = quick_config();
    let resolver = Resolver::new(&config, Arc::new(LexicalRanker));
    let mut executor = TestExecutor::new(
        Box::new(MemoryDriver::new(challenge_form())),
        config,
        resolver,
        false,
        Some(vec!["@smoke".to_string()]),
        Arc::new(AtomicBool::new(false)),
    );

    executor.run_file(&feature).await.unwrap();
    let report = executor.finish();

    assert_eq!(report.scenarios.len(), 1);
    assert_eq!(report.scenarios[0].scenario_name, "Runs");
    assert_eq!(report.scenarios[0].status, ScenarioStatus::Passed);

    std::fs::remove_file(&feature).ok();
}

#[tokio::test]
async fn test_unbound_variable_fails_the_step() {
    let feature = write_feature(
        r#"
Feature: Variables

Scenario: Reference before binding
  Given I enter "${Nope}" in the "Challenge Name" field
"#,
    );

    let driver = MemoryDriver::new(challenge_form());
    let mut executor = executor_with(driver, quick_config(), true);

    executor.run_file(&feature).await.unwrap();
    let report = executor.finish();

    let step = &report.scenarios[0].steps[0];
    assert!(matches!(
        step.status,
        StepStatus::Failed { ref kind, .. } if kind == "unboundVariable"
    ));

    std::fs::remove_file(&feature).ok();
}
