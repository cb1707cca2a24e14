use super::types::TestResults;
use crate::runner::state::{ScenarioStateReport, ScenarioStatus, StepStatus};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// Generate JUnit XML report string from TestResults
pub fn generate_junit_xml(results: &TestResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let total_tests = results.scenarios.len();
    let failures = results
        .scenarios
        .iter()
        .filter(|s| s.status == ScenarioStatus::Failed)
        .count();
    let skipped = results
        .scenarios
        .iter()
        .filter(|s| {
            !s.steps.is_empty()
                && s.steps
                    .iter()
                    .all(|step| matches!(step.status, StepStatus::Skipped { .. }))
        })
        .count();
    let total_duration: u64 = results
        .scenarios
        .iter()
        .map(|s| s.total_duration_ms.unwrap_or(0))
        .sum();

    // <testsuites>
    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "plainstep-run"));
    suites_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suites_start.push_attribute(("failures", failures.to_string().as_str()));
    suites_start.push_attribute(("skipped", skipped.to_string().as_str()));
    suites_start.push_attribute((
        "time",
        (total_duration as f64 / 1000.0).to_string().as_str(),
    ));
    writer.write_event(Event::Start(suites_start))?;

    // Single <testsuite> for this run; a larger setup might group by
    // feature file or tag
    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", "default"));
    suite_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suite_start.push_attribute(("failures", failures.to_string().as_str()));
    suite_start.push_attribute(("skipped", skipped.to_string().as_str()));
    suite_start.push_attribute(("id", results.session_id.as_str()));
    suite_start.push_attribute((
        "time",
        (total_duration as f64 / 1000.0).to_string().as_str(),
    ));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for scenario in &results.scenarios {
        write_test_case(&mut writer, scenario)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let result = writer.into_inner().into_inner();
    let xml = String::from_utf8(result)?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    scenario: &ScenarioStateReport,
) -> Result<()> {
    let mut case_start = BytesStart::new("testcase");
    let classname = scenario.feature_path.replace("/", ".");

    case_start.push_attribute(("name", scenario.scenario_name.as_str()));
    case_start.push_attribute(("classname", classname.as_str()));
    case_start.push_attribute((
        "time",
        (scenario.total_duration_ms.unwrap_or(0) as f64 / 1000.0)
            .to_string()
            .as_str(),
    ));

    writer.write_event(Event::Start(case_start))?;

    match scenario.status {
        ScenarioStatus::Failed => {
            let first_failure = scenario.steps.iter().find_map(|step| match &step.status {
                StepStatus::Failed { error, .. } => Some(error.clone()),
                _ => None,
            });
            let message = scenario
                .error
                .clone()
                .or(first_failure)
                .unwrap_or_else(|| "Unknown error".to_string());

            let mut fail_start = BytesStart::new("failure");
            fail_start.push_attribute(("message", message.as_str()));
            fail_start.push_attribute(("type", "StepFailure"));
            writer.write_event(Event::Start(fail_start))?;
            writer.write_event(Event::Text(quick_xml::events::BytesText::new(&message)))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;
        }
        _ => {}
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write report to file
pub fn write_report(results: &TestResults, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join("junit.xml");
    std::fs::write(&path, xml)?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}
