pub mod context;
pub mod dispatch;
pub mod events;
pub mod executor;
pub mod state;

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use events::*;
pub use state::*;

use crate::driver::MemoryDriver;
use crate::parser::{parse_feature_file, StepParser};
use crate::resolver::{LexicalRanker, Resolver, UiSnapshot};
use crate::utils::EngineConfig;
use executor::TestExecutor;

/// Run tests from a file or directory
pub async fn run_tests(
    path: &Path,
    snapshot_path: Option<&Path>,
    config: EngineConfig,
    output: &Path,
    continue_on_failure: bool,
    report: bool,
    tags: Option<Vec<String>>,
) -> Result<()> {
    // 1. Collect all feature files
    let all_files = collect_feature_files(path)?;
    if all_files.is_empty() {
        println!("{} No feature files found.", "ℹ".blue());
        return Ok(());
    }

    // 2. Build the driver. Without a live UI backend the engine runs
    // against an in-memory snapshot.
    let initial = match snapshot_path {
        Some(p) => UiSnapshot::load(p)?,
        None => UiSnapshot::default(),
    };
    let driver = Box::new(MemoryDriver::new(initial));

    // 3. Wire cancellation: first Ctrl-C finishes the current step and
    // skips the rest
    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let flag = cancelled.clone();
        ctrlc::set_handler(move || {
            eprintln!("\n{} Cancellation requested...", "⚠".yellow());
            flag.store(true, Ordering::SeqCst);
        })?;
    }

    let resolver = Resolver::new(&config, Arc::new(LexicalRanker));
    let mut executor = TestExecutor::new(
        driver,
        config,
        resolver,
        continue_on_failure,
        tags,
        cancelled,
    );
    executor.announce();

    let mut run_error = None;
    for file in &all_files {
        if let Err(e) = executor.run_file(file).await {
            run_error = Some(e);
            break;
        }
    }

    let session = executor.finish();
    let summary = session.summary.clone();

    // Give the console listener time to drain
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let results = crate::report::types::TestResults::from_session(session);
    crate::report::json::write_results(&results, output)?;
    if report {
        crate::report::junit::write_report(&results, output)?;
    }

    if let Some(e) = run_error {
        return Err(e);
    }
    if summary.failed > 0 {
        anyhow::bail!("{} step(s) failed", summary.failed);
    }
    Ok(())
}

/// Parse feature files without executing anything; reports every step
/// that matches no instruction template.
pub fn check_files(path: &Path) -> Result<()> {
    let all_files = collect_feature_files(path)?;
    if all_files.is_empty() {
        println!("{} No feature files found.", "ℹ".blue());
        return Ok(());
    }

    let parser = StepParser::new();
    let mut problems = 0usize;
    let mut steps_seen = 0usize;

    for file in &all_files {
        let feature = parse_feature_file(file)?;
        for scenario in &feature.scenarios {
            for step in &scenario.steps {
                steps_seen += 1;
                if let Err(e) = parser.parse(&step.text) {
                    problems += 1;
                    println!(
                        "  {} {}: {} — {}",
                        "✗".red(),
                        file.display(),
                        scenario.name,
                        e
                    );
                }
            }
        }
    }

    if problems == 0 {
        println!(
            "{} {} file(s), {} step(s), all recognized",
            "✓".green(),
            all_files.len(),
            steps_seen
        );
        Ok(())
    } else {
        anyhow::bail!("{} unrecognized step(s)", problems)
    }
}

fn collect_feature_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut all_files = Vec::new();
    if path.is_dir() {
        for entry in walkdir::WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map_or(false, |ext| ext == "feature")
            })
        {
            all_files.push(entry.path().to_path_buf());
        }
    } else {
        all_files.push(path.to_path_buf());
    }
    Ok(all_files)
}
