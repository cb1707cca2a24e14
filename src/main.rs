use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use plainstep::{report, runner, utils::EngineConfig};

#[derive(Parser)]
#[command(name = "plainstep")]
#[command(version = "0.1.0")]
#[command(about = "Scriptless BDD UI test runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run feature file(s) or directory
    Run {
        /// Path to feature file or directory
        path: PathBuf,

        /// UI snapshot JSON to run against (in-memory driver)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Engine configuration YAML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for results and reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Continue on failure
        #[arg(long, default_value = "false")]
        continue_on_failure: bool,

        /// Generate JUnit report alongside the JSON results
        #[arg(long, default_value = "false")]
        report: bool,

        /// Filter scenarios by tags (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Parse feature files and report unrecognized steps
    Check {
        /// Path to feature file or directory
        path: PathBuf,
    },

    /// Generate report from test results
    Report {
        /// Path to test results JSON
        results: PathBuf,

        /// Output format (json, junit)
        #[arg(short, long, default_value = "junit")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            path,
            snapshot,
            config,
            output,
            continue_on_failure,
            report,
            tags,
        } => {
            let engine_config = match config {
                Some(ref p) => EngineConfig::load(p)?,
                None => EngineConfig::default(),
            };

            println!(
                "{} Running features from: {}",
                "▶".green().bold(),
                path.display()
            );
            if let Some(ref snap) = snapshot {
                println!("  Snapshot: {}", snap.display().to_string().cyan());
            }
            if let Some(ref tags_list) = tags {
                println!("  Tags: {}", tags_list.join(", ").yellow());
            }
            println!("  Output: {}", output.display().to_string().cyan());
            if report {
                println!("  Reports: {}", "Enabled".green());
            }

            std::fs::create_dir_all(&output)?;

            runner::run_tests(
                &path,
                snapshot.as_deref(),
                engine_config,
                &output,
                continue_on_failure,
                report,
                tags,
            )
            .await?;
        }

        Commands::Check { path } => {
            println!(
                "{} Checking features in: {}",
                "🔍".to_string().blue(),
                path.display()
            );
            runner::check_files(&path)?;
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref()).await?;
        }
    }

    Ok(())
}
