use super::types::TestResults;
use anyhow::Result;
use std::path::Path;

/// Generate JSON report
pub async fn generate(results: &TestResults, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

/// Write the raw results file the `report` subcommand reads back
pub fn write_results(results: &TestResults, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join("results.json");
    std::fs::write(&path, serde_json::to_string_pretty(results)?)?;
    println!("    Results written: {}", path.display());
    Ok(())
}
