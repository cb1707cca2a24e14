use crate::parser::steps::strip_directives;
use crate::parser::types::{Feature, Scenario, Step};
use anyhow::{bail, Context, Result};
use std::path::Path;

const KEYWORDS: [&str; 5] = ["Given", "When", "Then", "And", "But"];

/// Parse a feature document from disk.
pub fn parse_feature_file(path: &Path) -> Result<Feature> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read feature file: {}", path.display()))?;
    parse_feature_text(&content, path)
}

/// Parse feature text: `@tag` lines, a `Feature:` header, `Scenario:`
/// blocks, and keyword-prefixed step lines. `#` comments and blank lines
/// are ignored. Tags directly above a scenario attach to that scenario;
/// tags above the feature header attach to every scenario.
pub fn parse_feature_text(content: &str, path: &Path) -> Result<Feature> {
    let mut feature_name = String::new();
    let mut feature_tags: Vec<String> = Vec::new();
    let mut scenarios: Vec<Scenario> = Vec::new();
    let mut pending_tags: Vec<String> = Vec::new();
    let mut current: Option<Scenario> = None;

    for (lineno, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('@') {
            pending_tags.extend(
                line.split_whitespace()
                    .filter(|t| t.starts_with('@'))
                    .map(|t| t.to_string()),
            );
            continue;
        }

        if let Some(rest) = line.strip_prefix("Feature:") {
            feature_name = rest.trim().to_string();
            feature_tags = std::mem::take(&mut pending_tags);
            continue;
        }

        if let Some(rest) = line.strip_prefix("Scenario:") {
            if let Some(done) = current.take() {
                scenarios.push(done);
            }
            let mut tags = feature_tags.clone();
            tags.append(&mut pending_tags);
            current = Some(Scenario {
                name: rest.trim().to_string(),
                tags,
                steps: Vec::new(),
            });
            continue;
        }

        if let Some(keyword) = KEYWORDS.iter().find(|k| {
            line.starts_with(**k)
                && line[k.len()..]
                    .chars()
                    .next()
                    .map_or(false, |c| c.is_whitespace())
        }) {
            let scenario = match current.as_mut() {
                Some(s) => s,
                None => bail!(
                    "{}:{}: step line outside a Scenario block",
                    path.display(),
                    lineno + 1
                ),
            };
            let body = line[keyword.len()..].trim();
            let (text, directives) = strip_directives(body);
            scenario.steps.push(Step {
                raw: line.to_string(),
                keyword: keyword.to_string(),
                text,
                directives,
            });
            continue;
        }

        bail!(
            "{}:{}: unrecognized line: {}",
            path.display(),
            lineno + 1,
            line
        );
    }

    if let Some(done) = current.take() {
        scenarios.push(done);
    }

    if feature_name.is_empty() {
        feature_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();
    }

    Ok(Feature {
        name: feature_name,
        tags: feature_tags,
        scenarios,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::StrategyKind;

    #[test]
    fn test_parse_simple_feature() {
        let text = r#"
@smoke
Feature: Challenge creation

  # happy path
  @critical
  Scenario: Create a challenge
    Given I click on "Challenges"
    When I enter "Test Auto Challenge" in the Challenge Name field
    Then I verify text "Challenge created"
"#;
        let feature = parse_feature_text(text, Path::new("challenge.feature")).unwrap();
        assert_eq!(feature.name, "Challenge creation");
        assert_eq!(feature.tags, vec!["@smoke"]);
        assert_eq!(feature.scenarios.len(), 1);

        let scenario = &feature.scenarios[0];
        assert_eq!(scenario.name, "Create a challenge");
        assert_eq!(scenario.tags, vec!["@smoke", "@critical"]);
        assert_eq!(scenario.steps.len(), 3);
        assert_eq!(scenario.steps[0].keyword, "Given");
        assert_eq!(scenario.steps[1].text, r#"I enter "Test Auto Challenge" in the Challenge Name field"#);
    }

    #[test]
    fn test_step_directives_attached() {
        let text = r#"
Feature: F
Scenario: S
  When I enter "x" in the About field [force ai]
  And I click on "Banner" [optional]
"#;
        let feature = parse_feature_text(text, Path::new("f.feature")).unwrap();
        let steps = &feature.scenarios[0].steps;
        assert_eq!(steps[0].directives.force_strategy, Some(StrategyKind::Ai));
        assert_eq!(steps[0].text, r#"I enter "x" in the About field"#);
        assert!(steps[1].directives.optional);
    }

    #[test]
    fn test_multiple_scenarios() {
        let text = r#"
Feature: F
Scenario: A
  Given I click on "X"
Scenario: B
  Given I click on "Y"
"#;
        let feature = parse_feature_text(text, Path::new("f.feature")).unwrap();
        assert_eq!(feature.scenarios.len(), 2);
        assert_eq!(feature.scenarios[1].name, "B");
    }

    #[test]
    fn test_step_outside_scenario_rejected() {
        let text = "Feature: F\nGiven I click on \"X\"\n";
        assert!(parse_feature_text(text, Path::new("f.feature")).is_err());
    }
}
