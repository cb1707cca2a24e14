use crate::error::{EngineError, EngineResult};
use crate::parser::types::{Action, Directives};
use crate::utils::StrategyKind;
use regex::{Captures, Regex};

/// One phrase template: a pattern plus a builder that turns its captures
/// into an `Action`.
struct Template {
    name: &'static str,
    pattern: Regex,
    build: fn(&Captures) -> Action,
}

/// Parses one natural-language step line into a typed `Action` by matching
/// it against an ordered template list. Templates are mutually exclusive by
/// construction (each is anchored and keyed on a distinct verb phrase);
/// first match wins.
pub struct StepParser {
    templates: Vec<Template>,
    trailing_directive: Regex,
}

impl Default for StepParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip surrounding double quotes, if present.
fn unquote(s: &str) -> String {
    s.trim()
        .trim_start_matches('"')
        .trim_end_matches('"')
        .trim()
        .to_string()
}

/// Pick whichever of a quoted/bare capture pair matched.
fn either(caps: &Captures, quoted: usize, bare: usize) -> String {
    caps.get(quoted)
        .or_else(|| caps.get(bare))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

impl StepParser {
    pub fn new() -> Self {
        // Endpoints of a date range may be quoted or bare (`${Var}`)
        const ARG: &str = r#"(?:"([^"]*)"|(\S+))"#;

        let t = |name: &'static str, pattern: String, build: fn(&Captures) -> Action| Template {
            name,
            pattern: Regex::new(&format!("(?i)^{}$", pattern)).unwrap(),
            build,
        };

        let templates = vec![
            t(
                "selectDateRange",
                format!(
                    r#"(?:i )?select date range {ARG} to {ARG} in (?:the )?"?(.+?)"? field"#
                ),
                |c| Action::SelectDateRange {
                    start: either(c, 1, 2),
                    end: either(c, 3, 4),
                    field: unquote(&c[5]),
                },
            ),
            t(
                "generateDatetime",
                r#"(?:i )?generate datetime "([^"]*)" and store it as "([^"]*)""#.to_string(),
                |c| Action::GenerateDatetime {
                    expression: c[1].to_string(),
                    name: c[2].to_string(),
                },
            ),
            t(
                "storeVariable",
                r#"(?:i )?store "([^"]*)" as "([^"]*)""#.to_string(),
                |c| Action::StoreVariable {
                    value: c[1].to_string(),
                    name: c[2].to_string(),
                },
            ),
            t(
                "selectRadio",
                r#"(?:i )?(?:select|choose) "([^"]*)" radio button"#.to_string(),
                |c| Action::SelectRadio {
                    value: c[1].to_string(),
                },
            ),
            t(
                "selectCheckbox",
                r#"(?:i )?(?:select|check) "([^"]*)" checkbox"#.to_string(),
                |c| Action::SelectCheckbox {
                    value: c[1].to_string(),
                },
            ),
            t(
                "selectOption",
                r#"(?:i )?(?:select|choose) "([^"]*)" from (?:the )?"?(.+?)"?(?: dropdown)?"#
                    .to_string(),
                |c| Action::SelectOption {
                    value: c[1].to_string(),
                    field: unquote(&c[2]),
                },
            ),
            t(
                "typeText",
                r#"(?:i )?(?:enter|type) "([^"]*)" (?:in|into) (?:the )?"?(.+?)"?(?: field)?"#
                    .to_string(),
                |c| Action::TypeText {
                    value: c[1].to_string(),
                    field: unquote(&c[2]),
                },
            ),
            t(
                "verifyText",
                r#"(?:i )?verify text "([^"]*)""#.to_string(),
                |c| Action::VerifyText {
                    expected: c[1].to_string(),
                },
            ),
            t(
                "verifySelected",
                r#"(?:i )?verify "?(.+?)"? option is selected"#.to_string(),
                |c| Action::VerifyElementState {
                    target: unquote(&c[1]),
                },
            ),
            t(
                "click",
                r#"(?:i )?click (?:on )?(?:the )?"?(.+?)"?"#.to_string(),
                |c| Action::Click {
                    target: unquote(&c[1]),
                },
            ),
        ];

        Self {
            templates,
            trailing_directive: Regex::new(r"\[[^\]]*\]$").unwrap(),
        }
    }

    /// Parse one step line (keyword and directives already stripped) into
    /// exactly one `Action`.
    pub fn parse(&self, text: &str) -> EngineResult<Action> {
        let text = text.trim();
        // Known directives are stripped before parsing, so a trailing
        // bracketed token here is a directive nothing recognized; reject
        // it rather than let the lax templates swallow it into a target
        if self.trailing_directive.is_match(text) {
            return Err(EngineError::UnrecognizedStep(text.to_string()));
        }
        for template in &self.templates {
            if let Some(caps) = template.pattern.captures(text) {
                log::debug!("step matched template '{}': {}", template.name, text);
                return Ok((template.build)(&caps));
            }
        }
        Err(EngineError::UnrecognizedStep(text.to_string()))
    }
}

/// Strip trailing bracketed directives (`[force ai]`, `[optional]`) off a
/// step line. Directives are removed before any template matching, so every
/// template sees a directive-free line. Unknown bracketed tokens are left
/// in place and will surface as `UnrecognizedStep`.
pub fn strip_directives(line: &str) -> (String, Directives) {
    let trailing = Regex::new(r"(?i)\s*\[(force\s+([a-z]+)|optional)\]\s*$").unwrap();
    let mut rest = line.trim().to_string();
    let mut directives = Directives::default();

    while let Some(caps) = trailing.captures(&rest) {
        let token = caps[1].to_lowercase();
        if token == "optional" {
            directives.optional = true;
        } else if let Some(kind) = caps.get(2).and_then(|m| StrategyKind::parse(m.as_str())) {
            directives.force_strategy = Some(kind);
        } else {
            // force <unknown-strategy>: keep the token visible in the error
            break;
        }
        let end = caps.get(0).unwrap().start();
        rest.truncate(end);
    }

    (rest.trim().to_string(), directives)
}
