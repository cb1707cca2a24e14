use crate::error::{EngineError, EngineResult};
use crate::parser::types::Action;
use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use regex::Regex;
use std::collections::HashMap;

/// Output format for generated datetime values, matching what date-range
/// pickers accept as typed input.
pub const DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Scenario-scoped variable bindings. Values are plain strings; generated
/// datetimes are stored pre-formatted. Dropped when the scenario ends so
/// bindings never leak across test cases.
#[derive(Debug, Default)]
pub struct VariableStore {
    values: HashMap<String, String>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: String) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Substitute every `${name}` reference in a single pass. Substituted
    /// values are taken literally, never re-scanned for references.
    pub fn resolve(&self, input: &str) -> EngineResult<String> {
        let reference = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
        let mut out = String::with_capacity(input.len());
        let mut last = 0;
        for caps in reference.captures_iter(input) {
            let whole = caps.get(0).unwrap();
            let name = &caps[1];
            let value = self
                .values
                .get(name)
                .ok_or_else(|| EngineError::UnboundVariable(name.to_string()))?;
            out.push_str(&input[last..whole.start()]);
            out.push_str(value);
            last = whole.end();
        }
        out.push_str(&input[last..]);
        Ok(out)
    }

    /// Resolve every string payload of an action. Target descriptors are
    /// resolved too, so a stored value can name an element.
    pub fn resolve_action(&self, action: &Action) -> EngineResult<Action> {
        Ok(match action {
            Action::Click { target } => Action::Click {
                target: self.resolve(target)?,
            },
            Action::TypeText { value, field } => Action::TypeText {
                value: self.resolve(value)?,
                field: self.resolve(field)?,
            },
            Action::SelectOption { value, field } => Action::SelectOption {
                value: self.resolve(value)?,
                field: self.resolve(field)?,
            },
            Action::SelectRadio { value } => Action::SelectRadio {
                value: self.resolve(value)?,
            },
            Action::SelectCheckbox { value } => Action::SelectCheckbox {
                value: self.resolve(value)?,
            },
            Action::VerifyText { expected } => Action::VerifyText {
                expected: self.resolve(expected)?,
            },
            Action::VerifyElementState { target } => Action::VerifyElementState {
                target: self.resolve(target)?,
            },
            Action::SelectDateRange { start, end, field } => Action::SelectDateRange {
                start: self.resolve(start)?,
                end: self.resolve(end)?,
                field: self.resolve(field)?,
            },
            Action::GenerateDatetime { expression, name } => Action::GenerateDatetime {
                expression: self.resolve(expression)?,
                name: name.clone(),
            },
            Action::StoreVariable { name, value } => Action::StoreVariable {
                name: name.clone(),
                value: self.resolve(value)?,
            },
        })
    }

    /// Evaluate a relative datetime expression against `base` and bind the
    /// formatted result.
    pub fn generate_datetime(
        &mut self,
        expression: &str,
        name: &str,
        base: DateTime<Local>,
    ) -> EngineResult<String> {
        let value = eval_datetime(expression, base)?.format(DATETIME_FORMAT).to_string();
        self.set(name, value.clone());
        Ok(value)
    }
}

/// Interpret a relative datetime expression: an optional day part
/// ("tomorrow", "3 days from now") and an optional clock part
/// ("at 10:00 am"). Anything left unexplained fails the whole expression.
fn eval_datetime(expression: &str, base: DateTime<Local>) -> EngineResult<DateTime<Local>> {
    let mut rest = expression.trim().to_lowercase();
    let mut result = base;
    let mut matched_any = false;

    // Clock part first so its text does not confuse the day-part scan
    let clock = Regex::new(r"\bat\s+(\d{1,2})(?::(\d{2}))?\s*(am|pm)?\b").unwrap();
    let clock_snapshot = rest.clone();
    if let Some(caps) = clock.captures(&clock_snapshot) {
        let mut hour: u32 = caps[1]
            .parse()
            .map_err(|_| EngineError::InvalidTimeExpression(caps[1].to_string()))?;
        let minute: u32 = caps
            .get(2)
            .map(|m| m.as_str().parse())
            .transpose()
            .map_err(|_| EngineError::InvalidTimeExpression(expression.to_string()))?
            .unwrap_or(0);
        match caps.get(3).map(|m| m.as_str()) {
            Some("am") if hour == 12 => hour = 0,
            Some("pm") if hour < 12 => hour += 12,
            _ => {}
        }
        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| EngineError::InvalidTimeExpression(caps[0].to_string()))?;
        result = Local
            .from_local_datetime(&result.date_naive().and_time(time))
            .single()
            .ok_or_else(|| EngineError::InvalidTimeExpression(expression.to_string()))?;
        let span = caps.get(0).unwrap().range();
        rest.replace_range(span, "");
        matched_any = true;
    }

    let offsets: [(&str, i64); 4] = [
        (r"\btoday\b", 0),
        (r"\btomorrow\b", 1),
        (r"\byesterday\b", -1),
        (r"\bnext\s+week\b", 7),
    ];
    for (pattern, days) in offsets {
        let re = Regex::new(pattern).unwrap();
        if let Some(m) = re.find(&rest) {
            result += Duration::days(days);
            let span = m.range();
            rest.replace_range(span, "");
            matched_any = true;
            break;
        }
    }

    let relative = Regex::new(r"\b(\d+)\s+(day|week|hour|minute)s?\s+(from\s+now|ago|later)\b")
        .unwrap();
    let rest_snapshot = rest.clone();
    if let Some(caps) = relative.captures(&rest_snapshot) {
        let amount: i64 = caps[1]
            .parse()
            .map_err(|_| EngineError::InvalidTimeExpression(caps[1].to_string()))?;
        let span = match &caps[2] {
            "day" => Duration::days(amount),
            "week" => Duration::weeks(amount),
            "hour" => Duration::hours(amount),
            _ => Duration::minutes(amount),
        };
        result = if &caps[3] == "ago" {
            result - span
        } else {
            result + span
        };
        let range = caps.get(0).unwrap().range();
        rest.replace_range(range, "");
        matched_any = true;
    }

    let leftover = rest.trim();
    if !matched_any || !leftover.is_empty() {
        let fragment = if leftover.is_empty() {
            expression.trim()
        } else {
            leftover
        };
        return Err(EngineError::InvalidTimeExpression(fragment.to_string()));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_store_and_resolve() {
        let mut store = VariableStore::new();
        store.set("name", "Test Auto Challenge".into());
        assert_eq!(
            store.resolve("the ${name} entry").unwrap(),
            "the Test Auto Challenge entry"
        );
    }

    #[test]
    fn test_resolve_without_references_is_identity() {
        let store = VariableStore::new();
        assert_eq!(store.resolve("plain text, no refs").unwrap(), "plain text, no refs");
    }

    #[test]
    fn test_unbound_variable() {
        let store = VariableStore::new();
        let err = store.resolve("${missing}").unwrap_err();
        assert_eq!(err, EngineError::UnboundVariable("missing".into()));
    }

    #[test]
    fn test_substitution_is_single_pass() {
        let mut store = VariableStore::new();
        store.set("a", "${b}".into());
        store.set("b", "never".into());
        assert_eq!(store.resolve("${a}").unwrap(), "${b}");
    }

    #[test]
    fn test_tomorrow_at_time() {
        let dt = eval_datetime("tomorrow at 10:00 am", base()).unwrap();
        assert_eq!(dt.format(DATETIME_FORMAT).to_string(), "2026/03/11 10:00");
    }

    #[test]
    fn test_midnight_and_noon() {
        let midnight = eval_datetime("today at 12 am", base()).unwrap();
        assert_eq!(
            midnight.format(DATETIME_FORMAT).to_string(),
            "2026/03/10 00:00"
        );
        let noon = eval_datetime("today at 12 pm", base()).unwrap();
        assert_eq!(noon.format(DATETIME_FORMAT).to_string(), "2026/03/10 12:00");
    }

    #[test]
    fn test_days_from_now() {
        let dt = eval_datetime("3 days from now at 5:15 pm", base()).unwrap();
        assert_eq!(dt.format(DATETIME_FORMAT).to_string(), "2026/03/13 17:15");
    }

    #[test]
    fn test_bare_day_keeps_base_clock() {
        let dt = eval_datetime("tomorrow", base()).unwrap();
        assert_eq!(dt.format(DATETIME_FORMAT).to_string(), "2026/03/11 09:30");
    }

    #[test]
    fn test_unparsable_fragment_is_named() {
        let err = eval_datetime("tomorrow at half past nine", base()).unwrap_err();
        match err {
            EngineError::InvalidTimeExpression(fragment) => {
                assert!(fragment.contains("half"), "got: {fragment}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_generate_binds_variable() {
        let mut store = VariableStore::new();
        let value = store
            .generate_datetime("tomorrow at 10:00 am", "startTime", base())
            .unwrap();
        assert_eq!(value, "2026/03/11 10:00");
        assert_eq!(store.get("startTime"), Some("2026/03/11 10:00"));
    }

    #[test]
    fn test_resolve_action_substitutes_payloads() {
        let mut store = VariableStore::new();
        store.set("start", "2026/03/11 10:00".into());
        store.set("end", "2026/03/12 10:00".into());
        let action = Action::SelectDateRange {
            start: "${start}".into(),
            end: "${end}".into(),
            field: "Challenge Period field".into(),
        };
        let resolved = store.resolve_action(&action).unwrap();
        assert_eq!(
            resolved,
            Action::SelectDateRange {
                start: "2026/03/11 10:00".into(),
                end: "2026/03/12 10:00".into(),
                field: "Challenge Period field".into(),
            }
        );
    }
}
