use crate::driver::UiDriver;
use crate::error::{EngineError, EngineResult};
use crate::parser::types::Action;
use crate::resolver::snapshot::{NodeId, UiSnapshot};
use crate::runner::context::DATETIME_FORMAT;
use chrono::NaiveDateTime;

/// How much of the page text an assertion failure quotes back.
const FOUND_PREVIEW_LEN: usize = 120;

/// Perform one resolved UI action through the driver. Verification
/// actions read the snapshot instead of mutating anything; variable-store
/// actions never reach this layer.
pub async fn dispatch(
    action: &Action,
    node: Option<NodeId>,
    snapshot: &UiSnapshot,
    driver: &dyn UiDriver,
) -> EngineResult<()> {
    let require_node = || node.ok_or_else(|| EngineError::Driver("no resolved target".into()));

    match action {
        Action::Click { .. } => {
            driver
                .click(require_node()?)
                .await
                .map_err(|e| EngineError::Driver(e.to_string()))?;
        }
        Action::TypeText { value, .. } => {
            driver
                .set_text(require_node()?, value)
                .await
                .map_err(|e| EngineError::Driver(e.to_string()))?;
        }
        Action::SelectOption { value, .. } => {
            driver
                .choose_option(require_node()?, value)
                .await
                .map_err(|e| EngineError::Driver(e.to_string()))?;
        }
        Action::SelectRadio { .. } | Action::SelectCheckbox { .. } => {
            driver
                .toggle(require_node()?, true)
                .await
                .map_err(|e| EngineError::Driver(e.to_string()))?;
        }
        Action::VerifyText { expected } => {
            let found = snapshot.visible_text();
            if !found.contains(expected.as_str()) {
                return Err(EngineError::AssertionMismatch {
                    expected: expected.clone(),
                    found: preview(&found),
                });
            }
        }
        Action::VerifyElementState { target } => {
            let id = require_node()?;
            let selected = snapshot.node(id).is_some_and(|n| n.selected);
            if !selected {
                return Err(EngineError::AssertionMismatch {
                    expected: format!("\"{target}\" selected"),
                    found: "not selected".to_string(),
                });
            }
        }
        Action::SelectDateRange { start, end, .. } => {
            let from = parse_datetime(start)?;
            let to = parse_datetime(end)?;
            if from >= to {
                return Err(EngineError::InvalidRange {
                    start: start.clone(),
                    end: end.clone(),
                });
            }
            driver
                .set_date_range(require_node()?, start, end)
                .await
                .map_err(|e| EngineError::Driver(e.to_string()))?;
        }
        Action::GenerateDatetime { .. } | Action::StoreVariable { .. } => {
            // Handled by the executor against the variable store
        }
    }
    Ok(())
}

fn parse_datetime(value: &str) -> EngineResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), DATETIME_FORMAT)
        .map_err(|_| EngineError::InvalidTimeExpression(value.to_string()))
}

fn preview(text: &str) -> String {
    if text.chars().count() <= FOUND_PREVIEW_LEN {
        return text.to_string();
    }
    let cut: String = text.chars().take(FOUND_PREVIEW_LEN).collect();
    format!("{cut}...")
}
