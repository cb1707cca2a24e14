use crate::utils::StrategyKind;
use serde::{Deserialize, Serialize};

/// The typed, parsed form of a step's intent.
///
/// Each variant carries its operation-specific payload. Element targets are
/// kept as the raw natural-language phrase; the resolver interprets them
/// against the live UI snapshot at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Click {
        target: String,
    },
    TypeText {
        value: String,
        field: String,
    },
    SelectOption {
        value: String,
        field: String,
    },
    SelectRadio {
        value: String,
    },
    SelectCheckbox {
        value: String,
    },
    VerifyText {
        expected: String,
    },
    /// Verify a radio/checkbox/dropdown option is currently selected
    VerifyElementState {
        target: String,
    },
    SelectDateRange {
        start: String,
        end: String,
        field: String,
    },
    GenerateDatetime {
        expression: String,
        name: String,
    },
    StoreVariable {
        name: String,
        value: String,
    },
}

impl Action {
    /// Short display form for console output and reports.
    pub fn display_name(&self) -> String {
        match self {
            Action::Click { target } => format!("click(\"{}\")", target),
            Action::TypeText { value, field } => {
                format!("typeText(\"{}\" -> \"{}\")", value, field)
            }
            Action::SelectOption { value, field } => {
                format!("selectOption(\"{}\" from \"{}\")", value, field)
            }
            Action::SelectRadio { value } => format!("selectRadio(\"{}\")", value),
            Action::SelectCheckbox { value } => format!("selectCheckbox(\"{}\")", value),
            Action::VerifyText { expected } => format!("verifyText(\"{}\")", expected),
            Action::VerifyElementState { target } => {
                format!("verifySelected(\"{}\")", target)
            }
            Action::SelectDateRange { start, end, field } => {
                format!("selectDateRange({} .. {} in \"{}\")", start, end, field)
            }
            Action::GenerateDatetime { expression, name } => {
                format!("generateDatetime(\"{}\" as {})", expression, name)
            }
            Action::StoreVariable { name, value } => {
                format!("storeVariable({} = \"{}\")", name, value)
            }
        }
    }

    /// The element descriptor this action needs resolved, if any.
    /// Variable-store actions and page-level verification run without a
    /// resolved target.
    pub fn target_descriptor(&self) -> Option<&str> {
        match self {
            Action::Click { target } => Some(target),
            Action::TypeText { field, .. } => Some(field),
            Action::SelectOption { field, .. } => Some(field),
            Action::SelectRadio { value } => Some(value),
            Action::SelectCheckbox { value } => Some(value),
            Action::VerifyElementState { target } => Some(target),
            Action::SelectDateRange { field, .. } => Some(field),
            Action::VerifyText { .. }
            | Action::GenerateDatetime { .. }
            | Action::StoreVariable { .. } => None,
        }
    }
}

/// Inline overrides parsed off the end of a step line,
/// e.g. `[force ai]` or `[optional]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directives {
    /// Skip the cascade and run only this strategy
    #[serde(default)]
    pub force_strategy: Option<StrategyKind>,

    /// Soft step: failure is recorded but does not fail the scenario
    #[serde(default)]
    pub optional: bool,
}

/// One natural-language instruction line within a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Raw line as written, keyword included
    pub raw: String,

    /// BDD keyword (Given/When/Then/And/But). Normalized to a neutral
    /// "perform" semantic at execution time; kept for readability only.
    pub keyword: String,

    /// Step body with keyword and directives stripped
    pub text: String,

    pub directives: Directives,
}

/// A named, tagged sequence of steps representing one test case.
/// Immutable once parsed; runtime status lives in the runner state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,

    /// Opaque labels (`@smoke`, `@critical`) used only for run selection
    #[serde(default)]
    pub tags: Vec<String>,

    pub steps: Vec<Step>,
}

/// A parsed feature document: a name plus its scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub name: String,

    #[serde(default)]
    pub tags: Vec<String>,

    pub scenarios: Vec<Scenario>,
}
