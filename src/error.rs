use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failure taxonomy of the execution engine. Every step failure maps to
/// exactly one variant; reports carry the stable `kind()` string so results
/// can be compared across runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The step text matched no instruction template
    #[error("unrecognized step: \"{0}\"")]
    UnrecognizedStep(String),

    /// A `${name}` reference with no stored value
    #[error("unbound variable: ${{{0}}}")]
    UnboundVariable(String),

    /// A datetime expression fragment that could not be interpreted
    #[error("invalid time expression: \"{0}\"")]
    InvalidTimeExpression(String),

    /// No strategy produced a unique match. The only retryable failure:
    /// the element may simply not have rendered yet.
    #[error("element not found: \"{0}\"")]
    ElementNotFound(String),

    /// A strategy matched more than one element and no later strategy was
    /// allowed to disambiguate
    #[error("ambiguous element: \"{descriptor}\" matched {candidates} candidates")]
    AmbiguousElement { descriptor: String, candidates: usize },

    /// A verification step found different content than expected
    #[error("assertion mismatch: expected \"{expected}\", found \"{found}\"")]
    AssertionMismatch { expected: String, found: String },

    /// A date range whose start is not strictly before its end
    #[error("invalid range: start \"{start}\" is not before end \"{end}\"")]
    InvalidRange { start: String, end: String },

    /// Driver-level failure performing a UI operation
    #[error("driver error: {0}")]
    Driver(String),
}

impl EngineError {
    /// Only absence is retryable. Ambiguity, bad input, and failed
    /// assertions will not improve with repetition.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::ElementNotFound(_))
    }

    /// Stable machine-readable failure class for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::UnrecognizedStep(_) => "unrecognizedStep",
            EngineError::UnboundVariable(_) => "unboundVariable",
            EngineError::InvalidTimeExpression(_) => "invalidTimeExpression",
            EngineError::ElementNotFound(_) => "elementNotFound",
            EngineError::AmbiguousElement { .. } => "ambiguousElement",
            EngineError::AssertionMismatch { .. } => "assertionMismatch",
            EngineError::InvalidRange { .. } => "invalidRange",
            EngineError::Driver(_) => "driver",
        }
    }
}
