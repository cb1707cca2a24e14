use serde::{Deserialize, Serialize};
use std::path::Path;

/// One element-resolution strategy in the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Exact match on accessible name, label, or identifier
    Exact,
    /// Normalized substring / token-overlap match on visible text
    Fuzzy,
    /// Role/type keywords plus nearest-label association
    Structural,
    /// Natural-language ranking via the injected semantic model
    Ai,
}

impl StrategyKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "exact" => Some(StrategyKind::Exact),
            "fuzzy" => Some(StrategyKind::Fuzzy),
            "structural" => Some(StrategyKind::Structural),
            "ai" | "semantic" => Some(StrategyKind::Ai),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Exact => "exact",
            StrategyKind::Fuzzy => "fuzzy",
            StrategyKind::Structural => "structural",
            StrategyKind::Ai => "ai",
        }
    }
}

/// Process-wide engine configuration. Established at startup and never
/// mutated during execution; concurrent scenarios share it read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Default strategy cascade order
    pub strategy_order: Vec<StrategyKind>,

    /// Retry bound for ElementNotFound failures
    pub resolve_retries: u32,

    /// Delay between resolution retries (ms)
    pub retry_backoff_ms: u64,

    /// Minimum score the semantic strategy accepts
    pub confidence_floor: f64,

    /// Per-operation timeout for driver and ranker calls (ms)
    pub operation_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy_order: vec![
                StrategyKind::Exact,
                StrategyKind::Fuzzy,
                StrategyKind::Structural,
                StrategyKind::Ai,
            ],
            resolve_retries: 3,
            retry_backoff_ms: 500,
            confidence_floor: 0.5,
            operation_timeout_ms: 10_000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file. Missing fields fall back to
    /// defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }
}
