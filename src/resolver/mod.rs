pub mod descriptor;
pub mod exact;
pub mod fuzzy;
pub mod semantic;
pub mod snapshot;
pub mod structural;

pub use descriptor::{Descriptor, ElementKind};
pub use semantic::{LexicalRanker, SemanticRanker};
pub use snapshot::{NodeId, UiNode, UiSnapshot};

use crate::error::{EngineError, EngineResult};
use crate::utils::{EngineConfig, StrategyKind};
use exact::ExactStrategy;
use fuzzy::FuzzyStrategy;
use semantic::SemanticStrategy;
use std::sync::Arc;
use structural::StructuralStrategy;

/// Result of one strategy's pass over a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Unique(NodeId),
    None,
    Ambiguous(usize),
}

impl MatchOutcome {
    pub fn from_hits(hits: &[NodeId]) -> Self {
        match hits {
            [] => MatchOutcome::None,
            [id] => MatchOutcome::Unique(*id),
            many => MatchOutcome::Ambiguous(many.len()),
        }
    }
}

/// One rung of the resolution cascade. Strategies are pure over the
/// snapshot: same descriptor, same snapshot, same outcome.
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;
    fn find(&self, descriptor: &Descriptor, snapshot: &UiSnapshot) -> MatchOutcome;
}

/// A successful resolution: which node, and which strategy found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub node: NodeId,
    pub strategy: StrategyKind,
}

/// Ordered cascade of strategies. Cheap deterministic strategies run
/// first; the semantic strategy is the expensive last resort.
pub struct Resolver {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Resolver {
    /// Build the cascade in the configured order.
    pub fn new(config: &EngineConfig, ranker: Arc<dyn SemanticRanker>) -> Self {
        let strategies = config
            .strategy_order
            .iter()
            .map(|kind| -> Box<dyn Strategy> {
                match kind {
                    StrategyKind::Exact => Box::new(ExactStrategy),
                    StrategyKind::Fuzzy => Box::new(FuzzyStrategy),
                    StrategyKind::Structural => Box::new(StructuralStrategy),
                    StrategyKind::Ai => {
                        Box::new(SemanticStrategy::new(ranker.clone(), config.confidence_floor))
                    }
                }
            })
            .collect();
        Self { strategies }
    }

    /// Resolve a descriptor to exactly one node, or fail.
    ///
    /// With `force` set, only that strategy runs and its ambiguity is
    /// final. In the cascade, an ambiguous outcome from a deterministic
    /// strategy falls through to the next rung (a more discriminating
    /// strategy may still isolate one candidate), but ambiguity from the
    /// semantic strategy is terminal since nothing runs after it.
    pub fn resolve(
        &self,
        descriptor: &Descriptor,
        snapshot: &UiSnapshot,
        force: Option<StrategyKind>,
    ) -> EngineResult<Resolution> {
        for strategy in &self.strategies {
            if let Some(forced) = force {
                if strategy.kind() != forced {
                    continue;
                }
            }
            match strategy.find(descriptor, snapshot) {
                MatchOutcome::Unique(node) => {
                    log::debug!(
                        "resolved \"{}\" via {} strategy -> node {}",
                        descriptor.raw,
                        strategy.kind().as_str(),
                        node
                    );
                    return Ok(Resolution {
                        node,
                        strategy: strategy.kind(),
                    });
                }
                MatchOutcome::Ambiguous(count)
                    if force.is_some() || strategy.kind() == StrategyKind::Ai =>
                {
                    return Err(EngineError::AmbiguousElement {
                        descriptor: descriptor.raw.clone(),
                        candidates: count,
                    });
                }
                MatchOutcome::None | MatchOutcome::Ambiguous(_) => continue,
            }
        }
        Err(EngineError::ElementNotFound(descriptor.raw.clone()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::snapshot::{NodeId, UiNode, UiSnapshot};

    pub fn node(id: NodeId, role: &str, text: Option<&str>) -> UiNode {
        UiNode {
            id,
            role: role.to_string(),
            name: None,
            label: None,
            identifier: None,
            text: text.map(str::to_string),
            placeholder: None,
            value: None,
            selected: false,
            enabled: true,
            visible: true,
        }
    }

    pub fn labeled_input(id: NodeId, label: Option<&str>) -> UiNode {
        UiNode {
            id,
            role: "input".to_string(),
            name: None,
            label: label.map(str::to_string),
            identifier: None,
            text: None,
            placeholder: None,
            value: None,
            selected: false,
            enabled: true,
            visible: true,
        }
    }

    pub fn snapshot(nodes: Vec<UiNode>) -> UiSnapshot {
        UiSnapshot { nodes }
    }
}
