use super::descriptor::{normalize, token_overlap, Descriptor};
use super::snapshot::{NodeId, UiSnapshot};
use super::{MatchOutcome, Strategy};
use crate::utils::StrategyKind;
use std::sync::Arc;

/// Injected natural-language-to-element ranking capability. The engine
/// never binds a concrete model; tests use a deterministic stub and the
/// default is a lexical stand-in.
pub trait SemanticRanker: Send + Sync {
    /// Score every candidate node against the descriptor, best first.
    fn rank(&self, descriptor: &Descriptor, snapshot: &UiSnapshot) -> Vec<(NodeId, f64)>;
}

/// Deterministic token-overlap ranker used when no model is plugged in.
pub struct LexicalRanker;

impl SemanticRanker for LexicalRanker {
    fn rank(&self, descriptor: &Descriptor, snapshot: &UiSnapshot) -> Vec<(NodeId, f64)> {
        let wanted = normalize(&descriptor.raw);
        let mut scored: Vec<(NodeId, f64)> = snapshot
            .candidates()
            .map(|n| {
                let score = n
                    .match_texts()
                    .map(|t| token_overlap(&wanted, &normalize(t)))
                    .fold(0.0f64, f64::max);
                (n.id, score)
            })
            .collect();
        // Stable order: score descending, node id ascending on ties
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
        scored
    }
}

/// Last-resort strategy: rank candidates through the injected model and
/// accept the top one above the confidence floor. A tie at the top is an
/// ambiguity, not a free choice.
pub struct SemanticStrategy {
    ranker: Arc<dyn SemanticRanker>,
    confidence_floor: f64,
}

impl SemanticStrategy {
    pub fn new(ranker: Arc<dyn SemanticRanker>, confidence_floor: f64) -> Self {
        Self {
            ranker,
            confidence_floor,
        }
    }
}

impl Strategy for SemanticStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Ai
    }

    fn find(&self, descriptor: &Descriptor, snapshot: &UiSnapshot) -> MatchOutcome {
        let ranked = self.ranker.rank(descriptor, snapshot);
        let above: Vec<_> = ranked
            .into_iter()
            .filter(|(_, score)| *score >= self.confidence_floor)
            .collect();

        let Some(&(top_id, top_score)) = above.first() else {
            return MatchOutcome::None;
        };

        let tied = above
            .iter()
            .filter(|(_, s)| (s - top_score).abs() < f64::EPSILON)
            .count();
        if tied > 1 {
            MatchOutcome::Ambiguous(tied)
        } else {
            MatchOutcome::Unique(top_id)
        }
    }
}
