use super::descriptor::Descriptor;
use super::snapshot::UiSnapshot;
use super::{MatchOutcome, Strategy};
use crate::utils::StrategyKind;

/// Matches the descriptor's literal phrase exactly against accessible
/// name, label, identifier, or visible text.
pub struct ExactStrategy;

impl Strategy for ExactStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Exact
    }

    fn find(&self, descriptor: &Descriptor, snapshot: &UiSnapshot) -> MatchOutcome {
        let wanted = descriptor.target.trim();
        if wanted.is_empty() {
            return MatchOutcome::None;
        }

        let hits: Vec<_> = snapshot
            .candidates()
            .filter(|n| n.match_texts().any(|t| t.trim() == wanted))
            .map(|n| n.id)
            .collect();

        MatchOutcome::from_hits(&hits)
    }
}
