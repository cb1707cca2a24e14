use super::descriptor::{normalize, Descriptor};
use super::snapshot::UiSnapshot;
use super::{MatchOutcome, Strategy};
use crate::utils::StrategyKind;

/// Case- and whitespace-insensitive substring / token match against
/// visible text, labels, and placeholders.
pub struct FuzzyStrategy;

fn fuzzy_hit(wanted: &str, candidate: &str) -> bool {
    let candidate = normalize(candidate);
    if candidate.is_empty() {
        return false;
    }
    // Substring either way, or every descriptor token present
    candidate.contains(wanted)
        || wanted.contains(&candidate)
        || wanted
            .split_whitespace()
            .all(|tok| candidate.split_whitespace().any(|c| c == tok))
}

impl Strategy for FuzzyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fuzzy
    }

    fn find(&self, descriptor: &Descriptor, snapshot: &UiSnapshot) -> MatchOutcome {
        let wanted = normalize(&descriptor.target);
        if wanted.is_empty() {
            return MatchOutcome::None;
        }

        let hits: Vec<_> = snapshot
            .candidates()
            .filter(|n| n.match_texts().any(|t| fuzzy_hit(&wanted, t)))
            .map(|n| n.id)
            .collect();

        MatchOutcome::from_hits(&hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_support::{node, snapshot};

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let snap = snapshot(vec![node(1, "button", Some("  LOGIN  "))]);
        let d = Descriptor::parse("login");
        assert_eq!(FuzzyStrategy.find(&d, &snap), MatchOutcome::Unique(1));
    }

    #[test]
    fn test_substring_match() {
        let snap = snapshot(vec![node(1, "link", Some("Go to Challenges page"))]);
        let d = Descriptor::parse("Challenges");
        assert_eq!(FuzzyStrategy.find(&d, &snap), MatchOutcome::Unique(1));
    }

    #[test]
    fn test_multiple_hits_are_ambiguous() {
        let snap = snapshot(vec![
            node(1, "link", Some("Challenge list")),
            node(2, "button", Some("New challenge")),
        ]);
        let d = Descriptor::parse("challenge");
        assert_eq!(FuzzyStrategy.find(&d, &snap), MatchOutcome::Ambiguous(2));
    }

    #[test]
    fn test_no_match() {
        let snap = snapshot(vec![node(1, "button", Some("Save"))]);
        let d = Descriptor::parse("Cancel");
        assert_eq!(FuzzyStrategy.find(&d, &snap), MatchOutcome::None);
    }
}
