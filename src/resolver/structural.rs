use super::descriptor::{normalize, Descriptor};
use super::snapshot::{NodeId, UiSnapshot};
use super::{MatchOutcome, Strategy};
use crate::utils::StrategyKind;

/// Matches descriptor kind keywords against element roles, combined with
/// nearest-label association: a "Challenge Name field" resolves to the
/// input closest in document order to a label reading "Challenge Name".
pub struct StructuralStrategy;

impl Strategy for StructuralStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Structural
    }

    fn find(&self, descriptor: &Descriptor, snapshot: &UiSnapshot) -> MatchOutcome {
        let Some(kind) = descriptor.kind else {
            // Without a kind keyword there is no structure to match on
            return MatchOutcome::None;
        };

        let role_matches: Vec<&_> = snapshot
            .candidates()
            .filter(|n| kind.matches_role(&n.role))
            .collect();
        if role_matches.is_empty() {
            return MatchOutcome::None;
        }

        let wanted = normalize(&descriptor.target);
        if wanted.is_empty() {
            // Bare kind ("the dropdown"): only a lone element of that role
            // is unambiguous
            let ids: Vec<_> = role_matches.iter().map(|n| n.id).collect();
            return MatchOutcome::from_hits(&ids);
        }

        // Prefer role matches carrying the target in their own texts
        let direct: Vec<_> = role_matches
            .iter()
            .filter(|n| n.match_texts().any(|t| normalize(t).contains(&wanted)))
            .map(|n| n.id)
            .collect();
        if !direct.is_empty() {
            return MatchOutcome::from_hits(&direct);
        }

        // Nearest-label association: find label/text nodes naming the
        // target, then the closest role match in document order
        let anchors: Vec<usize> = snapshot
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| {
                n.visible
                    && matches!(n.role.as_str(), "label" | "text")
                    && n.match_texts().any(|t| normalize(t).contains(&wanted))
            })
            .map(|(i, _)| i)
            .collect();
        if anchors.is_empty() {
            return MatchOutcome::None;
        }

        let mut best: Vec<NodeId> = Vec::new();
        let mut best_dist = usize::MAX;
        for node in &role_matches {
            let Some(pos) = snapshot.position(node.id) else {
                continue;
            };
            let dist = anchors
                .iter()
                .map(|a| a.abs_diff(pos))
                .min()
                .unwrap_or(usize::MAX);
            if dist < best_dist {
                best_dist = dist;
                best = vec![node.id];
            } else if dist == best_dist {
                best.push(node.id);
            }
        }

        MatchOutcome::from_hits(&best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_support::{labeled_input, node, snapshot};

    #[test]
    fn test_label_association() {
        let snap = snapshot(vec![
            node(1, "label", Some("Challenge Name")),
            labeled_input(2, None),
            node(3, "label", Some("Description")),
            labeled_input(4, None),
        ]);
        let d = Descriptor::parse("Challenge Name field");
        assert_eq!(StructuralStrategy.find(&d, &snap), MatchOutcome::Unique(2));
    }

    #[test]
    fn test_direct_labeled_role_match() {
        let snap = snapshot(vec![
            labeled_input(1, Some("Challenge Name")),
            labeled_input(2, Some("Description")),
        ]);
        let d = Descriptor::parse("Challenge Name field");
        assert_eq!(StructuralStrategy.find(&d, &snap), MatchOutcome::Unique(1));
    }

    #[test]
    fn test_no_kind_keyword_is_no_match() {
        let snap = snapshot(vec![labeled_input(1, Some("Challenge Name"))]);
        let d = Descriptor::parse("Challenge Name");
        assert_eq!(StructuralStrategy.find(&d, &snap), MatchOutcome::None);
    }

    #[test]
    fn test_equidistant_anchors_ambiguous() {
        let snap = snapshot(vec![
            labeled_input(1, None),
            node(2, "label", Some("Amount")),
            labeled_input(3, None),
        ]);
        let d = Descriptor::parse("Amount field");
        assert_eq!(
            StructuralStrategy.find(&d, &snap),
            MatchOutcome::Ambiguous(2)
        );
    }

    #[test]
    fn test_lone_role_without_target() {
        let snap = snapshot(vec![
            node(1, "select", None),
            node(2, "button", Some("Save")),
        ]);
        let d = Descriptor::parse("the dropdown");
        assert_eq!(StructuralStrategy.find(&d, &snap), MatchOutcome::Unique(1));
    }
}
