use serde::{Deserialize, Serialize};
use std::path::Path;

pub type NodeId = u32;

/// One element in a UI snapshot. Flattened form of the driver's UI tree:
/// document order is preserved in the node list, which the structural
/// strategy uses for nearest-label association.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiNode {
    pub id: NodeId,

    /// Element role/type hint: "button", "input", "select", "checkbox",
    /// "radio", "link", "label", "text", "daterange", ...
    pub role: String,

    /// Accessible name
    #[serde(default)]
    pub name: Option<String>,

    /// Associated label text
    #[serde(default)]
    pub label: Option<String>,

    /// Stable identifier (DOM id / resource id)
    #[serde(default)]
    pub identifier: Option<String>,

    /// Visible text content
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub placeholder: Option<String>,

    /// Current value (input text, chosen option, date range)
    #[serde(default)]
    pub value: Option<String>,

    #[serde(default)]
    pub selected: bool,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

impl UiNode {
    /// All texts a matching strategy may compare against.
    pub fn match_texts(&self) -> impl Iterator<Item = &str> {
        [
            self.name.as_deref(),
            self.label.as_deref(),
            self.identifier.as_deref(),
            self.text.as_deref(),
            self.placeholder.as_deref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Only visible, enabled nodes are candidates for interaction.
    pub fn is_candidate(&self) -> bool {
        self.visible && self.enabled
    }
}

/// A point-in-time scan of the UI. Resolution is stateless across steps:
/// each step re-scans, since actions mutate the UI between steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSnapshot {
    pub nodes: Vec<UiNode>,
}

impl UiSnapshot {
    pub fn node(&self, id: NodeId) -> Option<&UiNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Index of a node in document order.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn candidates(&self) -> impl Iterator<Item = &UiNode> {
        self.nodes.iter().filter(|n| n.is_candidate())
    }

    /// Concatenated visible text of the whole snapshot, used by page-level
    /// text verification.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        for node in self.nodes.iter().filter(|n| n.visible) {
            for t in [node.text.as_deref(), node.value.as_deref()]
                .into_iter()
                .flatten()
            {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(t);
            }
        }
        out
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_node() {
        let snapshot: UiSnapshot = serde_json::from_str(
            r#"{"nodes":[{"id":1,"role":"button","text":"Login"}]}"#,
        )
        .unwrap();
        let node = snapshot.node(1).unwrap();
        assert!(node.enabled);
        assert!(node.visible);
        assert!(!node.selected);
    }

    #[test]
    fn test_visible_text_skips_hidden() {
        let snapshot: UiSnapshot = serde_json::from_str(
            r#"{"nodes":[
                {"id":1,"role":"text","text":"shown"},
                {"id":2,"role":"text","text":"hidden","visible":false}
            ]}"#,
        )
        .unwrap();
        assert!(snapshot.visible_text().contains("shown"));
        assert!(!snapshot.visible_text().contains("hidden"));
    }
}
