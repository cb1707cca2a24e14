use crate::resolver::snapshot::{NodeId, UiSnapshot};
use async_trait::async_trait;

/// Platform-agnostic UI surface. The engine only ever observes the UI
/// through `snapshot` and mutates it through the remaining primitives;
/// everything above this trait is driver-independent.
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Scan the current UI into a flat snapshot.
    async fn snapshot(&self) -> anyhow::Result<UiSnapshot>;

    async fn click(&self, node: NodeId) -> anyhow::Result<()>;

    /// Replace the text content of an input.
    async fn set_text(&self, node: NodeId, value: &str) -> anyhow::Result<()>;

    /// Choose a dropdown option by its visible label.
    async fn choose_option(&self, node: NodeId, value: &str) -> anyhow::Result<()>;

    /// Select a radio option or set a checkbox state.
    async fn toggle(&self, node: NodeId, selected: bool) -> anyhow::Result<()>;

    /// Fill both endpoints of a date-range picker.
    async fn set_date_range(&self, node: NodeId, start: &str, end: &str) -> anyhow::Result<()>;
}
