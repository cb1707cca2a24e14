use super::traits::UiDriver;
use crate::resolver::snapshot::{NodeId, UiSnapshot};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Simulated driver over an in-memory snapshot. Mutations edit the nodes
/// directly so verification steps observe the effects of earlier actions.
/// Used by the engine's own tests and by `run --snapshot` dry runs.
/// Clones share state, so a test can keep a handle while the executor
/// owns another.
#[derive(Clone)]
pub struct MemoryDriver {
    state: Arc<Mutex<MemoryState>>,
}

struct MemoryState {
    snapshot: UiSnapshot,

    /// Snapshots to serve before settling on `snapshot`, simulating a UI
    /// that is still rendering
    pending: VecDeque<UiSnapshot>,

    /// Operations applied, oldest first, for test assertions
    log: Vec<String>,
}

impl MemoryDriver {
    pub fn new(snapshot: UiSnapshot) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                snapshot,
                pending: VecDeque::new(),
                log: Vec::new(),
            })),
        }
    }

    /// Serve the given snapshots, in order, for the next scans before
    /// falling through to the final snapshot.
    pub async fn stage(&self, snapshots: Vec<UiSnapshot>) {
        self.state.lock().await.pending.extend(snapshots);
    }

    pub async fn operations(&self) -> Vec<String> {
        self.state.lock().await.log.clone()
    }

    pub async fn current(&self) -> UiSnapshot {
        self.state.lock().await.snapshot.clone()
    }
}

impl MemoryState {
    fn node_mut(&mut self, id: NodeId) -> Result<&mut crate::resolver::snapshot::UiNode> {
        self.snapshot
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| anyhow!("no node {id} in snapshot"))
    }
}

#[async_trait]
impl UiDriver for MemoryDriver {
    async fn snapshot(&self) -> Result<UiSnapshot> {
        let mut state = self.state.lock().await;
        if let Some(next) = state.pending.pop_front() {
            return Ok(next);
        }
        Ok(state.snapshot.clone())
    }

    async fn click(&self, node: NodeId) -> Result<()> {
        let mut state = self.state.lock().await;
        let role = state.node_mut(node)?.role.clone();
        match role.as_str() {
            "checkbox" => {
                let target = state.node_mut(node)?;
                target.selected = !target.selected;
            }
            "radio" => {
                for other in state.snapshot.nodes.iter_mut() {
                    if other.role == "radio" {
                        other.selected = other.id == node;
                    }
                }
            }
            _ => {}
        }
        state.log.push(format!("click({node})"));
        Ok(())
    }

    async fn set_text(&self, node: NodeId, value: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.node_mut(node)?.value = Some(value.to_string());
        state.log.push(format!("setText({node}, \"{value}\")"));
        Ok(())
    }

    async fn choose_option(&self, node: NodeId, value: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let target = state.node_mut(node)?;
        target.value = Some(value.to_string());
        target.selected = true;
        state.log.push(format!("chooseOption({node}, \"{value}\")"));
        Ok(())
    }

    async fn toggle(&self, node: NodeId, selected: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        let target = state.node_mut(node)?;
        let is_radio = target.role == "radio";
        target.selected = selected;
        if is_radio && selected {
            for other in state.snapshot.nodes.iter_mut() {
                if other.role == "radio" && other.id != node {
                    other.selected = false;
                }
            }
        }
        state.log.push(format!("toggle({node}, {selected})"));
        Ok(())
    }

    async fn set_date_range(&self, node: NodeId, start: &str, end: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.node_mut(node)?.value = Some(format!("{start} - {end}"));
        state
            .log
            .push(format!("setDateRange({node}, \"{start}\", \"{end}\")"));
        Ok(())
    }
}
