use serde::{Deserialize, Serialize};

/// Traversal settings that are independent of the filter chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkOptions {
    /// Emit the root itself (as path `.`) and run it through the filters.
    pub include_root: bool,
    /// Do not descend below this depth. The root is depth 0.
    pub max_depth: Option<usize>,
    /// Slots in the handoff channel. `0` makes every handoff a rendezvous
    /// with a consumer, so no entry is produced before it is asked for.
    /// Entries still queued when the walk is cancelled are never delivered.
    pub channel_capacity: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            include_root: false,
            max_depth: None,
            channel_capacity: 0,
        }
    }
}
