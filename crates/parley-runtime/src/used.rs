//! Options already picked in the current conversation.

use std::collections::{BTreeMap, BTreeSet};

/// Which options of which nodes have been selected.
///
/// Keyed by node key and the option's index in the node, so it never needs
/// to write into the shared graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedOptions {
    by_node: BTreeMap<String, BTreeSet<usize>>,
}

impl UsedOptions {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an option as picked. Returns `false` if it already was.
    pub fn mark(&mut self, node: impl Into<String>, index: usize) -> bool {
        self.by_node.entry(node.into()).or_default().insert(index)
    }

    /// Whether an option was picked.
    pub fn is_used(&self, node: &str, index: usize) -> bool {
        self.by_node
            .get(node)
            .is_some_and(|used| used.contains(&index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_used_options() {
        let mut used = UsedOptions::new();
        assert!(!used.is_used("start", 0));

        assert!(used.mark("start", 0));
        assert!(!used.mark("start", 0));
        assert!(used.is_used("start", 0));
        assert!(!used.is_used("start", 1));
        assert!(!used.is_used("other", 0));
    }

    #[test]
    fn nodes_are_tracked_separately() {
        let mut used = UsedOptions::new();
        used.mark("start", 2);
        used.mark("hub", 1);
        assert!(used.is_used("start", 2));
        assert!(!used.is_used("hub", 2));
        assert!(used.is_used("hub", 1));
    }
}
