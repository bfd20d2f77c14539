//! The compiled dialogue graph.

use std::collections::BTreeMap;

use parley_core::StateStore;
use serde::{Deserialize, Serialize};

use crate::condition::{Condition, Predicate};

/// Key of the node every conversation opens on unless told otherwise.
pub const START_NODE: &str = "start";

/// Routing target that ends the conversation.
pub const END_TARGET: &str = "END";

/// Who speaks a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The player character.
    Hero,
    /// Anyone else.
    Npc,
}

/// A single spoken line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Hero or NPC, decided when the script was parsed.
    pub speaker: Speaker,
    /// Lowercased speaker name as written in the script.
    pub name: String,
    /// What is said.
    pub text: String,
}

impl Line {
    /// Create a line.
    pub fn new(speaker: Speaker, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker,
            name: name.into(),
            text: text.into(),
        }
    }
}

/// A group of lines played when a node is entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroBlock {
    /// Shown only when this holds. `None` means always.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Lines in playing order. May be empty.
    pub lines: Vec<Line>,
}

/// Side effects applied when an option is picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actions {
    /// Flags set to `true`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_flags: Vec<String>,
    /// Items added to the inventory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add_items: Vec<String>,
    /// Items removed from the inventory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove_items: Vec<String>,
    /// The option disappears once picked.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub once: bool,
}

impl Actions {
    /// Whether there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.set_flags.is_empty()
            && self.add_items.is_empty()
            && self.remove_items.is_empty()
            && !self.once
    }

    /// Apply flag and inventory effects, in that order.
    pub fn apply(&self, state: &mut dyn StateStore) {
        for flag in &self.set_flags {
            state.set_flag(flag, true.into());
        }
        for item in &self.add_items {
            state.add_item(item);
        }
        for item in &self.remove_items {
            state.remove_item(item);
        }
    }
}

/// A player choice within a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueOption {
    /// Label shown in the choice menu.
    pub text: String,
    /// What the hero says on picking this. Empty plays nothing.
    pub hero_line: String,
    /// NPC reply. `None` when there is none; never an empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npc_response: Option<Vec<Line>>,
    /// Hidden unless this holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Node to move to afterwards. `None` stays on the current node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_node: Option<String>,
    /// End the conversation afterwards, regardless of `next_node`.
    #[serde(default)]
    pub exit: bool,
    /// Side effects, present only when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Actions>,
    /// Stable id checked by `asked:<id>` conditions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl DialogueOption {
    /// Whether the option should be listed for the given state.
    pub fn is_visible(&self, state: &dyn StateStore) -> bool {
        self.condition.as_ref().is_none_or(|c| c.evaluate(state))
    }

    /// Whether picking this option marks it as spent.
    pub fn is_once(&self) -> bool {
        self.actions.as_ref().is_some_and(|a| a.once)
    }
}

/// A named state in the dialogue graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueNode {
    /// Lines that may play on entry; the first matching block wins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intro_blocks: Vec<IntroBlock>,
    /// Choices in menu order.
    pub options: Vec<DialogueOption>,
    /// Marked `# default`.
    #[serde(default)]
    pub is_default: bool,
    /// NPC state this node is written for (`# npc_state:`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npc_state: Option<String>,
    /// Node-level `# requires:` clause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_condition: Option<Condition>,
    /// Human-readable id (`# id:`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl DialogueNode {
    /// The intro block to play for the given state, if any.
    ///
    /// The first conditional block whose condition holds is chosen, even if
    /// it has no lines; otherwise the first unconditional block.
    pub fn intro_for(&self, state: &dyn StateStore) -> Option<&IntroBlock> {
        self.intro_blocks
            .iter()
            .find(|b| b.condition.as_ref().is_some_and(|c| c.evaluate(state)))
            .or_else(|| self.intro_blocks.iter().find(|b| b.condition.is_none()))
    }

    /// Options visible for the given state, with their index in `options`.
    pub fn visible_options<'a>(
        &'a self,
        state: &'a dyn StateStore,
    ) -> impl Iterator<Item = (usize, &'a DialogueOption)> + 'a {
        self.options
            .iter()
            .enumerate()
            .filter(move |(_, option)| option.is_visible(state))
    }
}

/// Mapping from node key to node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogueGraph {
    nodes: BTreeMap<String, DialogueNode>,
}

impl DialogueGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, node: DialogueNode) -> Option<DialogueNode> {
        self.nodes.insert(key.into(), node)
    }

    /// Look up a node.
    pub fn node(&self, key: &str) -> Option<&DialogueNode> {
        self.nodes.get(key)
    }

    /// Whether a node exists.
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Node keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Nodes with their keys, sorted by key.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &DialogueNode)> {
        self.nodes.iter().map(|(k, n)| (k.as_str(), n))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pick the node a conversation with `npc` should open on.
    ///
    /// A node annotated with the NPC's current state whose entry condition
    /// holds wins; then the `# default` node; then [`START_NODE`].
    pub fn entry_node(&self, state: &dyn StateStore, npc: &str) -> Option<&str> {
        let npc_state = state.npc_state(npc);
        let entry_holds = |node: &DialogueNode| {
            node.entry_condition
                .as_ref()
                .is_none_or(|c| c.evaluate(state))
        };

        if let Some(current) = npc_state.as_deref() {
            let by_state = self.nodes().find(|&(_, node)| {
                node.npc_state.as_deref() == Some(current) && entry_holds(node)
            });
            if let Some((key, _)) = by_state {
                return Some(key);
            }
        }

        self.nodes()
            .find(|&(_, node)| node.is_default && entry_holds(node))
            .map(|(key, _)| key)
            .or_else(|| self.nodes.get_key_value(START_NODE).map(|(k, _)| k.as_str()))
    }
}
