use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::flag::{FlagKey, FlagValue};
use crate::store::StateStore;

/// State store held entirely in memory.
///
/// Flags are filed by group (`story.met_alien` → group `story`), with flat
/// names going to the `misc` group. Everything is kept in sorted
/// collections so snapshots serialize deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    flags: BTreeMap<String, BTreeMap<String, FlagValue>>,
    inventory: BTreeSet<String>,
    visited_rooms: BTreeSet<String>,
    npc_states: BTreeMap<String, String>,
    asked: BTreeSet<String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a store from a JSON snapshot.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the store to pretty-printed JSON.
    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// All flags as `(group.name, value)` pairs, sorted.
    pub fn flags(&self) -> impl Iterator<Item = (String, &FlagValue)> {
        self.flags.iter().flat_map(|(group, names)| {
            names
                .iter()
                .map(move |(name, value)| (format!("{group}.{name}"), value))
        })
    }

    /// Items in the inventory, sorted.
    pub fn inventory(&self) -> impl Iterator<Item = &str> {
        self.inventory.iter().map(String::as_str)
    }

    /// Asked labels, sorted.
    pub fn asked_labels(&self) -> impl Iterator<Item = &str> {
        self.asked.iter().map(String::as_str)
    }
}

impl StateStore for MemoryStore {
    fn flag(&self, name: &str) -> Option<FlagValue> {
        let key = FlagKey::parse(name);
        self.flags
            .get(&key.group)
            .and_then(|group| group.get(&key.name))
            .cloned()
    }

    fn set_flag(&mut self, name: &str, value: FlagValue) {
        let key = FlagKey::parse(name);
        debug!("flag {key} = {value}");
        self.flags
            .entry(key.group)
            .or_default()
            .insert(key.name, value);
    }

    fn has_item(&self, item: &str) -> bool {
        self.inventory.contains(item)
    }

    fn add_item(&mut self, item: &str) {
        debug!("inventory + {item}");
        self.inventory.insert(item.to_string());
    }

    fn remove_item(&mut self, item: &str) {
        if self.inventory.remove(item) {
            debug!("inventory - {item}");
        }
    }

    fn has_visited_room(&self, room: &str) -> bool {
        self.visited_rooms.contains(room)
    }

    fn mark_room_visited(&mut self, room: &str) {
        self.visited_rooms.insert(room.to_string());
    }

    fn npc_state(&self, npc: &str) -> Option<String> {
        self.npc_states.get(npc).cloned()
    }

    fn set_npc_state(&mut self, npc: &str, state: &str) {
        self.npc_states.insert(npc.to_string(), state.to_string());
    }

    fn has_asked(&self, label: &str) -> bool {
        self.asked.contains(label)
    }

    fn mark_asked(&mut self, label: &str) {
        self.asked.insert(label.to_string());
    }
}
