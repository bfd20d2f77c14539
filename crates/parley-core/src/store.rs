use crate::flag::FlagValue;

/// Persistent game state read by dialogue conditions and written by
/// dialogue actions.
///
/// Implementations own flag namespacing: callers pass names exactly as the
/// script wrote them (`alien_talked`, `story.met_alien`) and the store
/// decides how they are filed.
pub trait StateStore {
    /// Look up a flag.
    fn flag(&self, name: &str) -> Option<FlagValue>;

    /// Store a flag value.
    fn set_flag(&mut self, name: &str, value: FlagValue);

    /// Whether a flag is present and truthy.
    fn is_flag_set(&self, name: &str) -> bool {
        self.flag(name).is_some_and(|v| v.is_truthy())
    }

    /// Whether the player carries an item.
    fn has_item(&self, item: &str) -> bool;

    /// Put an item in the player's inventory.
    fn add_item(&mut self, item: &str);

    /// Take an item out of the player's inventory. No-op if absent.
    fn remove_item(&mut self, item: &str);

    /// Whether the player has been in a room.
    fn has_visited_room(&self, room: &str) -> bool;

    /// Record that the player has been in a room.
    fn mark_room_visited(&mut self, room: &str);

    /// Symbolic state of an NPC, if one was ever set.
    fn npc_state(&self, npc: &str) -> Option<String>;

    /// Set the symbolic state of an NPC.
    fn set_npc_state(&mut self, npc: &str, state: &str);

    /// Whether a dialogue option with this stable id was picked before.
    fn has_asked(&self, label: &str) -> bool;

    /// Record that a dialogue option with this stable id was picked.
    fn mark_asked(&mut self, label: &str);
}

impl<T: StateStore + ?Sized> StateStore for &mut T {
    fn flag(&self, name: &str) -> Option<FlagValue> {
        (**self).flag(name)
    }

    fn set_flag(&mut self, name: &str, value: FlagValue) {
        (**self).set_flag(name, value);
    }

    fn is_flag_set(&self, name: &str) -> bool {
        (**self).is_flag_set(name)
    }

    fn has_item(&self, item: &str) -> bool {
        (**self).has_item(item)
    }

    fn add_item(&mut self, item: &str) {
        (**self).add_item(item);
    }

    fn remove_item(&mut self, item: &str) {
        (**self).remove_item(item);
    }

    fn has_visited_room(&self, room: &str) -> bool {
        (**self).has_visited_room(room)
    }

    fn mark_room_visited(&mut self, room: &str) {
        (**self).mark_room_visited(room);
    }

    fn npc_state(&self, npc: &str) -> Option<String> {
        (**self).npc_state(npc)
    }

    fn set_npc_state(&mut self, npc: &str, state: &str) {
        (**self).set_npc_state(npc, state);
    }

    fn has_asked(&self, label: &str) -> bool {
        (**self).has_asked(label)
    }

    fn mark_asked(&mut self, label: &str) {
        (**self).mark_asked(label);
    }
}
