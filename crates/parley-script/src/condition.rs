//! Condition clauses gating dialogue lines and options.
//!
//! A clause is a comma-separated list of atoms, all of which must hold:
//!
//! ```text
//! has:key, !asked:weather, npc_state:zyx:grumpy, visited:bar, !story.met_alien
//! ```
//!
//! There is no OR and no grouping. Compiling never reads game state; the
//! resulting [`Condition`] is evaluated against a [`StateStore`] each time
//! visibility is computed.

use std::fmt;

use log::warn;
use parley_core::StateStore;
use serde::{Deserialize, Serialize};

/// Something that can be checked against game state.
pub trait Predicate {
    /// Evaluate against the current state. Must not mutate anything.
    fn evaluate(&self, state: &dyn StateStore) -> bool;
}

/// A compiled condition clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Option with this stable id was picked before.
    Asked {
        /// Asked label.
        label: String,
    },
    /// Option with this stable id was never picked.
    NotAsked {
        /// Asked label.
        label: String,
    },
    /// Player carries an item.
    HasItem {
        /// Item id.
        item: String,
    },
    /// Player does not carry an item.
    LacksItem {
        /// Item id.
        item: String,
    },
    /// Stored NPC state equals a value exactly.
    NpcState {
        /// NPC id.
        npc: String,
        /// Expected state.
        state: String,
    },
    /// Player has been in a room.
    Visited {
        /// Room id.
        room: String,
    },
    /// Flag is set and truthy.
    Flag {
        /// Flag name as written in the script.
        name: String,
    },
    /// Flag is unset or falsy.
    NotFlag {
        /// Flag name as written in the script.
        name: String,
    },
    /// Every inner condition holds.
    All {
        /// Conditions that must all hold.
        conditions: Vec<Condition>,
    },
    /// A clause that can never hold (malformed input).
    Never,
    /// Always true.
    #[default]
    Always,
}

impl Predicate for Condition {
    fn evaluate(&self, state: &dyn StateStore) -> bool {
        match self {
            Condition::Asked { label } => !label.is_empty() && state.has_asked(label),
            Condition::NotAsked { label } => label.is_empty() || !state.has_asked(label),
            Condition::HasItem { item } => state.has_item(item),
            Condition::LacksItem { item } => !state.has_item(item),
            Condition::NpcState { npc, state: expected } => {
                state.npc_state(npc).is_some_and(|s| s == *expected)
            }
            Condition::Visited { room } => state.has_visited_room(room),
            Condition::Flag { name } => state.is_flag_set(name),
            Condition::NotFlag { name } => !state.is_flag_set(name),
            Condition::All { conditions } => conditions.iter().all(|c| c.evaluate(state)),
            Condition::Never => false,
            Condition::Always => true,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Asked { label } => write!(f, "asked:{label}"),
            Condition::NotAsked { label } => write!(f, "!asked:{label}"),
            Condition::HasItem { item } => write!(f, "has:{item}"),
            Condition::LacksItem { item } => write!(f, "!has:{item}"),
            Condition::NpcState { npc, state } => write!(f, "npc_state:{npc}:{state}"),
            Condition::Visited { room } => write!(f, "visited:{room}"),
            Condition::Flag { name } => write!(f, "{name}"),
            Condition::NotFlag { name } => write!(f, "!{name}"),
            Condition::All { conditions } => {
                let parts: Vec<String> = conditions.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(", "))
            }
            Condition::Never => write!(f, "<never>"),
            Condition::Always => write!(f, "<always>"),
        }
    }
}

/// Compile a clause, logging any malformed atoms.
pub fn compile(clause: &str) -> Condition {
    let (condition, warnings) = compile_with_warnings(clause);
    for warning in warnings {
        warn!("{warning}");
    }
    condition
}

/// Compile a clause and return malformed-atom warnings to the caller.
///
/// Empty atoms (`a,,b`, trailing commas) are skipped silently. A single
/// atom compiles to itself; several compile to [`Condition::All`].
pub fn compile_with_warnings(clause: &str) -> (Condition, Vec<String>) {
    let mut warnings = Vec::new();
    let mut atoms: Vec<Condition> = clause
        .split(',')
        .map(str::trim)
        .filter(|atom| !atom.is_empty())
        .map(|atom| compile_atom(atom, &mut warnings))
        .collect();

    let condition = match atoms.len() {
        0 => Condition::Always,
        1 => atoms.remove(0),
        _ => Condition::All { conditions: atoms },
    };
    (condition, warnings)
}

fn compile_atom(atom: &str, warnings: &mut Vec<String>) -> Condition {
    if let Some(label) = atom.strip_prefix("asked:") {
        let label = label.trim();
        if label.is_empty() {
            warnings.push(format!("condition \"{atom}\" has no label"));
        }
        return Condition::Asked {
            label: label.to_string(),
        };
    }
    if let Some(label) = atom.strip_prefix("!asked:") {
        let label = label.trim();
        if label.is_empty() {
            warnings.push(format!("condition \"{atom}\" has no label"));
        }
        return Condition::NotAsked {
            label: label.to_string(),
        };
    }
    if let Some(item) = atom.strip_prefix("!has:") {
        return Condition::LacksItem {
            item: item.trim().to_string(),
        };
    }
    if let Some(item) = atom.strip_prefix("has:") {
        return Condition::HasItem {
            item: item.trim().to_string(),
        };
    }
    if let Some(rest) = atom.strip_prefix("npc_state:") {
        return match rest.split_once(':') {
            Some((npc, state)) => Condition::NpcState {
                npc: npc.trim().to_string(),
                state: state.trim().to_string(),
            },
            None => {
                warnings.push(format!(
                    "condition \"{atom}\" is missing a state (expected npc_state:<npc>:<state>)"
                ));
                Condition::Never
            }
        };
    }
    if let Some(room) = atom.strip_prefix("visited:") {
        return Condition::Visited {
            room: room.trim().to_string(),
        };
    }
    if let Some(name) = atom.strip_prefix('!') {
        if !name.contains(':') {
            return Condition::NotFlag {
                name: name.trim().to_string(),
            };
        }
    }
    Condition::Flag {
        name: atom.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{FlagValue, MemoryStore};
    use proptest::prelude::*;

    #[test]
    fn empty_clause_is_always() {
        assert_eq!(compile(""), Condition::Always);
        assert_eq!(compile(" , ,"), Condition::Always);
        assert!(compile("").evaluate(&MemoryStore::new()));
    }

    #[test]
    fn atom_forms() {
        assert_eq!(
            compile("asked:weather"),
            Condition::Asked {
                label: "weather".into()
            }
        );
        assert_eq!(
            compile("!asked:weather"),
            Condition::NotAsked {
                label: "weather".into()
            }
        );
        assert_eq!(compile("!has:key"), Condition::LacksItem { item: "key".into() });
        assert_eq!(compile("has:key"), Condition::HasItem { item: "key".into() });
        assert_eq!(
            compile("npc_state:zyx:grumpy"),
            Condition::NpcState {
                npc: "zyx".into(),
                state: "grumpy".into()
            }
        );
        assert_eq!(compile("visited:bar"), Condition::Visited { room: "bar".into() });
        assert_eq!(
            compile("!story.met"),
            Condition::NotFlag {
                name: "story.met".into()
            }
        );
        assert_eq!(
            compile("lamp_on"),
            Condition::Flag {
                name: "lamp_on".into()
            }
        );
    }

    #[test]
    fn negated_unknown_prefix_falls_back_to_flag() {
        assert_eq!(
            compile("!weird:thing"),
            Condition::Flag {
                name: "!weird:thing".into()
            }
        );
    }

    #[test]
    fn has_and_not_flag_combinations() {
        let condition = compile("has:key, !flagX");
        let mut store = MemoryStore::new();

        // no key, flag unset
        assert!(!condition.evaluate(&store));

        // key, flag unset
        store.add_item("key");
        assert!(condition.evaluate(&store));

        // key, flag set
        store.set_flag("flagX", FlagValue::Bool(true));
        assert!(!condition.evaluate(&store));

        // no key, flag set
        store.remove_item("key");
        assert!(!condition.evaluate(&store));
    }

    #[test]
    fn asked_labels() {
        let mut store = MemoryStore::new();
        let asked = compile("asked:weather");
        let not_asked = compile("!asked:weather");
        assert!(!asked.evaluate(&store));
        assert!(not_asked.evaluate(&store));

        store.mark_asked("weather");
        assert!(asked.evaluate(&store));
        assert!(!not_asked.evaluate(&store));
    }

    #[test]
    fn empty_asked_label_is_never_asked() {
        let (condition, warnings) = compile_with_warnings("asked:");
        assert_eq!(warnings.len(), 1);
        let mut store = MemoryStore::new();
        store.mark_asked("");
        assert!(!condition.evaluate(&store));
    }

    #[test]
    fn npc_state_equality() {
        let mut store = MemoryStore::new();
        let condition = compile("npc_state:zyx:grumpy");
        assert!(!condition.evaluate(&store));

        store.set_npc_state("zyx", "grumpy");
        assert!(condition.evaluate(&store));

        store.set_npc_state("zyx", "Grumpy");
        assert!(!condition.evaluate(&store));
    }

    #[test]
    fn npc_state_without_state_never_holds() {
        let (condition, warnings) = compile_with_warnings("npc_state:zyx");
        assert_eq!(condition, Condition::Never);
        assert_eq!(warnings.len(), 1);

        let mut store = MemoryStore::new();
        store.set_npc_state("zyx", "");
        assert!(!condition.evaluate(&store));
    }

    #[test]
    fn visited_rooms() {
        let mut store = MemoryStore::new();
        let condition = compile("visited:bar");
        assert!(!condition.evaluate(&store));
        store.mark_room_visited("bar");
        assert!(condition.evaluate(&store));
    }

    #[test]
    fn flags_use_store_namespacing() {
        let mut store = MemoryStore::new();
        store.set_flag("misc.alien_talked", FlagValue::Bool(true));
        assert!(compile("alien_talked").evaluate(&store));
        assert!(!compile("!alien_talked").evaluate(&store));
    }

    #[test]
    fn compiling_does_not_capture_state() {
        let mut store = MemoryStore::new();
        let condition = compile("door_open");
        assert!(!condition.evaluate(&store));
        store.set_flag("door_open", FlagValue::Bool(true));
        assert!(condition.evaluate(&store));
    }

    #[test]
    fn display_roundtrips_through_compile() {
        let source = "asked:a, !asked:b, has:c, !has:d, npc_state:e:f, visited:g, h, !i";
        let condition = compile(source);
        assert_eq!(condition.to_string(), source);
        assert_eq!(compile(&condition.to_string()), condition);
    }

    fn atom() -> impl Strategy<Value = String> {
        let name = "[a-z][a-z_]{0,6}";
        prop_oneof![
            name.prop_map(|n| format!("asked:{n}")),
            name.prop_map(|n| format!("!asked:{n}")),
            name.prop_map(|n| format!("has:{n}")),
            name.prop_map(|n| format!("!has:{n}")),
            (name, name).prop_map(|(n, s)| format!("npc_state:{n}:{s}")),
            name.prop_map(|n| format!("visited:{n}")),
            name.prop_map(|n| format!("!{n}")),
            name.prop_map(|n| n.to_string()),
        ]
    }

    fn store() -> impl Strategy<Value = MemoryStore> {
        let name = "[a-z][a-z_]{0,6}";
        (
            proptest::collection::vec(name, 0..4),
            proptest::collection::vec(name, 0..4),
            proptest::collection::vec((name, name), 0..3),
        )
            .prop_map(|(flags, items, npcs)| {
                let mut store = MemoryStore::new();
                for flag in &flags {
                    store.set_flag(flag, FlagValue::Bool(true));
                    store.mark_asked(flag);
                    store.mark_room_visited(flag);
                }
                for item in &items {
                    store.add_item(item);
                }
                for (npc, state) in &npcs {
                    store.set_npc_state(npc, state);
                }
                store
            })
    }

    proptest! {
        #[test]
        fn evaluation_is_pure(atoms in proptest::collection::vec(atom(), 0..5), store in store()) {
            let condition = compile(&atoms.join(", "));
            let before = store.clone();
            let first = condition.evaluate(&store);
            let second = condition.evaluate(&store);
            prop_assert_eq!(first, second);
            prop_assert_eq!(before, store);
        }

        #[test]
        fn conjunction_matches_atoms(atoms in proptest::collection::vec(atom(), 1..5), store in store()) {
            let all = compile(&atoms.join(","));
            let each = atoms.iter().all(|a| compile(a).evaluate(&store));
            prop_assert_eq!(all.evaluate(&store), each);
        }
    }
}
