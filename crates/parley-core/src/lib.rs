//! Persistent game state for Parley: flags, inventory, visited rooms, NPC
//! states, and asked labels.
//!
//! The dialogue engine reads this state to decide which lines and options
//! are visible and writes it when the player picks an option. Everything
//! goes through the [`StateStore`] trait so games can plug in their own
//! backing store; [`MemoryStore`] is the in-process implementation used by
//! the CLI and the tests.

/// Error types for state snapshots.
pub mod error;
/// Flag values and dotted-group flag names.
pub mod flag;
/// In-memory state store.
pub mod memory;
/// The state store contract.
pub mod store;

/// Re-export error types.
pub use error::{StoreError, StoreResult};
/// Re-export flag types.
pub use flag::{FlagKey, FlagValue, MISC_GROUP};
/// Re-export the in-memory store.
pub use memory::MemoryStore;
/// Re-export the store trait.
pub use store::StateStore;
