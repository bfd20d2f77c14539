//! Conversation runtime for Parley dialogue graphs.
//!
//! [`DialogueLoader`] fetches and caches one graph per NPC, falling back to a
//! one-option "exit" graph when a script cannot be used.
//! [`ConversationRuntime`] plays a graph against a
//! [`StateStore`](parley_core::StateStore): timed lines, condition-filtered
//! options, and option side effects.

/// Runtime and loader settings.
pub mod config;
/// The conversation state machine.
pub mod conversation;
/// Error types for the runtime.
pub mod error;
/// Script loading and caching.
pub mod loader;
/// Line timing.
pub mod timing;
/// Per-conversation record of picked options.
pub mod used;

pub use config::{LoaderConfig, RuntimeConfig};
pub use conversation::{
    ConversationEvent, ConversationRuntime, ConversationState, EndReason, Selection,
    VisibleOption,
};
pub use error::{ConversationError, ConversationResult, LoadError, LoadResult};
pub use loader::{DialogueLoader, FsSource, MemorySource, ScriptSource, fallback_graph};
pub use timing::TurnTimer;
pub use used::UsedOptions;
