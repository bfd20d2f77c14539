//! Error types for the conversation runtime and loader.

use std::path::PathBuf;

use parley_script::ScriptError;
use thiserror::Error;

/// Result type for conversation operations.
pub type ConversationResult<T> = Result<T, ConversationError>;

/// Result type for script loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Contract violations by the caller of the runtime.
///
/// Content problems (dead ends, routes to missing nodes) are not errors; they
/// end the conversation gracefully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    /// A conversation is already running.
    #[error("already in a conversation with {npc}")]
    AlreadyActive {
        /// NPC of the running conversation.
        npc: String,
    },

    /// The graph has no node to start on.
    #[error("dialogue has no node named `{0}`")]
    UnknownEntryNode(String),

    /// Index past the end of the visible option list.
    #[error("invalid choice: {0}")]
    InvalidChoice(usize),
}

/// Why a dialogue script could not be turned into a graph.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the script failed.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Script location.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The source has no script for this NPC.
    #[error("no dialogue script for `{0}`")]
    NotFound(String),

    /// The script text produced no graph.
    #[error("dialogue for `{npc}` is unusable: {source}")]
    Parse {
        /// NPC whose script failed.
        npc: String,
        /// Parser error.
        #[source]
        source: ScriptError,
    },
}
