//! Parley dialogue scripts.
//!
//! Turns the line-oriented script format into a [`DialogueGraph`]: named
//! nodes holding intro blocks and player options, with `# requires:` clauses
//! compiled into [`Condition`] values that are evaluated against a
//! [`parley_core::StateStore`] at runtime.
//!
//! ```
//! let parsed = parley_script::parse("=== start ===\n- Leave\nnate: Bye.\n> END\n").unwrap();
//! let start = parsed.graph.node("start").unwrap();
//! assert!(start.options[0].exit);
//! ```

/// Condition clauses and their evaluation.
pub mod condition;
/// Script diagnostics and their ariadne rendering.
pub mod diagnostics;
/// Error types for this crate.
pub mod error;
/// The dialogue graph model.
pub mod graph;
/// Plain-text graph outline.
pub mod outline;
/// The script parser.
pub mod parser;
/// Structural lint over parsed graphs.
pub mod validate;

pub use condition::{Condition, Predicate, compile};
pub use diagnostics::{Diagnostic, Severity};
pub use error::{ScriptError, ScriptResult};
pub use graph::{
    Actions, DialogueGraph, DialogueNode, DialogueOption, END_TARGET, IntroBlock, Line, START_NODE,
    Speaker,
};
pub use outline::render_outline;
pub use parser::{ParsedScript, ParserConfig, parse, parse_with};
pub use validate::validate_graph;
