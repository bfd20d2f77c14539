pub mod check;
pub mod outline;
pub mod play;

use std::fs;
use std::path::Path;

use miette::{IntoDiagnostic, WrapErr, miette};
use parley_script::diagnostics::{Diagnostic, render_diagnostics};
use parley_script::{ParsedScript, ParserConfig};

/// A script file's text and what the parser made of it.
struct Script {
    source: String,
    parsed: ParsedScript,
}

fn read_script(path: &Path) -> miette::Result<String> {
    fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read {}", path.display()))
}

/// Read and parse a script file.
fn load_script(path: &Path, config: &ParserConfig) -> miette::Result<Script> {
    let source = read_script(path)?;
    let parsed = parley_script::parse_with(&source, config)
        .map_err(|err| miette!("{err} ({})", path.display()))?;
    Ok(Script { source, parsed })
}

/// Print diagnostics with source excerpts to stderr using ariadne.
fn print_diagnostics(source: &str, path: &Path, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    let color = colored::control::SHOULD_COLORIZE.should_colorize();
    let filename = path.display().to_string();
    eprint!(
        "{}",
        render_diagnostics(source, &filename, diagnostics, color)
    );
}

/// Number of options across all nodes.
fn option_count(parsed: &ParsedScript) -> usize {
    parsed
        .graph
        .nodes()
        .map(|(_, node)| node.options.len())
        .sum()
}
