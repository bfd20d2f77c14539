use std::path::Path;

use colored::Colorize;
use miette::miette;
use parley_script::diagnostics::summarize;
use parley_script::{ParserConfig, validate_graph};

pub fn run(path: &Path, parser: &ParserConfig, strict: bool) -> miette::Result<()> {
    let source = super::read_script(path)?;
    let parsed = match parley_script::parse_with(&source, parser) {
        Ok(parsed) => parsed,
        Err(err) => {
            let diagnostics = [err.to_diagnostic(&source)];
            super::print_diagnostics(&source, path, &diagnostics);
            println!("  {}", summarize(&diagnostics));
            return Err(miette!("{err} ({})", path.display()));
        }
    };

    super::print_diagnostics(&source, path, &parsed.diagnostics);
    let lint = validate_graph(&parsed.graph);
    for diagnostic in &lint {
        eprintln!("  {} {}", "warning:".yellow().bold(), diagnostic.message);
    }

    println!(
        "  {} {}: {} nodes, {} options",
        "Checked".bold(),
        path.display(),
        parsed.graph.len(),
        super::option_count(&parsed)
    );

    let mut all = parsed.diagnostics.clone();
    all.extend(lint);
    if all.is_empty() {
        println!("  All checks passed.");
        return Ok(());
    }

    println!("  {}", summarize(&all));
    if strict {
        return Err(miette!(
            "--strict: {} problem(s) in {}",
            all.len(),
            path.display()
        ));
    }
    Ok(())
}
