use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use miette::IntoDiagnostic;
use parley_script::{DialogueNode, DialogueOption, ParserConfig, render_outline};

/// How to print the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Plain,
    Json,
}

pub fn run(path: &Path, parser: &ParserConfig, format: Format) -> miette::Result<()> {
    let script = super::load_script(path, parser)?;
    super::print_diagnostics(&script.source, path, &script.parsed.diagnostics);
    let graph = &script.parsed.graph;

    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(graph).into_diagnostic()?;
            println!("{json}");
        }
        Format::Plain => print!("{}", render_outline(graph)),
        Format::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Node", "#", "Option", "Requires", "Route", "Effects"]);

            for (key, node) in graph.nodes() {
                let label = node_label(key, node);
                if node.options.is_empty() {
                    table.add_row(vec![label.as_str(), "", "(no options)", "", "", ""]);
                }
                for (index, option) in node.options.iter().enumerate() {
                    let number = (index + 1).to_string();
                    let requires = option
                        .condition
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    let route = route(option);
                    let effects = effects(option);
                    let node_cell = if index == 0 { label.as_str() } else { "" };
                    table.add_row(vec![
                        node_cell,
                        &number,
                        &option.text,
                        &requires,
                        &route,
                        &effects,
                    ]);
                }
            }

            println!("{table}");
            println!();
            println!(
                "  {} nodes, {} options",
                graph.len(),
                super::option_count(&script.parsed)
            );
        }
    }

    Ok(())
}

fn node_label(key: &str, node: &DialogueNode) -> String {
    let mut label = key.to_string();
    if node.is_default {
        label.push_str(" (default)");
    }
    if let Some(state) = &node.npc_state {
        label.push_str(&format!(" [{state}]"));
    }
    label
}

fn route(option: &DialogueOption) -> String {
    match (&option.next_node, option.exit) {
        (_, true) => "END".to_string(),
        (Some(next), false) => next.clone(),
        (None, false) => "-".to_string(),
    }
}

fn effects(option: &DialogueOption) -> String {
    let Some(actions) = &option.actions else {
        return String::new();
    };
    let mut parts: Vec<String> = Vec::new();
    parts.extend(actions.set_flags.iter().map(|f| format!("set {f}")));
    parts.extend(actions.add_items.iter().map(|i| format!("+{i}")));
    parts.extend(actions.remove_items.iter().map(|i| format!("-{i}")));
    if actions.once {
        parts.push("once".to_string());
    }
    parts.join(", ")
}
