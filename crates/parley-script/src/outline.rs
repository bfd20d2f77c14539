//! Plain-text outline of a dialogue graph, for reviewing scripts at a glance.

use std::fmt;

use crate::graph::{DialogueGraph, DialogueNode, DialogueOption};

/// Displays a graph one node per paragraph, nodes in key order.
pub struct Outline<'a>(pub &'a DialogueGraph);

/// Render a graph outline to a string.
pub fn render_outline(graph: &DialogueGraph) -> String {
    Outline(graph).to_string()
}

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, node)) in self.0.nodes().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write_node(f, key, node)?;
        }
        Ok(())
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "line" } else { "lines" }
}

fn write_node(f: &mut fmt::Formatter<'_>, key: &str, node: &DialogueNode) -> fmt::Result {
    write!(f, "=== {key} ===")?;
    if node.is_default {
        write!(f, " (default)")?;
    }
    if let Some(state) = &node.npc_state {
        write!(f, " [npc_state: {state}]")?;
    }
    if let Some(condition) = &node.entry_condition {
        write!(f, " [requires: {condition}]")?;
    }
    writeln!(f)?;

    for block in &node.intro_blocks {
        let n = block.lines.len();
        match &block.condition {
            Some(condition) => writeln!(f, "  intro if {condition}: {n} {}", plural(n))?,
            None => writeln!(f, "  intro: {n} {}", plural(n))?,
        }
    }

    for (index, option) in node.options.iter().enumerate() {
        write!(f, "  {}. ", index + 1)?;
        write_option(f, option)?;
        writeln!(f)?;
    }
    Ok(())
}

fn write_option(f: &mut fmt::Formatter<'_>, option: &DialogueOption) -> fmt::Result {
    write!(f, "{}", option.text)?;
    match (&option.next_node, option.exit) {
        (_, true) => write!(f, " -> END")?,
        (Some(next), false) => write!(f, " -> {next}")?,
        (None, false) => write!(f, " (stays)")?,
    }
    if let Some(condition) = &option.condition {
        write!(f, " [if {condition}]")?;
    }
    if let Some(id) = &option.id {
        write!(f, " [id: {id}]")?;
    }
    if let Some(actions) = &option.actions {
        if actions.once {
            write!(f, " [once]")?;
        }
        for (verb, list) in [
            ("set", &actions.set_flags),
            ("add", &actions.add_items),
            ("remove", &actions.remove_items),
        ] {
            if !list.is_empty() {
                write!(f, " [{verb}: {}]", list.join(", "))?;
            }
        }
    }
    Ok(())
}
