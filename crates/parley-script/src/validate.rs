//! Structural lint over a parsed dialogue graph.
//!
//! These checks never block loading. The runtime copes with every problem
//! reported here by ending the conversation; the warnings exist so script
//! authors find the dead ends before players do.

use std::collections::BTreeSet;

use crate::condition::Condition;
use crate::diagnostics::Diagnostic;
use crate::graph::{DialogueGraph, START_NODE};

/// Check a graph for unreachable entry, dangling routes, and dead ends.
pub fn validate_graph(graph: &DialogueGraph) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut warn = |message: String| diagnostics.push(Diagnostic::warning(0, 0..0, message));

    if !graph.contains(START_NODE) && !graph.nodes().any(|(_, node)| node.is_default) {
        warn(format!(
            "no `{START_NODE}` node and no `# default` node; conversations can only open through `# npc_state`"
        ));
    }

    let ids: BTreeSet<&str> = graph
        .nodes()
        .flat_map(|(_, node)| node.options.iter())
        .filter_map(|option| option.id.as_deref())
        .collect();

    for (key, node) in graph.nodes() {
        if node.options.is_empty() {
            warn(format!(
                "node `{key}` has no options; conversations end when they reach it"
            ));
        }

        for (index, option) in node.options.iter().enumerate() {
            let dangling = option
                .next_node
                .as_deref()
                .filter(|target| !option.exit && !graph.contains(target));
            if let Some(target) = dangling {
                warn(format!(
                    "node `{key}` option {} (`{}`) routes to unknown node `{target}`",
                    index + 1,
                    option.text
                ));
            }

            let mut labels = Vec::new();
            if let Some(condition) = &option.condition {
                asked_labels(condition, &mut labels);
            }
            for label in labels {
                if !label.is_empty() && !ids.contains(label) {
                    warn(format!(
                        "node `{key}` option {} checks `asked:{label}` but no option has `# id: {label}`",
                        index + 1
                    ));
                }
            }
        }
    }

    diagnostics
}

fn asked_labels<'a>(condition: &'a Condition, labels: &mut Vec<&'a str>) {
    match condition {
        Condition::Asked { label } | Condition::NotAsked { label } => labels.push(label),
        Condition::All { conditions } => {
            for inner in conditions {
                asked_labels(inner, labels);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn lint(source: &str) -> Vec<String> {
        let parsed = parse(source).unwrap();
        validate_graph(&parsed.graph)
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn clean_graph() {
        let warnings = lint(
            "=== start ===\n\
             - Ask\n\
             # id: weather\n\
             > followup\n\
             === followup ===\n\
             - Again?\n\
             # requires: asked:weather\n\
             > start\n\
             - Bye\n\
             > END\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn missing_start() {
        let warnings = lint("=== hub ===\n- Bye\n> END\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("no `start` node"));
    }

    #[test]
    fn default_node_counts_as_entry() {
        assert!(lint("=== hub ===\n# default\n- Bye\n> END\n").is_empty());
    }

    #[test]
    fn unknown_route() {
        let warnings = lint("=== start ===\n- Go\n> nowhere\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unknown node `nowhere`"));
    }

    #[test]
    fn exit_ignores_route() {
        assert!(lint("=== start ===\n- Go\n> nowhere\n> END\n").is_empty());
    }

    #[test]
    fn dead_end_node() {
        let warnings = lint("=== start ===\nzyx: Hmph.\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("has no options"));
    }

    #[test]
    fn unknown_asked_label() {
        let warnings = lint("=== start ===\n- Again\n# requires: !asked:ghost, has:key\n> END\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("asked:ghost"));
    }
}
