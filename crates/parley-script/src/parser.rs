//! Dialogue script parser.
//!
//! Scripts are line-oriented. Each node starts with a `=== name ===` header,
//! followed by node annotations, intro lines, and option blocks:
//!
//! ```text
//! === start ===
//! # npc_state: grumpy
//! # requires: !story.met_zyx
//! zyx: What do you want?
//! - Ask about the weather
//! # id: weather
//! nate: Nice night, huh?
//! zyx: Indeed.
//! > weather_followup
//! - Leave
//! > END
//! ```
//!
//! Nothing inside a section is fatal. Unrecognized lines are skipped and
//! empty sections dropped, each with a warning [`Diagnostic`].

use std::ops::Range;
use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use crate::condition::{Condition, compile_with_warnings};
use crate::diagnostics::Diagnostic;
use crate::error::{ScriptError, ScriptResult};
use crate::graph::{
    Actions, DialogueGraph, DialogueNode, DialogueOption, END_TARGET, IntroBlock, Line, Speaker,
};

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^===\s*(\w+)\s*===$").expect("header regex must compile"));

static SPEAKER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+):(.*)$").expect("speaker regex must compile"));

/// Default name of the player character in scripts.
pub const DEFAULT_HERO: &str = "nate";

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Speaker name (case-insensitive) whose lines are the hero's.
    pub hero: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            hero: DEFAULT_HERO.to_string(),
        }
    }
}

impl ParserConfig {
    /// Set the hero speaker name.
    pub fn with_hero(mut self, hero: impl Into<String>) -> Self {
        self.hero = hero.into().to_lowercase();
        self
    }
}

/// A compiled script plus everything that was skipped on the way.
#[derive(Debug, Clone)]
pub struct ParsedScript {
    /// The dialogue graph.
    pub graph: DialogueGraph,
    /// Warnings for skipped lines and dropped sections.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a script with the default hero name.
pub fn parse(source: &str) -> ScriptResult<ParsedScript> {
    parse_with(source, &ParserConfig::default())
}

/// Parse a script.
///
/// Fails only when the text has no node sections at all or every section
/// was dropped.
pub fn parse_with(source: &str, config: &ParserConfig) -> ScriptResult<ParsedScript> {
    let mut parser = Parser {
        hero: config.hero.to_lowercase(),
        diagnostics: Vec::new(),
    };
    let graph = parser.parse_script(source)?;
    Ok(ParsedScript {
        graph,
        diagnostics: parser.diagnostics,
    })
}

/// A trimmed, non-blank line with its position in the source.
#[derive(Debug, Clone)]
struct SourceLine<'a> {
    number: usize,
    span: Range<usize>,
    text: &'a str,
}

fn source_lines(source: &str) -> Vec<SourceLine<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for (index, raw) in source.split_inclusive('\n').enumerate() {
        let content = raw.trim_end_matches(['\n', '\r']);
        let text = content.trim();
        if !text.is_empty() {
            let start = offset + (content.len() - content.trim_start().len());
            lines.push(SourceLine {
                number: index + 1,
                span: start..start + text.len(),
                text,
            });
        }
        offset += raw.len();
    }
    lines
}

struct Section<'a> {
    name: &'a str,
    header: SourceLine<'a>,
    body: Vec<SourceLine<'a>>,
}

/// A `# tag` or `# tag: value` annotation.
struct Annotation<'a> {
    tag: &'a str,
    value: Option<&'a str>,
}

fn annotation(text: &str) -> Option<Annotation<'_>> {
    let rest = text.strip_prefix('#')?.trim();
    Some(match rest.split_once(':') {
        Some((tag, value)) => Annotation {
            tag: tag.trim(),
            value: Some(value.trim()),
        },
        None => Annotation {
            tag: rest,
            value: None,
        },
    })
}

/// Option under construction.
#[derive(Default)]
struct OptionDraft {
    option: DialogueOption,
    actions: Actions,
    npc_lines: Vec<Line>,
}

impl OptionDraft {
    fn finish(self) -> DialogueOption {
        let mut option = self.option;
        if !self.actions.is_empty() {
            option.actions = Some(self.actions);
        }
        if !self.npc_lines.is_empty() {
            option.npc_response = Some(self.npc_lines);
        }
        option
    }
}

struct Parser {
    hero: String,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    fn warn(&mut self, line: &SourceLine<'_>, message: impl Into<String>) {
        let message = message.into();
        warn!("dialogue line {}: {message}", line.number);
        self.diagnostics
            .push(Diagnostic::warning(line.number, line.span.clone(), message));
    }

    fn parse_script(&mut self, source: &str) -> ScriptResult<DialogueGraph> {
        let sections = self.split_sections(source)?;
        let mut graph = DialogueGraph::new();

        for section in sections {
            if section.body.is_empty() {
                self.warn(
                    &section.header,
                    format!("node `{}` has no content and was dropped", section.name),
                );
                continue;
            }
            let node = self.parse_node(&section.body);
            if graph.insert(section.name, node).is_some() {
                self.warn(
                    &section.header,
                    format!(
                        "node `{}` is defined more than once; this definition replaces the earlier one",
                        section.name
                    ),
                );
            }
        }

        if graph.is_empty() {
            return Err(ScriptError::EmptyGraph);
        }
        Ok(graph)
    }

    fn split_sections<'a>(&mut self, source: &'a str) -> ScriptResult<Vec<Section<'a>>> {
        let mut sections: Vec<Section<'a>> = Vec::new();

        for line in source_lines(source) {
            if let Some(captures) = HEADER.captures(line.text) {
                let name = captures.get(1).map_or("", |m| m.as_str());
                sections.push(Section {
                    name,
                    header: line,
                    body: Vec::new(),
                });
                continue;
            }
            match sections.last_mut() {
                Some(section) => section.body.push(line),
                None => self.warn(&line, "line outside of any `=== node ===` section ignored"),
            }
        }

        if sections.is_empty() {
            return Err(ScriptError::NoSections);
        }
        Ok(sections)
    }

    fn condition(&mut self, line: &SourceLine<'_>, clause: Option<&str>) -> Condition {
        let clause = clause.unwrap_or_default();
        if clause.is_empty() {
            self.warn(line, "`# requires:` without a clause always holds");
        }
        let (condition, warnings) = compile_with_warnings(clause);
        for warning in warnings {
            self.warn(line, warning);
        }
        condition
    }

    fn speaker_line<'a>(&self, text: &'a str) -> Option<(String, &'a str)> {
        let captures = SPEAKER_LINE.captures(text)?;
        let name = captures.get(1)?.as_str().to_lowercase();
        let said = captures.get(2).map_or("", |m| m.as_str().trim());
        Some((name, said))
    }

    fn speaker(&self, name: &str) -> Speaker {
        if name == self.hero {
            Speaker::Hero
        } else {
            Speaker::Npc
        }
    }

    fn parse_node(&mut self, body: &[SourceLine<'_>]) -> DialogueNode {
        let mut node = DialogueNode::default();
        let mut rest = body;

        while let Some((line, tail)) = rest.split_first() {
            let Some(note) = annotation(line.text) else {
                break;
            };
            self.node_annotation(&mut node, line, &note);
            rest = tail;
        }

        let intro_len = rest
            .iter()
            .position(|l| l.text.starts_with('-'))
            .unwrap_or(rest.len());
        let (intro, options) = rest.split_at(intro_len);
        node.intro_blocks = self.parse_intro(intro);
        node.options = self.parse_options(options);
        node
    }

    fn node_annotation(
        &mut self,
        node: &mut DialogueNode,
        line: &SourceLine<'_>,
        note: &Annotation<'_>,
    ) {
        match (note.tag, note.value) {
            ("default", _) => node.is_default = true,
            ("npc_state", Some(state)) if !state.is_empty() => {
                node.npc_state = Some(state.to_string());
            }
            ("id", Some(id)) if !id.is_empty() => node.id = Some(id.to_string()),
            ("requires", clause) => node.entry_condition = Some(self.condition(line, clause)),
            ("npc_state" | "id", _) => {
                self.warn(line, format!("`# {}` needs a value", note.tag));
            }
            (tag, _) => self.warn(line, format!("unknown node annotation `# {tag}`")),
        }
    }

    fn parse_intro(&mut self, lines: &[SourceLine<'_>]) -> Vec<IntroBlock> {
        let mut blocks = Vec::new();
        let mut current: Option<IntroBlock> = None;

        for line in lines {
            if let Some(note) = annotation(line.text) {
                if note.tag == "requires" {
                    blocks.extend(current.take());
                    current = Some(IntroBlock {
                        condition: Some(self.condition(line, note.value)),
                        lines: Vec::new(),
                    });
                } else {
                    self.warn(
                        line,
                        format!("`# {}` is not allowed among intro lines", note.tag),
                    );
                }
                continue;
            }

            match self.speaker_line(line.text) {
                Some((_, "")) => {}
                Some((name, said)) => {
                    let spoken = Line::new(self.speaker(&name), name, said);
                    current.get_or_insert_with(IntroBlock::default).lines.push(spoken);
                }
                None => self.warn(line, "unrecognized intro line (expected `speaker: text`)"),
            }
        }

        blocks.extend(current);
        blocks
    }

    fn parse_options(&mut self, lines: &[SourceLine<'_>]) -> Vec<DialogueOption> {
        let mut options = Vec::new();
        let mut draft: Option<OptionDraft> = None;

        for line in lines {
            if let Some(text) = line.text.strip_prefix('-') {
                options.extend(draft.take().map(OptionDraft::finish));
                let text = text.trim();
                if text.is_empty() {
                    self.warn(line, "option has no menu text");
                }
                draft = Some(OptionDraft {
                    option: DialogueOption {
                        text: text.to_string(),
                        ..DialogueOption::default()
                    },
                    ..OptionDraft::default()
                });
                continue;
            }

            // parse_node only hands over lines starting at the first `-`
            let Some(current) = draft.as_mut() else {
                continue;
            };
            self.option_line(current, line);
        }

        options.extend(draft.map(OptionDraft::finish));
        options
    }

    fn option_line(&mut self, draft: &mut OptionDraft, line: &SourceLine<'_>) {
        if let Some(note) = annotation(line.text) {
            let value = note.value.filter(|v| !v.is_empty());
            match (note.tag, value) {
                ("requires", _) => {
                    draft.option.condition = Some(self.condition(line, note.value));
                }
                ("set", Some(flag)) => draft.actions.set_flags.push(flag.to_string()),
                ("add", Some(item)) => draft.actions.add_items.push(item.to_string()),
                ("remove", Some(item)) => draft.actions.remove_items.push(item.to_string()),
                ("once", _) => draft.actions.once = true,
                ("id", Some(id)) => draft.option.id = Some(id.to_string()),
                ("set" | "add" | "remove" | "id", None) => {
                    self.warn(line, format!("`# {}` needs a value", note.tag));
                }
                (tag, _) => self.warn(line, format!("unknown option annotation `# {tag}`")),
            }
            return;
        }

        if let Some(target) = line.text.strip_prefix('>') {
            match target.trim() {
                "" => self.warn(line, "`>` without a target node"),
                END_TARGET => draft.option.exit = true,
                node => draft.option.next_node = Some(node.to_string()),
            }
            return;
        }

        match self.speaker_line(line.text) {
            Some((name, said)) if name == self.hero => draft.option.hero_line = said.to_string(),
            Some((_, "")) => {}
            Some((name, said)) => draft.npc_lines.push(Line::new(Speaker::Npc, name, said)),
            None => self.warn(line, "unrecognized option line"),
        }
    }
}
