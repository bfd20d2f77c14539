//! Interactive terminal conversation.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;
use miette::{IntoDiagnostic, WrapErr};
use parley_core::{FlagValue, MemoryStore, StateStore};
use parley_runtime::{
    ConversationEvent, ConversationRuntime, ConversationState, DialogueLoader, EndReason,
    LoaderConfig, RuntimeConfig,
};
use parley_script::{START_NODE, Speaker};

pub struct PlayArgs {
    pub npc: String,
    pub dir: PathBuf,
    pub extension: String,
    pub state: Option<PathBuf>,
    pub flags: Vec<String>,
    pub items: Vec<String>,
    pub node: Option<String>,
    pub hero: String,
}

pub fn run(args: PlayArgs) -> miette::Result<()> {
    let mut store = load_state(&args)?;

    let config = LoaderConfig::new()
        .with_root(&args.dir)
        .with_extension(args.extension.as_str())
        .with_hero(args.hero.as_str());
    let mut loader = DialogueLoader::from_config(config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;
    let graph = runtime.block_on(loader.load(&args.npc));

    let entry = match args.node {
        Some(node) => node,
        None => graph
            .entry_node(&store, &args.npc)
            .unwrap_or(START_NODE)
            .to_string(),
    };

    let mut conversation = ConversationRuntime::with_config(
        &mut store,
        RuntimeConfig::new().with_hero(args.hero.as_str()),
    );
    conversation
        .enter_conversation_at(&args.npc, graph, &entry)
        .into_diagnostic()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        for event in conversation.drain_events() {
            print_event(&event);
        }
        match conversation.state() {
            ConversationState::Idle => break,
            ConversationState::AwaitingChoice => {
                let count = conversation.visible_options().len();
                match prompt(&mut input, count)? {
                    Some(choice) => {
                        conversation.select_option(choice).into_diagnostic()?;
                    }
                    None => conversation.exit_conversation(),
                }
            }
            // Lines are printed at once; skip their reading time.
            _ => match conversation.turn_remaining() {
                Some(rest) => conversation.update(rest),
                None => break,
            },
        }
    }
    drop(conversation);

    if let Some(path) = &args.state {
        let json = store.to_json().into_diagnostic()?;
        fs::write(path, json)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot write {}", path.display()))?;
    }
    Ok(())
}

fn load_state(args: &PlayArgs) -> miette::Result<MemoryStore> {
    let mut store = match &args.state {
        Some(path) if path.exists() => {
            let json = fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("cannot read {}", path.display()))?;
            MemoryStore::from_json(&json)
                .into_diagnostic()
                .wrap_err_with(|| format!("invalid state file {}", path.display()))?
        }
        _ => MemoryStore::new(),
    };

    for raw in &args.flags {
        let (name, value) = FlagValue::parse_assignment(raw).into_diagnostic()?;
        store.set_flag(&name, value);
    }
    for item in &args.items {
        store.add_item(item);
    }
    Ok(store)
}

fn print_event(event: &ConversationEvent) {
    match event {
        ConversationEvent::Started { npc } => {
            println!("  {} {npc}", "Talking to".bold());
            println!();
        }
        ConversationEvent::NodeEntered { node } => {
            log::debug!("entered node {node}");
        }
        ConversationEvent::Line(line) => {
            let name = format!("{}:", line.name);
            let name = match line.speaker {
                Speaker::Hero => name.cyan().bold(),
                Speaker::Npc => name.yellow().bold(),
            };
            println!("  {name} {}", line.text);
        }
        ConversationEvent::OptionsShown(options) => {
            println!();
            for (i, option) in options.iter().enumerate() {
                let text = if option.used {
                    option.text.dimmed()
                } else {
                    option.text.normal()
                };
                println!("    {}. {text}", i + 1);
            }
        }
        ConversationEvent::OptionsHidden => println!(),
        ConversationEvent::Ended(reason) => {
            let why = match reason {
                EndReason::Exited => "goodbye",
                EndReason::DeadEnd => "nothing left to say",
                EndReason::MissingNode => "the script lost its place",
                EndReason::Requested => "walked away",
            };
            println!();
            println!("  {}", format!("(conversation over: {why})").dimmed());
        }
    }
}

/// Ask for an option number. `None` means the player wants to leave.
fn prompt(input: &mut impl BufRead, count: usize) -> miette::Result<Option<usize>> {
    loop {
        print!("  > ");
        io::stdout().flush().into_diagnostic()?;

        let mut line = String::new();
        if input.read_line(&mut line).into_diagnostic()? == 0 {
            println!();
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
            _ => println!("  Pick 1-{count}, or q to leave."),
        }
    }
}
