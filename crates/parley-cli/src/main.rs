//! CLI frontend for Parley dialogue scripts.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parley_script::ParserConfig;
use parley_script::parser::DEFAULT_HERO;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Parley: check, outline, and play branching NPC dialogue",
    version,
    propagate_version = true
)]
struct Cli {
    /// Speaker name whose lines belong to the player character
    #[arg(long, global = true, default_value = DEFAULT_HERO)]
    hero: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a script and report problems
    Check {
        /// Script file
        file: PathBuf,

        /// Fail when there are any warnings
        #[arg(long)]
        strict: bool,
    },

    /// List the nodes and options of a script
    Outline {
        /// Script file
        file: PathBuf,

        /// Print the compiled graph as JSON
        #[arg(long, conflicts_with = "plain")]
        json: bool,

        /// Print an indented text outline instead of a table
        #[arg(long)]
        plain: bool,
    },

    /// Talk to an NPC in the terminal
    Play {
        /// NPC id; the script is read from `<dir>/<npc>.<ext>`
        npc: String,

        /// Directory holding dialogue scripts
        #[arg(short, long, default_value = "dialogue")]
        dir: PathBuf,

        /// Script file extension
        #[arg(long, default_value = "txt")]
        ext: String,

        /// JSON state file, read before and written after the conversation
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// Set a flag before starting (`name` or `name=value`, repeatable)
        #[arg(long = "set", value_name = "FLAG")]
        flags: Vec<String>,

        /// Put an item in the inventory before starting (repeatable)
        #[arg(long = "item", value_name = "ITEM")]
        items: Vec<String>,

        /// Node to start on instead of the NPC's entry node
        #[arg(long)]
        node: Option<String>,
    },
}

fn main() -> miette::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let parser = ParserConfig::default().with_hero(cli.hero.as_str());

    match cli.command {
        Commands::Check { file, strict } => commands::check::run(&file, &parser, strict),
        Commands::Outline { file, json, plain } => {
            let format = if json {
                commands::outline::Format::Json
            } else if plain {
                commands::outline::Format::Plain
            } else {
                commands::outline::Format::Table
            };
            commands::outline::run(&file, &parser, format)
        }
        Commands::Play {
            npc,
            dir,
            ext,
            state,
            flags,
            items,
            node,
        } => commands::play::run(commands::play::PlayArgs {
            npc,
            dir,
            extension: ext,
            state,
            flags,
            items,
            node,
            hero: cli.hero,
        }),
    }
}
