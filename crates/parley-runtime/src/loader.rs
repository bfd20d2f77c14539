//! Loading and caching dialogue graphs by NPC id.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, error, info, warn};
use parley_script::{DialogueGraph, DialogueNode, DialogueOption, ParserConfig, START_NODE};

use crate::config::LoaderConfig;
use crate::error::{LoadError, LoadResult};

/// Where script text comes from.
pub trait ScriptSource {
    /// Fetch the script text for an NPC.
    fn fetch(&self, npc_id: &str) -> impl Future<Output = LoadResult<String>> + Send;
}

/// Scripts stored as `<root>/<npc_id>.<extension>` files.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    extension: String,
}

impl FsSource {
    /// Read `<root>/<npc_id>.txt`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "txt".to_string(),
        }
    }

    /// Use the config's root and extension.
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            root: config.root.clone(),
            extension: config.extension.clone(),
        }
    }

    /// Location of an NPC's script.
    pub fn script_path(&self, npc_id: &str) -> PathBuf {
        self.root.join(format!("{npc_id}.{}", self.extension))
    }
}

impl ScriptSource for FsSource {
    async fn fetch(&self, npc_id: &str) -> LoadResult<String> {
        let path = self.script_path(npc_id);
        debug!("reading dialogue from {}", path.display());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Io { path, source })
    }
}

/// Scripts held in memory, keyed by NPC id.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    scripts: BTreeMap<String, String>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a script.
    pub fn insert(&mut self, npc_id: impl Into<String>, script: impl Into<String>) {
        self.scripts.insert(npc_id.into(), script.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_script(mut self, npc_id: impl Into<String>, script: impl Into<String>) -> Self {
        self.insert(npc_id, script);
        self
    }
}

impl ScriptSource for MemorySource {
    async fn fetch(&self, npc_id: &str) -> LoadResult<String> {
        self.scripts
            .get(npc_id)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(npc_id.to_string()))
    }
}

/// The graph handed out when a script cannot be loaded: a `start` node with
/// a single option that ends the conversation.
pub fn fallback_graph(text: &str) -> DialogueGraph {
    let mut graph = DialogueGraph::new();
    graph.insert(
        START_NODE,
        DialogueNode {
            options: vec![DialogueOption {
                text: text.to_string(),
                exit: true,
                ..DialogueOption::default()
            }],
            ..DialogueNode::default()
        },
    );
    graph
}

/// Loads graphs from a [`ScriptSource`] and memoizes the successful ones.
#[derive(Debug)]
pub struct DialogueLoader<S> {
    source: S,
    config: LoaderConfig,
    cache: HashMap<String, Arc<DialogueGraph>>,
}

impl DialogueLoader<FsSource> {
    /// Load from the directory named in the config.
    pub fn from_config(config: LoaderConfig) -> Self {
        Self::new(FsSource::from_config(&config), config)
    }
}

impl<S: ScriptSource> DialogueLoader<S> {
    /// Create a loader with an empty cache.
    pub fn new(source: S, config: LoaderConfig) -> Self {
        Self {
            source,
            config,
            cache: HashMap::new(),
        }
    }

    /// The graph for an NPC.
    ///
    /// Never fails: an unreadable or unusable script is logged and replaced
    /// by [`fallback_graph`]. Fallbacks are not cached, so the next call
    /// tries again.
    pub async fn load(&mut self, npc_id: &str) -> Arc<DialogueGraph> {
        if let Some(graph) = self.cache.get(npc_id) {
            debug!("dialogue for {npc_id} served from cache");
            return Arc::clone(graph);
        }

        match self.try_load(npc_id).await {
            Ok(graph) => {
                info!("loaded dialogue for {npc_id} ({} nodes)", graph.len());
                let graph = Arc::new(graph);
                self.cache.insert(npc_id.to_string(), Arc::clone(&graph));
                graph
            }
            Err(err) => {
                error!("{err}; using fallback dialogue");
                Arc::new(fallback_graph(&self.config.fallback_text))
            }
        }
    }

    /// Fetch and parse a script, bypassing the cache.
    pub async fn try_load(&self, npc_id: &str) -> LoadResult<DialogueGraph> {
        let text = self.source.fetch(npc_id).await?;
        parse_script(npc_id, &text, &self.config.parser)
    }

    /// Whether a graph for the NPC is memoized.
    pub fn is_cached(&self, npc_id: &str) -> bool {
        self.cache.contains_key(npc_id)
    }

    /// Drop one NPC's graph so the next load reads it again.
    pub fn invalidate(&mut self, npc_id: &str) -> bool {
        self.cache.remove(npc_id).is_some()
    }

    /// Drop every memoized graph.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// The script source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Loader settings.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

fn parse_script(npc_id: &str, text: &str, config: &ParserConfig) -> LoadResult<DialogueGraph> {
    let parsed = parley_script::parse_with(text, config).map_err(|source| LoadError::Parse {
        npc: npc_id.to_string(),
        source,
    })?;
    if !parsed.diagnostics.is_empty() {
        warn!(
            "dialogue for {npc_id} loaded with {}",
            parley_script::diagnostics::summarize(&parsed.diagnostics)
        );
    }
    Ok(parsed.graph)
}
