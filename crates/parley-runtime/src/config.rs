//! Runtime and loader settings.

use std::path::PathBuf;
use std::time::Duration;

use parley_script::ParserConfig;
use parley_script::parser::DEFAULT_HERO;

/// Text of the single option offered when a script cannot be loaded.
pub const DEFAULT_FALLBACK_TEXT: &str = "[The words won't come. (dialogue failed to load)]";

/// Conversation pacing and speaker settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Speaker name used for hero lines.
    pub hero: String,
    /// Shortest time a line stays up.
    pub min_turn: Duration,
    /// Reading time per character.
    pub per_char: Duration,
    /// Time into a turn before a skip request is honored.
    pub skip_guard: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            hero: DEFAULT_HERO.to_string(),
            min_turn: Duration::from_millis(1500),
            per_char: Duration::from_millis(60),
            skip_guard: Duration::from_millis(250),
        }
    }
}

impl RuntimeConfig {
    /// Create a config with default pacing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hero speaker name.
    pub fn with_hero(mut self, hero: impl Into<String>) -> Self {
        self.hero = hero.into().to_lowercase();
        self
    }

    /// Set the minimum turn length.
    pub fn with_min_turn(mut self, min_turn: Duration) -> Self {
        self.min_turn = min_turn;
        self
    }

    /// Set the per-character reading time.
    pub fn with_per_char(mut self, per_char: Duration) -> Self {
        self.per_char = per_char;
        self
    }

    /// Set the skip guard.
    pub fn with_skip_guard(mut self, skip_guard: Duration) -> Self {
        self.skip_guard = skip_guard;
        self
    }

    /// How long a line with this text stays up.
    pub fn turn_duration(&self, text: &str) -> Duration {
        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        self.min_turn.max(self.per_char.saturating_mul(chars))
    }
}

/// Where scripts live and what to show when one cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Directory holding `<npc_id>.<extension>` files.
    pub root: PathBuf,
    /// Script file extension, without the dot.
    pub extension: String,
    /// Option text of the fallback graph.
    pub fallback_text: String,
    /// Parser settings for loaded scripts.
    pub parser: ParserConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("dialogue"),
            extension: "txt".to_string(),
            fallback_text: DEFAULT_FALLBACK_TEXT.to_string(),
            parser: ParserConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Create a config with default locations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the script directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the script file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the fallback option text.
    pub fn with_fallback_text(mut self, text: impl Into<String>) -> Self {
        self.fallback_text = text.into();
        self
    }

    /// Set the hero speaker name used when parsing.
    pub fn with_hero(mut self, hero: impl Into<String>) -> Self {
        self.parser = self.parser.with_hero(hero);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RuntimeConfig::new();
        assert_eq!(config.hero, "nate");
        assert_eq!(config.min_turn, Duration::from_millis(1500));
        assert_eq!(config.skip_guard, Duration::from_millis(250));

        let loader = LoaderConfig::new();
        assert_eq!(loader.root, PathBuf::from("dialogue"));
        assert_eq!(loader.extension, "txt");
        assert_eq!(loader.parser.hero, "nate");
    }

    #[test]
    fn builder_pattern() {
        let config = RuntimeConfig::new()
            .with_hero("Guybrush")
            .with_min_turn(Duration::from_millis(500))
            .with_per_char(Duration::from_millis(10))
            .with_skip_guard(Duration::ZERO);
        assert_eq!(config.hero, "guybrush");
        assert_eq!(config.skip_guard, Duration::ZERO);

        let loader = LoaderConfig::new()
            .with_root("assets/talk")
            .with_extension("dlg")
            .with_fallback_text("...")
            .with_hero("Guybrush");
        assert_eq!(loader.root, PathBuf::from("assets/talk"));
        assert_eq!(loader.parser.hero, "guybrush");
    }

    #[test]
    fn turn_duration_has_floor() {
        let config = RuntimeConfig::new();
        assert_eq!(config.turn_duration("Hi."), Duration::from_millis(1500));
        assert_eq!(config.turn_duration(""), Duration::from_millis(1500));

        // 30 chars * 60 ms
        let long = "a".repeat(30);
        assert_eq!(config.turn_duration(&long), Duration::from_millis(1800));
    }

    #[test]
    fn turn_duration_counts_chars_not_bytes() {
        let config = RuntimeConfig::new().with_min_turn(Duration::ZERO);
        assert_eq!(config.turn_duration("héé"), Duration::from_millis(180));
    }
}
