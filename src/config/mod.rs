use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{DeckRng, SessionTimings, Symbol};
use crate::utils::{GameError, GameResult};

/// Environment overrides look like `MEMORY_MATCH__GAME__PAIRS=8`.
pub const ENV_PREFIX: &str = "MEMORY_MATCH";

pub const DEFAULT_SYMBOLS: [&str; 16] = [
    "🚀", "🎮", "🎯", "🎲", "🎪", "🎭", "🎨", "🎷", "🎸", "🎹", "🎺", "🎻", "🎬", "🎤", "🎧", "🎵",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub ui: UiConfig,
    pub paths: PathConfig,
    pub logging: LoggingConfig,
    pub leaderboard: LeaderboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of symbols dealt per round, taken from the front of `symbols`.
    pub pairs: usize,
    pub symbols: Vec<String>,
    pub mismatch_delay_ms: u64,
    pub tick_interval_ms: u64,
    /// Fixed deck seed; a fresh one is drawn per round when unset.
    pub seed: Option<u64>,
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub theme: String,
    pub show_stats_in_header: bool,
    pub columns: usize,
    pub text_width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    pub scores_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    pub limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: GameConfig {
                pairs: DEFAULT_SYMBOLS.len(),
                symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
                mismatch_delay_ms: 1000,
                tick_interval_ms: 1000,
                seed: None,
                player_name: None,
            },
            ui: UiConfig {
                theme: "default".to_string(),
                show_stats_in_header: true,
                columns: 8,
                text_width: 80,
            },
            paths: PathConfig {
                scores_dir: PathBuf::from("./data/scores"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            leaderboard: LeaderboardConfig { limit: 10 },
        }
    }
}

impl Config {
    /// Defaults, then the TOML file (written with defaults when missing),
    /// then `MEMORY_MATCH__*` environment variables.
    pub fn load(path: Option<&Path>) -> GameResult<Self> {
        let defaults = ::config::Config::try_from(&Self::default())?;
        let mut builder = ::config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            if !path.exists() {
                Self::default().save_to_file(path)?;
            }
            builder = builder.add_source(::config::File::from(path).format(::config::FileFormat::Toml));
        }

        let config: Config = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> GameResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GameError::configuration(format!("Failed to create config directory: {}", e)))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .map_err(|e| GameError::configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_content)
            .map_err(|e| GameError::configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn get_scores_dir(&self) -> &Path {
        &self.paths.scores_dir
    }

    pub fn ensure_directories(&self) -> GameResult<()> {
        let dir = &self.paths.scores_dir;
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .map_err(|e| GameError::configuration(format!("Failed to create directory {:?}: {}", dir, e)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> GameResult<()> {
        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => return Err(GameError::configuration("Invalid logging level")),
        }

        if self.paths.scores_dir.as_os_str().is_empty() {
            return Err(GameError::configuration("Scores directory path cannot be empty"));
        }

        let distinct = crate::core::deck::distinct_symbols(self.game.symbols.iter().map(String::as_str));
        if distinct.len() != self.game.symbols.len() {
            return Err(GameError::configuration("Card symbols must be distinct"));
        }
        if self.game.pairs == 0 || self.game.pairs > self.game.symbols.len() {
            return Err(GameError::configuration(format!(
                "Pairs must be between 1 and {}",
                self.game.symbols.len()
            )));
        }
        if self.game.mismatch_delay_ms == 0 {
            return Err(GameError::configuration("Mismatch delay must be greater than 0"));
        }
        if self.game.tick_interval_ms == 0 {
            return Err(GameError::configuration("Tick interval must be greater than 0"));
        }
        if self.ui.columns == 0 {
            return Err(GameError::configuration("Board columns must be greater than 0"));
        }
        if self.ui.text_width < 40 {
            return Err(GameError::configuration("Text width must be at least 40"));
        }
        if self.leaderboard.limit == 0 {
            return Err(GameError::configuration("Leaderboard limit must be greater than 0"));
        }

        Ok(())
    }

    pub fn merge_with_cli(&mut self, cli_config: CliConfig) {
        if let Some(scores_dir) = cli_config.scores_dir {
            self.paths.scores_dir = scores_dir;
        }
        if let Some(log_level) = cli_config.log_level {
            self.logging.level = log_level;
        }
        if cli_config.debug {
            self.logging.level = "debug".to_string();
        }
        if let Some(theme) = cli_config.theme {
            self.ui.theme = theme;
        }
        if let Some(pairs) = cli_config.pairs {
            self.game.pairs = pairs;
        }
        if let Some(seed) = cli_config.seed {
            self.game.seed = Some(seed);
        }
        if let Some(player_name) = cli_config.player_name {
            self.game.player_name = Some(player_name);
        }
    }

    /// The symbols dealt in each round.
    pub fn round_symbols(&self) -> Vec<Symbol> {
        self.game
            .symbols
            .iter()
            .take(self.game.pairs)
            .map(|s| Symbol::new(s.as_str()))
            .collect()
    }

    pub fn session_timings(&self) -> SessionTimings {
        SessionTimings {
            tick_interval: Duration::from_millis(self.game.tick_interval_ms),
            mismatch_delay: Duration::from_millis(self.game.mismatch_delay_ms),
        }
    }

    pub fn deck_rng(&self) -> DeckRng {
        match self.game.seed {
            Some(seed) => DeckRng::new(seed),
            None => DeckRng::from_entropy(),
        }
    }
}

/// Configuration that can be overridden by CLI arguments
#[derive(Debug, Default)]
pub struct CliConfig {
    pub scores_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub debug: bool,
    pub theme: Option<String>,
    pub pairs: Option<usize>,
    pub seed: Option<u64>,
    pub player_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.game.pairs, 16);
        assert_eq!(config.game.mismatch_delay_ms, 1000);
        assert_eq!(config.ui.theme, "default");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.leaderboard.limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.game.pairs = 17;
        assert!(config.validate().is_err());

        config = Config::default();
        config.game.pairs = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.game.symbols[1] = config.game.symbols[0].clone();
        assert!(config.validate().is_err());

        config = Config::default();
        config.game.mismatch_delay_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut original = Config::default();
        original.game.pairs = 6;
        original.ui.theme = "dark".to_string();
        original.save_to_file(&config_path).unwrap();

        let loaded = Config::load(Some(config_path.as_path())).unwrap();

        assert_eq!(loaded.game.pairs, 6);
        assert_eq!(loaded.ui.theme, "dark");
        assert_eq!(loaded.game.symbols, original.game.symbols);
        assert_eq!(loaded.game.seed, None);
    }

    #[test]
    fn test_missing_file_written_with_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let loaded = Config::load(Some(config_path.as_path())).unwrap();

        assert!(config_path.exists());
        assert_eq!(loaded.game.pairs, Config::default().game.pairs);
    }

    #[test]
    fn test_environment_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut on_disk = Config::default();
        on_disk.leaderboard.limit = 5;
        on_disk.save_to_file(&config_path).unwrap();

        std::env::set_var("MEMORY_MATCH__LEADERBOARD__LIMIT", "3");
        std::env::set_var("MEMORY_MATCH__UI__SHOW_STATS_IN_HEADER", "false");
        let loaded = Config::load(Some(config_path.as_path()));
        let without_file = Config::load(None);
        std::env::remove_var("MEMORY_MATCH__LEADERBOARD__LIMIT");
        std::env::remove_var("MEMORY_MATCH__UI__SHOW_STATS_IN_HEADER");

        let loaded = loaded.unwrap();
        assert_eq!(loaded.leaderboard.limit, 3);
        assert!(!loaded.ui.show_stats_in_header);

        let without_file = without_file.unwrap();
        assert_eq!(without_file.leaderboard.limit, 3);
        assert_eq!(without_file.game.pairs, 16);
    }

    #[test]
    fn test_cli_config_merge() {
        let mut config = Config::default();
        let cli_config = CliConfig {
            log_level: Some("warn".to_string()),
            theme: Some("dark".to_string()),
            pairs: Some(4),
            seed: Some(11),
            ..Default::default()
        };

        config.merge_with_cli(cli_config);

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.ui.theme, "dark");
        assert_eq!(config.game.pairs, 4);
        assert_eq!(config.game.seed, Some(11));

        config.merge_with_cli(CliConfig {
            debug: true,
            ..Default::default()
        });
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_round_symbols_and_timings() {
        let mut config = Config::default();
        config.game.pairs = 3;
        config.game.tick_interval_ms = 250;

        let symbols = config.round_symbols();
        assert_eq!(symbols, vec![Symbol::from("🚀"), Symbol::from("🎮"), Symbol::from("🎯")]);
        assert_eq!(config.session_timings().tick_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_seeded_rng() {
        let mut config = Config::default();
        config.game.seed = Some(77);
        assert_eq!(config.deck_rng().seed(), 77);
    }
}
