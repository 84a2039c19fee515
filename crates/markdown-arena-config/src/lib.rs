use markdown_arena_engine::{
    IncrementalConfig, IncrementalParser, OptionsError, ParseOptions, Parser, StreamOptions,
    StreamingParser,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid option in config file at {config_path}: {source}")]
    ConfigInvalidError {
        config_path: PathBuf,
        source: OptionsError,
    },
}

/// Parser settings, one table per engine component. Every table and key is
/// optional in the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parse: ParseOptions,
    pub incremental: IncrementalConfig,
    pub stream: StreamOptions,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            log::debug!("no config file at {}", config_path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config
            .validate()
            .map_err(|source| ConfigError::ConfigInvalidError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        log::debug!("loaded config from {}", config_path.display());
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-arena");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Runs every option validator and reports the first failure.
    pub fn validate(&self) -> Result<(), OptionsError> {
        self.parse.validate()?;
        self.incremental.validate()?;
        self.stream.validate()
    }

    pub fn parser(&self) -> Result<Parser, OptionsError> {
        Parser::new(self.parse)
    }

    pub fn incremental_parser(&self) -> Result<IncrementalParser, OptionsError> {
        IncrementalParser::new(self.parse, self.incremental)
    }

    pub fn streaming_parser(&self) -> Result<StreamingParser, OptionsError> {
        StreamingParser::new(self.parse, self.stream)
    }
}
