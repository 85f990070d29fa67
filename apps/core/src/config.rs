use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::announcer::DEFAULT_ANNOUNCE_DELAY;
use crate::page::DEFAULT_FILTER_ATTRIBUTE;

const CONFIG_FILE_NAME: &str = "config.toml";
const HOME_ENV: &str = "NSFILTER_HOME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub announce_delay_ms: u64,
    pub filter_attribute: String,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            announce_delay_ms: DEFAULT_ANNOUNCE_DELAY.as_millis() as u64,
            filter_attribute: DEFAULT_FILTER_ATTRIBUTE.to_string(),
            log_level: "info".to_string(),
            log_dir: base.join("logs"),
            config_path: base.join(CONFIG_FILE_NAME),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid toml in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid json5 in {path}: {source}")]
    Json5 {
        path: PathBuf,
        source: json5::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    announce_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<PathBuf>,
}

pub fn stable_app_data_dir() -> PathBuf {
    match std::env::var_os(HOME_ENV) {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => std::env::temp_dir().join("nsfilter"),
    }
}

/// Loads `path`, or the default location when `None`. A missing file yields
/// the defaults with `config_path` pointing at where it would live.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    if let Some(path) = path {
        config.config_path = path.to_path_buf();
    }

    let text = match fs::read_to_string(&config.config_path) {
        Ok(text) => text,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(config),
        Err(source) => {
            return Err(ConfigError::Read {
                path: config.config_path,
                source,
            })
        }
    };

    let file = parse_file(&config.config_path, &text)?;
    apply(&mut config, file);
    validate(&config)?;
    Ok(config)
}

pub fn save(config: &Config) -> Result<(), ConfigError> {
    validate(config)?;
    let file = ConfigFile {
        announce_delay_ms: Some(config.announce_delay_ms),
        filter_attribute: Some(config.filter_attribute.clone()),
        log_level: Some(config.log_level.clone()),
        log_dir: Some(config.log_dir.clone()),
    };
    let text = toml::to_string_pretty(&file)?;

    if let Some(parent) = config.config_path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&config.config_path, text).map_err(|source| ConfigError::Write {
        path: config.config_path.clone(),
        source,
    })
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !(50..=10_000).contains(&cfg.announce_delay_ms) {
        return Err(ConfigError::Invalid(
            "announce_delay_ms must be between 50 and 10000".into(),
        ));
    }

    if cfg.filter_attribute.is_empty() {
        return Err(ConfigError::Invalid("filter_attribute is required".into()));
    }

    if !cfg
        .filter_attribute
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Invalid(format!(
            "filter_attribute '{}' may only contain ASCII letters, digits and '-'",
            cfg.filter_attribute
        )));
    }

    if cfg.log_level.trim().is_empty() {
        return Err(ConfigError::Invalid("log_level is required".into()));
    }

    if cfg.log_level.trim().parse::<LevelFilter>().is_err() {
        return Err(ConfigError::Invalid(format!(
            "log_level '{}' must be one of off, error, warn, info, debug, trace",
            cfg.log_level
        )));
    }

    if cfg.log_dir.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("log_dir is required".into()));
    }

    Ok(())
}

fn parse_file(path: &Path, text: &str) -> Result<ConfigFile, ConfigError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5") || ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        json5::from_str(text).map_err(|source| ConfigError::Json5 {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn apply(config: &mut Config, file: ConfigFile) {
    if let Some(delay) = file.announce_delay_ms {
        config.announce_delay_ms = delay;
    }
    if let Some(attribute) = file.filter_attribute {
        config.filter_attribute = attribute.trim().to_string();
    }
    if let Some(level) = file.log_level {
        config.log_level = level;
    }
    if let Some(dir) = file.log_dir {
        config.log_dir = dir;
    }
}
