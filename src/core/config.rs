//! # Configuration
//!
//! Settings resolve in order: defaults → config file → env vars → CLI flags.
//!
//! The file lives at `~/.docent/config.toml`. On first run a fully
//! commented-out copy is written there so every option is discoverable.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::remote::DEFAULT_BASE_URL;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DocentConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: Option<String>,
    pub default_session: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VoiceConfig {
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

pub const ENV_BASE_URL: &str = "DOCENT_BASE_URL";
pub const ENV_VOICE_COMMAND: &str = "DOCENT_VOICE_COMMAND";

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub log_level: LevelFilter,
    pub default_session: Option<String>,
    pub voice_command: Option<String>,
    pub voice_args: Vec<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Returns the path to `~/.docent/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".docent").join("config.toml"))
}

/// Loads `~/.docent/config.toml`, generating a commented default when missing.
pub fn load_config() -> Result<DocentConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(DocentConfig::default());
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<DocentConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(DocentConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: DocentConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG: &str = r#"# docent configuration
# Every setting is optional. Override order: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://127.0.0.1:5000"   # Or set DOCENT_BASE_URL, or pass --base-url

# [general]
# log_level = "debug"                  # "error", "warn", "info", "debug", "trace", "off"
# default_session = "<session id>"     # Selected at startup; or pass --session

# [voice]
# command = "whisper-stream"           # Speech-to-text program printing one transcript per line
# args = ["--language", "en"]          # Or set DOCENT_VOICE_COMMAND
"#;

fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("Failed to write default config: {}", e);
    }
}

/// Collapses the config file, process env and CLI flags into concrete values.
pub fn resolve(
    config: &DocentConfig,
    cli_base_url: Option<&str>,
    cli_session: Option<&str>,
) -> ResolvedConfig {
    resolve_with(config, cli_base_url, cli_session, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with(
    config: &DocentConfig,
    cli_base_url: Option<&str>,
    cli_session: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(str::to_string)
        .or_else(|| env(ENV_BASE_URL))
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let default_session = cli_session
        .map(str::to_string)
        .or_else(|| config.general.default_session.clone())
        .filter(|s| !s.trim().is_empty());

    // An env command replaces the configured one along with its args
    let (voice_command, voice_args) = match env(ENV_VOICE_COMMAND) {
        Some(command) => (Some(command), Vec::new()),
        None => (config.voice.command.clone(), config.voice.args.clone()),
    };
    let voice_command = voice_command.filter(|c| !c.trim().is_empty());

    ResolvedConfig {
        base_url,
        log_level: parse_log_level(config.general.log_level.as_deref()),
        default_session,
        voice_command,
        voice_args,
    }
}

fn parse_log_level(level: Option<&str>) -> LevelFilter {
    match level {
        None => LevelFilter::Debug,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Unknown log level {:?}, using debug", raw);
            LevelFilter::Debug
        }),
    }
}
