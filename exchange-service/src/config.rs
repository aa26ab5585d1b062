//! Layered service configuration: built-in defaults < `config.toml` <
//! `HFTX_*` environment variables < CLI flags.

use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid bind address {0:?}: {1}")]
    BindAddr(String, std::net::AddrParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// What a `config.toml` file may set. Every field optional — CLI flags and
/// env vars fill in whatever this doesn't.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind_addr: Option<String>,
    log_level: Option<String>,
    log_format: Option<LogFormat>,
    preload_instruments: Option<Vec<String>>,
}

/// Resolved, fully-typed configuration the service runs with.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub log_format: LogFormat,
    pub preload_instruments: Vec<String>,
}

/// Command-line flags. Anything left unset here falls through to the
/// environment, then the config file, then the built-in default.
#[derive(Parser, Debug, Default)]
#[command(name = "exchange-service")]
pub struct Cli {
    #[arg(long, env = "HFTX_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "HFTX_BIND_ADDR")]
    bind_addr: Option<String>,

    #[arg(long, env = "HFTX_LOG_LEVEL")]
    log_level: Option<String>,

    #[arg(long, value_enum, env = "HFTX_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[arg(long = "preload", env = "HFTX_PRELOAD_INSTRUMENTS", value_delimiter = ',')]
    preload_instruments: Vec<String>,
}

impl Config {
    /// Parses CLI flags (which also absorb `HFTX_*` env vars via clap's
    /// `env` attribute), loads the optional config file they point at, and
    /// resolves the final precedence: CLI/env > file > built-in default.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_cli(Cli::parse())
    }

    fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => Self::read_file(path)?,
            None => FileConfig::default(),
        };

        let bind_addr_str = cli
            .bind_addr
            .or(file.bind_addr)
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let bind_addr = bind_addr_str
            .parse()
            .map_err(|e| ConfigError::BindAddr(bind_addr_str.clone(), e))?;

        let log_level = cli.log_level.or(file.log_level).unwrap_or_else(|| "info".to_string());
        let log_format = cli.log_format.or(file.log_format).unwrap_or(LogFormat::Pretty);
        let preload_instruments = if !cli.preload_instruments.is_empty() {
            cli.preload_instruments
        } else {
            file.preload_instruments.unwrap_or_default()
        };

        Ok(Config { bind_addr, log_level, log_format, preload_instruments })
    }

    fn read_file(path: &PathBuf) -> Result<FileConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.clone(), source })
    }
}
