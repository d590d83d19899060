//! Client configuration: RON file, defaults, and command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use courier_core::SelectionPolicy;
use courier_engine::{ApiSettings, DirectoryDownloads};
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::logging::LogDestination;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "courier.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid server url {url:?}: {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub server_url: String,
    pub output_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub catalog_timeout_secs: Option<u64>,
    /// Unbounded unless set.
    pub upload_timeout_secs: Option<u64>,
    pub max_response_bytes: u64,
    pub overwrite_downloads: bool,
    pub clear_selection_after_success: bool,
    pub log_file: Option<PathBuf>,
    /// With a `log_file`, `false` keeps the terminal quiet.
    pub log_to_terminal: bool,
    pub log_level: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080/".to_string(),
            output_dir: PathBuf::from("downloads"),
            connect_timeout_secs: 10,
            catalog_timeout_secs: Some(30),
            upload_timeout_secs: None,
            max_response_bytes: 512 * 1024 * 1024,
            overwrite_downloads: false,
            clear_selection_after_success: false,
            log_file: None,
            log_to_terminal: true,
            log_level: None,
        }
    }
}

/// Values given on the command line; each one replaces the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub upload_timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Load `explicit` if given (it must exist), else `./courier.ron` when
    /// present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|err| ConfigError::Parse {
            path: PathBuf::new(),
            message: err.to_string(),
        })
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.server_url {
            self.server_url = url.clone();
        }
        if let Some(dir) = &overrides.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(secs) = overrides.upload_timeout_secs {
            self.upload_timeout_secs = Some(secs);
        }
        if let Some(file) = &overrides.log_file {
            self.log_file = Some(file.clone());
        }
    }

    pub fn server_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidServerUrl {
            url: self.server_url.clone(),
            reason,
        };
        let url = Url::parse(&self.server_url).map_err(|err| invalid(err.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme {other}"))),
        }
    }

    pub fn api_settings(&self) -> Result<ApiSettings, ConfigError> {
        let mut settings = ApiSettings::new(self.server_url()?);
        settings.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        settings.catalog_timeout = self.catalog_timeout_secs.map(Duration::from_secs);
        settings.upload_timeout = self.upload_timeout_secs.map(Duration::from_secs);
        settings.max_response_bytes = self.max_response_bytes;
        Ok(settings)
    }

    pub fn downloads(&self) -> DirectoryDownloads {
        DirectoryDownloads::new(self.output_dir.clone()).overwrite(self.overwrite_downloads)
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        if self.clear_selection_after_success {
            SelectionPolicy::ClearSelections
        } else {
            SelectionPolicy::KeepSelections
        }
    }

    /// `log_level` from the file wins; otherwise `Debug` when verbose, else `Info`.
    pub fn log_level(&self, verbose: bool) -> Result<LevelFilter, ConfigError> {
        match &self.log_level {
            Some(name) => courier_logging::parse_level(name)
                .ok_or_else(|| ConfigError::InvalidLogLevel(name.clone())),
            None if verbose => Ok(LevelFilter::Debug),
            None => Ok(LevelFilter::Info),
        }
    }

    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) if self.log_to_terminal => LogDestination::Both(path.clone()),
            Some(path) => LogDestination::File(path.clone()),
            None => LogDestination::Terminal,
        }
    }
}
