use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ConfigLoadError;
use crate::models::{Config, ConfigSource, FileConfig};
use crate::util::{parse_bool, parse_duration};

pub const ENV_CONFIG_PATH: &str = "TS43_CONFIG_PATH";
pub const ENV_CONFIG_JSON: &str = "TS43_CONFIG_JSON";
pub const ENV_SERVER_URL: &str = "TS43_SERVER_URL";
pub const ENV_NEEDS_IMS_PROVISIONING: &str = "TS43_NEEDS_IMS_PROVISIONING";
pub const ENV_STORAGE_DIR: &str = "TS43_STORAGE_DIR";
pub const ENV_REQUEST_TIMEOUT: &str = "TS43_REQUEST_TIMEOUT";
pub const ENV_NOTIFICATION_TOKEN: &str = "TS43_NOTIFICATION_TOKEN";

const DEFAULT_CANDIDATES: &[&str] = &["ts43.toml", "config/ts43.toml", "ts43.json"];

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Loaded configuration plus provenance.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub source: ConfigSource,
    /// `.env` file applied before reading the environment, if any.
    pub dotenv_path: Option<PathBuf>,
}

/// Resolves [`Config`] from files and environment.
///
/// Evaluation order:
/// 1) `$TS43_CONFIG_PATH` (TOML or JSON file),
/// 2) `$TS43_CONFIG_JSON` (inline JSON),
/// 3) the first of `ts43.toml`, `config/ts43.toml`, `ts43.json` that exists,
/// 4) defaults.
///
/// The individual `TS43_*` variables are applied on top of whichever source
/// won, then the result is validated.
pub struct ConfigLoader {
    env: EnvLookup,
    base_dir: PathBuf,
    load_dotenv: bool,
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("base_dir", &self.base_dir)
            .field("load_dotenv", &self.load_dotenv)
            .finish_non_exhaustive()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader over the process environment, current directory and `.env`.
    pub fn new() -> Self {
        Self {
            env: Box::new(|key| std::env::var(key).ok()),
            base_dir: PathBuf::from("."),
            load_dotenv: true,
        }
    }

    /// Loader over a fixed set of variables. No `.env` handling.
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            env: Box::new(move |key| vars.get(key).cloned()),
            base_dir: PathBuf::from("."),
            load_dotenv: false,
        }
    }

    /// Directory that relative paths and default candidates resolve against.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let dotenv_path = if self.load_dotenv {
            dotenvy::dotenv().ok()
        } else {
            None
        };
        if let Some(path) = &dotenv_path {
            debug!(path = %path.display(), "loaded .env");
        }

        let (file, source) = self.resolve_source()?;
        let mut config = Config::try_from(file)?;
        self.apply_env_overrides(&mut config)?;
        config.validate()?;

        info!(source = ?source, "configuration loaded");
        Ok(ConfigLoad {
            config,
            source,
            dotenv_path,
        })
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.env)(key).filter(|value| !value.trim().is_empty())
    }

    fn resolve_source(&self) -> Result<(FileConfig, ConfigSource), ConfigLoadError> {
        if let Some(raw) = self.var(ENV_CONFIG_PATH) {
            let path = self.resolve(Path::new(raw.trim()));
            let file = load_file(&path)?;
            return Ok((file, ConfigSource::EnvPath(path)));
        }

        if let Some(raw) = self.var(ENV_CONFIG_JSON) {
            let file = serde_json::from_str(&raw).map_err(|err| ConfigLoadError::Parse {
                origin: ENV_CONFIG_JSON.into(),
                message: err.to_string(),
            })?;
            return Ok((file, ConfigSource::EnvInline));
        }

        if let Some(path) = self.find_default_file() {
            let file = load_file(&path)?;
            return Ok((file, ConfigSource::File(path)));
        }

        Ok((FileConfig::default(), ConfigSource::Default))
    }

    fn apply_env_overrides(&self, config: &mut Config) -> Result<(), ConfigLoadError> {
        if let Some(url) = self.var(ENV_SERVER_URL) {
            config.server.url = Some(url.trim().to_string());
        }

        if let Some(raw) = self.var(ENV_NEEDS_IMS_PROVISIONING) {
            config.carrier.needs_ims_provisioning =
                parse_bool(&raw).ok_or_else(|| ConfigLoadError::InvalidValue {
                    key: ENV_NEEDS_IMS_PROVISIONING.into(),
                    message: format!("expected a boolean, got '{raw}'"),
                })?;
        }

        if let Some(dir) = self.var(ENV_STORAGE_DIR) {
            config.storage.dir = Some(self.resolve(Path::new(dir.trim())));
        }

        if let Some(raw) = self.var(ENV_REQUEST_TIMEOUT) {
            config.server.request_timeout =
                parse_duration(&raw).map_err(|message| ConfigLoadError::InvalidValue {
                    key: ENV_REQUEST_TIMEOUT.into(),
                    message,
                })?;
        }

        if let Some(token) = self.var(ENV_NOTIFICATION_TOKEN) {
            config.carrier.notification_token = Some(token);
        }

        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn find_default_file(&self) -> Option<PathBuf> {
        DEFAULT_CANDIDATES
            .iter()
            .map(|candidate| self.base_dir.join(candidate))
            .find(|path| path.exists())
    }
}

fn load_file(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let origin = path.display().to_string();

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
            origin,
            message: err.to_string(),
        }),
        Some("toml") => toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
            origin,
            message: err.to_string(),
        }),
        _ => parse_from_str(&contents, &origin),
    }
}

/// Parse TOML, falling back to JSON.
pub fn parse_from_str(contents: &str, origin: &str) -> Result<FileConfig, ConfigLoadError> {
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| ConfigLoadError::Parse {
            origin: origin.to_string(),
            message: format!("toml error: {toml_err}; json error: {json_err}"),
        })
    })
}
