use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigLoadError;
use crate::util::parse_duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the configuration was read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub server: EntitlementServerConfig,
    pub carrier: CarrierConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementServerConfig {
    /// Entitlement server endpoint. Required for commands that query.
    pub url: Option<String>,
    pub request_timeout: Duration,
}

impl Default for EntitlementServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Carrier behavior flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CarrierConfig {
    /// Query VoLTE, VoNR and SMSoIP on protocol v8 and provision them from
    /// the result.
    pub needs_ims_provisioning: bool,
    /// Push token sent with every query.
    pub notification_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StorageConfig {
    /// Directory for per-subscription records. In-memory storage when unset.
    pub dir: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if let Some(raw) = &self.server.url {
            let parsed = Url::parse(raw).map_err(|err| ConfigLoadError::InvalidValue {
                key: "server.url".into(),
                message: format!("'{raw}': {err}"),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigLoadError::InvalidValue {
                    key: "server.url".into(),
                    message: format!("unsupported scheme '{}'", parsed.scheme()),
                });
            }
        }

        if self.server.request_timeout.is_zero() {
            return Err(ConfigLoadError::InvalidValue {
                key: "server.request_timeout".into(),
                message: "must be greater than zero".into(),
            });
        }

        Ok(())
    }
}

/// Raw configuration as written in a TOML or JSON file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub carrier: FileCarrierConfig,
    #[serde(default)]
    pub storage: FileStorageConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Humantime duration, e.g. `"30s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCarrierConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_ims_provisioning: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_token: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl TryFrom<FileConfig> for Config {
    type Error = ConfigLoadError;

    fn try_from(file: FileConfig) -> Result<Self, Self::Error> {
        let request_timeout = match file.server.request_timeout.as_deref() {
            Some(raw) => parse_duration(raw).map_err(|message| {
                ConfigLoadError::InvalidValue {
                    key: "server.request_timeout".into(),
                    message,
                }
            })?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            server: EntitlementServerConfig {
                url: file.server.url.filter(|url| !url.trim().is_empty()),
                request_timeout,
            },
            carrier: CarrierConfig {
                needs_ims_provisioning: file.carrier.needs_ims_provisioning.unwrap_or(false),
                notification_token: file.carrier.notification_token,
            },
            storage: StorageConfig {
                dir: file.storage.dir,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.server.request_timeout, Duration::from_secs(30));
        assert!(!config.carrier.needs_ims_provisioning);
        config.validate().expect("defaults validate");
    }

    #[test]
    fn non_http_url_is_rejected() {
        let mut config = Config::default();
        config.server.url = Some("ftp://es.example.com".into());
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::InvalidValue { ref key, .. } if key == "server.url"
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = Config::default();
        config.server.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_timeout_in_file_is_reported() {
        let file = FileConfig {
            server: FileServerConfig {
                url: None,
                request_timeout: Some("eventually".into()),
            },
            ..Default::default()
        };
        assert!(Config::try_from(file).is_err());
    }
}
