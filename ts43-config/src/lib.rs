//! Configuration for the TS.43 entitlement engine.
//!
//! Settings come from one of a TOML/JSON file, inline JSON in the
//! environment, or built-in defaults, and are then adjusted by individual
//! `TS43_*` environment variables. See [`ConfigLoader`] for the precedence.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod error;
pub mod loader;
pub mod models;
pub mod util;

pub use error::ConfigLoadError;
pub use loader::{ConfigLoad, ConfigLoader};
pub use models::{
    CarrierConfig, Config, ConfigSource, EntitlementServerConfig, StorageConfig,
};
