//! Mapper configuration.
//!
//! Loaded from (in priority order):
//! 1. Environment variables (`VERTEXMAP_MAPPER__` prefix)
//! 2. The `[mapper]` section of `<prefix>.toml`
//! 3. Defaults

use serde::Deserialize;

use crate::error::MapperError;

/// What to do when a property value on a query result cannot be decoded.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Fail the whole record.
    #[default]
    Strict,
    /// Log a warning and leave the field at its default.
    Skip,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapperConfig {
    #[serde(default)]
    pub decode_policy: DecodePolicy,

    /// Emit each submitted statement at debug level.
    #[serde(default = "default_true")]
    pub log_statements: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            decode_policy: DecodePolicy::default(),
            log_statements: default_true(),
        }
    }
}

impl MapperConfig {
    /// Load from `<file_prefix>.toml` (optional) and the environment.
    /// A missing `[mapper]` section yields the defaults.
    pub fn load(file_prefix: &str) -> Result<Self, MapperError> {
        Self::load_with_env_prefix(file_prefix, "VERTEXMAP")
    }

    fn load_with_env_prefix(file_prefix: &str, env_prefix: &str) -> Result<Self, MapperError> {
        // `VERTEXMAP_MAPPER__DECODE_POLICY` -> `mapper.decode_policy`
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        match cfg.get::<MapperConfig>("mapper") {
            Ok(c) => Ok(c),
            Err(config::ConfigError::NotFound(_)) => Ok(MapperConfig::default()),
            Err(e) => Err(e.into()),
        }
    }
}
