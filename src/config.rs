//! Configuration for envelope registries
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (envelopes.toml)
//! - Environment variables (ENVELOPE__*)
//!
//! ## Example config file (envelopes.toml):
//! ```toml
//! [registry]
//! schema_dir = "./schemas"
//!
//! [logging]
//! filter = "schema_envelope=debug"
//!
//! [[schemas]]
//! name = "ping"
//! id = 9249
//! version = 114
//!
//! [[schemas]]
//! name = "greeting"
//! id = 9250
//! version = 115
//! schema = '{"type":"string"}'
//!
//! [[schemas]]
//! name = "child"
//! id = 17
//! version = 2
//! path = "child.avsc"
//! fingerprint = "9f1c..."
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EnvelopeError, Result};
use crate::identity::SchemaIdentity;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvelopeConfig {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Logging settings for the tooling binaries
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Schema generations accepted on the channel
    #[serde(default)]
    pub schemas: Vec<SchemaEntryConfig>,
}

/// Registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base directory for relative schema paths
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives, used when RUST_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

/// One schema generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaEntryConfig {
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub id: u16,

    pub version: u8,

    /// Inline Avro schema text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Path to an Avro schema file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Expected SHA256 fingerprint of the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// Where an entry's schema comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource<'a> {
    /// No schema: envelopes carry no payload
    None,
    Inline(&'a str),
    File(PathBuf),
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl SchemaEntryConfig {
    pub fn identity(&self) -> SchemaIdentity {
        SchemaIdentity::new(self.id, self.version)
    }

    /// Resolve the schema source, with relative paths taken from `schema_dir`
    pub fn source(&self, schema_dir: Option<&Path>) -> Result<SchemaSource<'_>> {
        match (&self.schema, &self.path) {
            (None, None) => Ok(SchemaSource::None),
            (Some(text), None) => Ok(SchemaSource::Inline(text)),
            (None, Some(path)) => {
                let path = match schema_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path.clone(),
                };
                Ok(SchemaSource::File(path))
            }
            (Some(_), Some(_)) => Err(EnvelopeError::InvalidConfig(format!(
                "schema {} sets both `schema` and `path`",
                self.identity()
            ))),
        }
    }
}

impl EnvelopeConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "envelopes.toml",
            ".envelopes.toml",
            "config/envelopes.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "envelopes") {
            let xdg_config = config_dir.config_dir().join("envelopes.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (ENVELOPE__*)
        builder = builder.add_source(
            Environment::with_prefix("ENVELOPE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get the schema directory (resolves relative paths)
    pub fn schema_dir(&self) -> Option<PathBuf> {
        self.registry.schema_dir.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                std::env::current_dir().unwrap_or_default().join(p)
            }
        })
    }
}
