//! Factory Registry
//!
//! Routes incoming envelopes to the factory of their schema generation.
//! Registration is append-only: a generation, once bound, cannot be rebound.

use std::collections::HashMap;
use std::fs;

use apache_avro::types::Value;
use tracing::{debug, info};

use crate::config::{EnvelopeConfig, SchemaSource};
use crate::envelope::Envelope;
use crate::error::{EnvelopeError, Result};
use crate::factory::{Factory, SchemaBoundFactory, SchemalessFactory};
use crate::fingerprint::SchemaFingerprint;
use crate::identity::SchemaIdentity;

/// Factories keyed by schema identity
#[derive(Debug, Clone, Default)]
pub struct FactoryRegistry {
    factories: HashMap<SchemaIdentity, Factory>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the `[[schemas]]` entries of a config
    pub fn from_config(config: &EnvelopeConfig) -> Result<Self> {
        let schema_dir = config.schema_dir();
        let mut registry = Self::new();

        for entry in &config.schemas {
            let identity = entry.identity();
            let factory: Factory = match entry.source(schema_dir.as_deref())? {
                SchemaSource::None => SchemalessFactory::new(identity).into(),
                SchemaSource::Inline(text) => SchemaBoundFactory::parse(identity, text)?.into(),
                SchemaSource::File(path) => {
                    let text = fs::read_to_string(&path)?;
                    SchemaBoundFactory::parse(identity, &text)?.into()
                }
            };

            if let Some(expected) = &entry.fingerprint {
                let actual = match factory.schema() {
                    Some(schema) => SchemaFingerprint::of(schema),
                    None => {
                        return Err(EnvelopeError::InvalidConfig(format!(
                            "schema {} pins a fingerprint but has no schema",
                            identity
                        )))
                    }
                };
                if !SchemaFingerprint::from(expected.as_str()).matches(&actual) {
                    return Err(EnvelopeError::FingerprintMismatch {
                        identity,
                        expected: expected.clone(),
                        actual: actual.to_string(),
                    });
                }
            }

            registry.register(factory)?;
        }

        info!(schemas = registry.len(), "loaded factory registry");
        Ok(registry)
    }

    /// Load the config (see [`EnvelopeConfig::load_from`]) and build a registry from it
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let config = EnvelopeConfig::load_from(config_path)?;
        Self::from_config(&config)
    }

    /// Register a factory.
    ///
    /// This is an append-only operation - a registered identity cannot be replaced
    pub fn register(&mut self, factory: impl Into<Factory>) -> Result<()> {
        let factory = factory.into();
        let identity = factory.identity();

        // IMMUTABILITY CHECK
        if self.factories.contains_key(&identity) {
            return Err(EnvelopeError::DuplicateIdentity(identity));
        }

        debug!(%identity, schemaless = factory.schema().is_none(), "registered factory");
        self.factories.insert(identity, factory);
        Ok(())
    }

    pub fn get(&self, identity: &SchemaIdentity) -> Option<&Factory> {
        self.factories.get(identity)
    }

    /// All registered identities, sorted
    pub fn identities(&self) -> Vec<SchemaIdentity> {
        let mut identities: Vec<_> = self.factories.keys().copied().collect();
        identities.sort();
        identities
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Extract `envelope` with the factory of its identity.
    ///
    /// Schemaless envelopes yield `None`.
    pub fn extract(&self, envelope: &Envelope) -> Result<Option<Value>> {
        let identity = envelope.identity();
        match self.factories.get(&identity) {
            Some(factory) => factory.extract(envelope),
            None => {
                debug!(
                    %identity,
                    known_versions = ?self.versions_of(identity.id),
                    "no factory for envelope"
                );
                Err(EnvelopeError::Unregistered(identity))
            }
        }
    }

    /// Decode and extract an envelope from wire bytes
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<Option<Value>> {
        let envelope = Envelope::decode(bytes).ok_or(EnvelopeError::Truncated(bytes.len()))?;
        self.extract(&envelope)
    }

    fn versions_of(&self, id: u16) -> Vec<u8> {
        let mut versions: Vec<_> = self
            .factories
            .keys()
            .filter(|identity| identity.id == id)
            .map(|identity| identity.version)
            .collect();
        versions.sort_unstable();
        versions
    }
}
