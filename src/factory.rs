//! Envelope factories
//!
//! A factory binds a [`SchemaIdentity`] to the schema (if any) of that
//! generation. It stamps outgoing envelopes and vets incoming ones: identity
//! first, id before version, then the payload.

use apache_avro::types::Value;
use apache_avro::Schema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, trace};

use crate::codec;
use crate::descriptor::SchemaDescriptor;
use crate::envelope::Envelope;
use crate::error::{EnvelopeError, Result};
use crate::fingerprint::SchemaFingerprint;
use crate::identity::SchemaIdentity;

/// Factory for envelopes that carry no payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemalessFactory {
    identity: SchemaIdentity,
}

impl SchemalessFactory {
    pub fn new(identity: impl Into<SchemaIdentity>) -> Self {
        Self {
            identity: identity.into(),
        }
    }

    pub const fn with_identity(identity: SchemaIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> SchemaIdentity {
        self.identity
    }

    /// An envelope with this factory's identity and an empty payload
    pub fn create(&self) -> Envelope {
        trace!(identity = %self.identity, "created schemaless envelope");
        Envelope::empty(self.identity)
    }

    /// Accept `envelope` if it has this factory's identity and no payload
    pub fn extract(&self, envelope: &Envelope) -> Result<()> {
        self.identity.check(&envelope.identity()).map_err(|e| rejected(self.identity, e))?;
        if envelope.has_payload() {
            return Err(rejected(
                self.identity,
                EnvelopeError::UnawaitedContent {
                    identity: self.identity,
                    len: envelope.payload().len(),
                },
            ));
        }
        Ok(())
    }
}

/// Factory for envelopes whose payload is one Avro datum of a bound schema
#[derive(Debug, Clone)]
pub struct SchemaBoundFactory {
    identity: SchemaIdentity,
    schema: Schema,
}

impl SchemaBoundFactory {
    pub fn new(identity: impl Into<SchemaIdentity>, schema: Schema) -> Self {
        Self {
            identity: identity.into(),
            schema,
        }
    }

    /// Bind the schema of a descriptor.
    ///
    /// # Panics
    ///
    /// Panics if the descriptor renders an invalid schema, see
    /// [`SchemaDescriptor::schema`].
    pub fn from_descriptor(identity: impl Into<SchemaIdentity>, descriptor: &SchemaDescriptor) -> Self {
        Self::new(identity, descriptor.schema().clone())
    }

    /// Bind schema text; fails with [`EnvelopeError::InvalidSchema`] if it does not parse
    pub fn parse(identity: impl Into<SchemaIdentity>, schema: &str) -> Result<Self> {
        let identity = identity.into();
        let schema = codec::parse_schema(schema).map_err(|e| {
            debug!(%identity, error = %e, "rejected schema text");
            e
        })?;
        Ok(Self::new(identity, schema))
    }

    pub fn identity(&self) -> SchemaIdentity {
        self.identity
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn fingerprint(&self) -> SchemaFingerprint {
        SchemaFingerprint::of(&self.schema)
    }

    /// Encode `value` into an envelope with this factory's identity.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not encode against the bound schema. A producer
    /// handing over values of the wrong shape for its own schema is a defect,
    /// and no envelope exists for it.
    pub fn create(&self, value: impl Into<Value>) -> Envelope {
        match codec::encode(&self.schema, value) {
            Ok(payload) => {
                trace!(identity = %self.identity, len = payload.len(), "created envelope");
                Envelope::new(self.identity, payload)
            }
            Err(e) => self.encode_failed(&e),
        }
    }

    /// Serialize `value` with serde and encode it like [`SchemaBoundFactory::create`].
    ///
    /// # Panics
    ///
    /// Panics if `value` cannot be represented under the bound schema.
    pub fn create_from<T: Serialize>(&self, value: &T) -> Envelope {
        match apache_avro::to_value(value) {
            Ok(value) => self.create(value),
            Err(e) => self.encode_failed(&e),
        }
    }

    /// Decode the payload of `envelope`.
    ///
    /// Fails with an identity error if the envelope was produced for another
    /// schema generation, [`EnvelopeError::MissingContent`] if it has no
    /// payload and [`EnvelopeError::MismatchingContent`] if the payload does
    /// not decode against the bound schema.
    pub fn extract(&self, envelope: &Envelope) -> Result<Value> {
        self.identity.check(&envelope.identity()).map_err(|e| rejected(self.identity, e))?;
        if !envelope.has_payload() {
            return Err(rejected(self.identity, EnvelopeError::MissingContent(self.identity)));
        }
        codec::decode(&self.schema, envelope.payload())
            .ok_or_else(|| rejected(self.identity, EnvelopeError::MismatchingContent(self.identity)))
    }

    /// Decode the payload of `envelope` into a serde type.
    ///
    /// A payload that decodes but does not deserialize into `T` is
    /// [`EnvelopeError::MismatchingContent`].
    pub fn extract_as<T: DeserializeOwned>(&self, envelope: &Envelope) -> Result<T> {
        let value = self.extract(envelope)?;
        apache_avro::from_value::<T>(&value).map_err(|e| {
            debug!(identity = %self.identity, error = %e, "payload does not deserialize");
            EnvelopeError::MismatchingContent(self.identity)
        })
    }

    fn encode_failed(&self, e: &apache_avro::Error) -> ! {
        error!(identity = %self.identity, error = %e, "value does not encode against its own schema");
        panic!(
            "failed to encode value for schema {}: {} (schema: {})",
            self.identity,
            e,
            self.schema.canonical_form()
        );
    }
}

/// A factory with or without a schema
#[derive(Debug, Clone)]
pub enum Factory {
    Schemaless(SchemalessFactory),
    SchemaBound(SchemaBoundFactory),
}

impl Factory {
    pub fn identity(&self) -> SchemaIdentity {
        match self {
            Factory::Schemaless(factory) => factory.identity(),
            Factory::SchemaBound(factory) => factory.identity(),
        }
    }

    /// The bound schema, `None` for a schemaless factory
    pub fn schema(&self) -> Option<&Schema> {
        match self {
            Factory::Schemaless(_) => None,
            Factory::SchemaBound(factory) => Some(factory.schema()),
        }
    }

    /// Extract `envelope`; a schemaless factory yields `None` on success
    pub fn extract(&self, envelope: &Envelope) -> Result<Option<Value>> {
        match self {
            Factory::Schemaless(factory) => factory.extract(envelope).map(|()| None),
            Factory::SchemaBound(factory) => factory.extract(envelope).map(Some),
        }
    }
}

impl From<SchemalessFactory> for Factory {
    fn from(factory: SchemalessFactory) -> Self {
        Factory::Schemaless(factory)
    }
}

impl From<SchemaBoundFactory> for Factory {
    fn from(factory: SchemaBoundFactory) -> Self {
        Factory::SchemaBound(factory)
    }
}

fn rejected(identity: SchemaIdentity, e: EnvelopeError) -> EnvelopeError {
    debug!(%identity, error = %e, "rejected envelope");
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Attribute, Primitive};
    use serde::Deserialize;

    const STRING_SCHEMA: &str = r#"{"name":"simpleString","type":"string"}"#;

    fn hello() -> Value {
        Value::String("Hello".to_string())
    }

    fn envelope(wire: &[u8]) -> Envelope {
        Envelope::decode(wire).unwrap()
    }

    #[test]
    fn test_schemaless_create() {
        let factory = SchemalessFactory::new((9249, 114));
        assert_eq!(factory.create().encode(), vec![0x24, 0x21, 0x72]);
        assert!(factory.extract(&factory.create()).is_ok());
    }

    #[test]
    fn test_schemaless_rejects_other_id() {
        let factory = SchemalessFactory::new((9000, 0));
        let other = SchemalessFactory::new((9001, 0)).create();
        assert!(matches!(
            factory.extract(&other),
            Err(EnvelopeError::UnsupportedSchemaId { expected: 9000, actual: 9001 })
        ));
    }

    #[test]
    fn test_schemaless_rejects_other_version() {
        let factory = SchemalessFactory::new((9000, 0));
        let other = SchemalessFactory::new((9000, 1)).create();
        assert!(matches!(
            factory.extract(&other),
            Err(EnvelopeError::UnsupportedSchemaVersion { id: 9000, expected: 0, actual: 1 })
        ));
    }

    #[test]
    fn test_schemaless_id_checked_before_version() {
        let factory = SchemalessFactory::new((9000, 0));
        let other = SchemalessFactory::new((9001, 1)).create();
        assert!(matches!(factory.extract(&other), Err(EnvelopeError::UnsupportedSchemaId { .. })));
    }

    #[test]
    fn test_schemaless_rejects_payload() {
        let factory = SchemalessFactory::new((9249, 114));
        let err = factory.extract(&envelope(&[0x24, 0x21, 0x72, 0x00])).unwrap_err();
        assert!(matches!(err, EnvelopeError::UnawaitedContent { len: 1, .. }));
    }

    #[test]
    fn test_bound_create_golden_bytes() {
        let factory = SchemaBoundFactory::parse((9250, 115), STRING_SCHEMA).unwrap();
        let created = factory.create(hello());
        assert_eq!(created.encode(), vec![0x24, 0x22, 0x73, 0x0a, 0x48, 0x65, 0x6c, 0x6c, 0x6f]);
    }

    #[test]
    fn test_bound_round_trip() {
        let factory = SchemaBoundFactory::parse((9250, 115), STRING_SCHEMA).unwrap();
        let created = factory.create(hello());
        assert_eq!(factory.extract(&created).unwrap(), hello());
    }

    #[test]
    fn test_bound_parse_rejects_invalid_schema() {
        let result = SchemaBoundFactory::parse((1, 1), r#"{"type":"record","name":"x"}"#);
        assert!(matches!(result, Err(EnvelopeError::InvalidSchema(_))));
    }

    #[test]
    fn test_bound_identity_checks() {
        let factory = SchemaBoundFactory::parse((9250, 115), STRING_SCHEMA).unwrap();
        let other_id = SchemaBoundFactory::parse((9251, 116), STRING_SCHEMA).unwrap().create(hello());
        let other_version = SchemaBoundFactory::parse((9250, 116), STRING_SCHEMA).unwrap().create(hello());

        assert!(matches!(factory.extract(&other_id), Err(EnvelopeError::UnsupportedSchemaId { .. })));
        assert!(matches!(
            factory.extract(&other_version),
            Err(EnvelopeError::UnsupportedSchemaVersion { .. })
        ));
    }

    #[test]
    fn test_bound_rejects_empty_payload() {
        let factory = SchemaBoundFactory::parse((9250, 115), STRING_SCHEMA).unwrap();
        let empty = SchemalessFactory::new((9250, 115)).create();
        assert!(matches!(factory.extract(&empty), Err(EnvelopeError::MissingContent(_))));
    }

    #[test]
    fn test_bound_rejects_undecodable_payload() {
        let factory = SchemaBoundFactory::parse((9250, 115), STRING_SCHEMA).unwrap();
        let corrupt = envelope(&[0x24, 0x22, 0x73, 0x23, 0x00, 0xff, 0xce]);
        let err = factory.extract(&corrupt).unwrap_err();
        assert!(matches!(err, EnvelopeError::MismatchingContent(_)));
        assert!(err.is_content_mismatch());
    }

    #[test]
    #[should_panic(expected = "failed to encode value for schema 9250v115")]
    fn test_bound_create_wrong_shape_is_fatal() {
        let factory = SchemaBoundFactory::parse((9250, 115), STRING_SCHEMA).unwrap();
        factory.create(Value::Long(5));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Child {
        name: String,
        age: i64,
    }

    fn child_factory() -> SchemaBoundFactory {
        let descriptor = SchemaDescriptor::new(
            "child",
            [
                Attribute::new("name", Primitive::String),
                Attribute::new("age", Primitive::Long),
            ],
        );
        SchemaBoundFactory::from_descriptor((17, 2), &descriptor)
    }

    #[test]
    fn test_serde_round_trip() {
        let factory = child_factory();
        let child = Child {
            name: "First Child".to_string(),
            age: 12,
        };
        let created = factory.create_from(&child);
        assert_eq!(factory.extract_as::<Child>(&created).unwrap(), child);
    }

    #[test]
    fn test_extract_as_wrong_type() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Other {
            title: Vec<u8>,
        }

        let factory = child_factory();
        let created = factory.create_from(&Child {
            name: "x".to_string(),
            age: 1,
        });
        assert!(matches!(
            factory.extract_as::<Other>(&created),
            Err(EnvelopeError::MismatchingContent(_))
        ));
    }

    #[test]
    fn test_factory_enum_dispatch() {
        let schemaless = Factory::from(SchemalessFactory::new((1, 0)));
        let bound = Factory::from(SchemaBoundFactory::parse((2, 0), STRING_SCHEMA).unwrap());

        assert!(schemaless.schema().is_none());
        assert!(bound.schema().is_some());
        assert_eq!(schemaless.extract(&envelope(&[0, 1, 0])).unwrap(), None);
        assert_eq!(
            bound.extract(&envelope(&[0, 2, 0, 0x0a, 0x48, 0x65, 0x6c, 0x6c, 0x6f])).unwrap(),
            Some(hello())
        );
    }
}
