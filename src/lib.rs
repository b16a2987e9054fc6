//! Schema Envelope
//!
//! Self-describing framing for Avro-encoded messages that share one channel
//! (socket, queue, log). Each message carries the id and generation of the
//! schema that produced it, so a receiver can pick the right decoder without
//! out-of-band coordination.
//!
//! ## Features
//!
//! - **Envelope**: 3-byte header (big-endian schema id, schema version) followed by the payload
//! - **Factories**: stamp outgoing envelopes and vet incoming ones against a schema generation
//! - **Schema Descriptors**: declare record schemas as typed attributes instead of JSON text
//! - **Registry**: route incoming envelopes to the factory of their schema generation
//! - **Fingerprints**: pin configured schemas to a SHA256 of their canonical form
//!
//! ## Flow
//!
//! ```text
//! producer                                    consumer
//! ────────                                    ────────
//! SchemaBoundFactory(9250v115, schema)        SchemaBoundFactory(9250v115, schema)
//!   .create(value) ──► Envelope               Envelope::decode(bytes)
//!                        .encode() ──► bytes ──► .extract(&envelope) ──► value
//! ```

pub mod codec;
pub mod config;
pub mod descriptor;
pub mod envelope;
pub mod enveloped;
pub mod error;
pub mod factory;
pub mod fingerprint;
pub mod identity;
pub mod registry;

pub use config::EnvelopeConfig;
pub use descriptor::{Attribute, Primitive, SchemaDescriptor, TypeRepresentation};
pub use envelope::{Envelope, HEADER_LEN};
pub use enveloped::Enveloped;
pub use error::{EnvelopeError, Result};
pub use factory::{Factory, SchemaBoundFactory, SchemalessFactory};
pub use fingerprint::SchemaFingerprint;
pub use identity::SchemaIdentity;
pub use registry::FactoryRegistry;

pub use apache_avro::types::Value;
pub use apache_avro::Schema;
