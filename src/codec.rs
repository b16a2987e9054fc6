//! Binding to the Avro codec
//!
//! Payload encoding, decoding and schema parsing are delegated to
//! `apache-avro`. This module narrows its API to the three operations the
//! envelope layer consumes.

use apache_avro::types::Value;
use apache_avro::{from_avro_datum, to_avro_datum, Schema};

use crate::error::{EnvelopeError, Result};

/// Parse Avro schema text
pub fn parse_schema(text: &str) -> Result<Schema> {
    Schema::parse_str(text).map_err(|e| EnvelopeError::InvalidSchema(e.to_string()))
}

/// Encode a single datum against `schema`.
///
/// The value is validated against the schema before encoding.
pub fn encode(schema: &Schema, value: impl Into<Value>) -> std::result::Result<Vec<u8>, apache_avro::Error> {
    to_avro_datum(schema, value)
}

/// Decode exactly one datum from `bytes`.
///
/// Returns `None` if the bytes do not decode, the result does not validate
/// against the schema, or bytes remain after the datum.
pub fn decode(schema: &Schema, bytes: &[u8]) -> Option<Value> {
    let mut reader = bytes;
    let value = from_avro_datum(schema, &mut reader, None).ok()?;
    if !reader.is_empty() || !value.validate(schema) {
        return None;
    }
    Some(value)
}
