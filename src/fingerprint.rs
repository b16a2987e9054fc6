//! Schema fingerprints for pinning a schema generation

use apache_avro::Schema;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

/// SHA256 fingerprint of a schema's Parsing Canonical Form, as lowercase hex.
///
/// Two schema texts that differ only in formatting, field order of JSON
/// attributes or documentation share a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaFingerprint(String);

impl SchemaFingerprint {
    /// Compute the fingerprint of a parsed schema
    pub fn of(schema: &Schema) -> Self {
        let fingerprint = schema.fingerprint::<Sha256>();
        Self(hex::encode(fingerprint.bytes))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare two fingerprints, ignoring hex case
    pub fn matches(&self, other: &SchemaFingerprint) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Verify that `schema` has this fingerprint
    pub fn verify(&self, schema: &Schema) -> bool {
        self.matches(&Self::of(schema))
    }
}

impl fmt::Display for SchemaFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SchemaFingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SchemaFingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
