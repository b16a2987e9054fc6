//! Schema identity: which schema, and which generation of it, produced a payload

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EnvelopeError, Result};

/// A `(schema id, schema version)` pair.
///
/// The id is carried big-endian in the first two header bytes of an
/// [`Envelope`](crate::Envelope), the version in the third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaIdentity {
    /// Schema id
    pub id: u16,
    /// Schema generation
    pub version: u8,
}

impl SchemaIdentity {
    /// Create a new schema identity
    pub const fn new(id: u16, version: u8) -> Self {
        Self { id, version }
    }

    /// Check that `other` names the same schema generation as `self`.
    ///
    /// The id is compared before the version, so an envelope differing in both
    /// reports [`EnvelopeError::UnsupportedSchemaId`].
    pub fn check(&self, other: &SchemaIdentity) -> Result<()> {
        if self.id != other.id {
            return Err(EnvelopeError::UnsupportedSchemaId {
                expected: self.id,
                actual: other.id,
            });
        }
        if self.version != other.version {
            return Err(EnvelopeError::UnsupportedSchemaVersion {
                id: self.id,
                expected: self.version,
                actual: other.version,
            });
        }
        Ok(())
    }
}

impl fmt::Display for SchemaIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.id, self.version)
    }
}

impl From<(u16, u8)> for SchemaIdentity {
    fn from((id, version): (u16, u8)) -> Self {
        Self::new(id, version)
    }
}
