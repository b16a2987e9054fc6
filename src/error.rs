//! Error types for envelope handling

use thiserror::Error;

use crate::identity::SchemaIdentity;

/// Result type for envelope operations
pub type Result<T> = std::result::Result<T, EnvelopeError>;

/// Envelope errors
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Unsupported schema id: expected {expected}, got {actual}")]
    UnsupportedSchemaId { expected: u16, actual: u16 },

    #[error("Unsupported schema version for schema {id}: expected {expected}, got {actual}")]
    UnsupportedSchemaVersion { id: u16, expected: u8, actual: u8 },

    #[error("Unawaited content: envelope {identity} is schemaless but carries {len} bytes")]
    UnawaitedContent { identity: SchemaIdentity, len: usize },

    #[error("Missing content: envelope {0} has an empty payload")]
    MissingContent(SchemaIdentity),

    #[error("Mismatching content: payload of {0} does not decode against its schema")]
    MismatchingContent(SchemaIdentity),

    #[error("Truncated envelope: {0} bytes is shorter than the header")]
    Truncated(usize),

    #[error("No factory registered for schema {0}")]
    Unregistered(SchemaIdentity),

    #[error("Schema {0} is already registered")]
    DuplicateIdentity(SchemaIdentity),

    #[error("Fingerprint mismatch for schema {identity}: expected {expected}, got {actual}")]
    FingerprintMismatch {
        identity: SchemaIdentity,
        expected: String,
        actual: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Codec error: {0}")]
    Codec(#[from] apache_avro::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl EnvelopeError {
    /// The envelope was meant for another schema or schema generation.
    pub fn is_identity_mismatch(&self) -> bool {
        matches!(
            self,
            EnvelopeError::UnsupportedSchemaId { .. }
                | EnvelopeError::UnsupportedSchemaVersion { .. }
                | EnvelopeError::Unregistered(_)
        )
    }

    /// The identity matched but the payload did not have the awaited shape.
    pub fn is_content_mismatch(&self) -> bool {
        matches!(
            self,
            EnvelopeError::UnawaitedContent { .. }
                | EnvelopeError::MissingContent(_)
                | EnvelopeError::MismatchingContent(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_classes_are_disjoint() {
        let identity = SchemaIdentity::new(7, 1);
        let errors = [
            EnvelopeError::UnsupportedSchemaId { expected: 7, actual: 8 },
            EnvelopeError::UnsupportedSchemaVersion { id: 7, expected: 1, actual: 2 },
            EnvelopeError::Unregistered(identity),
            EnvelopeError::UnawaitedContent { identity, len: 3 },
            EnvelopeError::MissingContent(identity),
            EnvelopeError::MismatchingContent(identity),
        ];

        for error in &errors[..3] {
            assert!(error.is_identity_mismatch());
            assert!(!error.is_content_mismatch());
        }
        for error in &errors[3..] {
            assert!(error.is_content_mismatch());
            assert!(!error.is_identity_mismatch());
        }
    }

    #[test]
    fn test_error_messages_name_the_identity() {
        let err = EnvelopeError::MissingContent(SchemaIdentity::new(9250, 115));
        assert_eq!(err.to_string(), "Missing content: envelope 9250v115 has an empty payload");
    }
}
