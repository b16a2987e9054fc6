//! Envelope wire format
//!
//! ```text
//! +---------+---------+---------+----------------------+
//! | id (hi) | id (lo) | version | payload ...          |
//! +---------+---------+---------+----------------------+
//!   byte 0    byte 1    byte 2    bytes 3.. (verbatim)
//! ```
//!
//! There is no magic number, length field or checksum: the payload is
//! whatever follows the header.

use apache_avro::types::Value;

use crate::identity::SchemaIdentity;

/// Size of the envelope header in bytes
pub const HEADER_LEN: usize = 3;

/// A schema-identified payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Envelope {
    identity: SchemaIdentity,
    payload: Vec<u8>,
}

impl Envelope {
    pub(crate) fn new(identity: SchemaIdentity, payload: Vec<u8>) -> Self {
        Self { identity, payload }
    }

    pub(crate) fn empty(identity: SchemaIdentity) -> Self {
        Self::new(identity, Vec::new())
    }

    /// Decode an envelope from its wire form.
    ///
    /// Returns `None` if `bytes` is shorter than the header. Any input of at
    /// least [`HEADER_LEN`] bytes decodes; the payload may be empty.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_LEN {
            return None;
        }

        let id = u16::from_be_bytes([bytes[0], bytes[1]]);
        let identity = SchemaIdentity::new(id, bytes[2]);
        Some(Self::new(identity, bytes[HEADER_LEN..].to_vec()))
    }

    /// Encode the envelope to its wire form
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.payload.len());
        self.encode_into(&mut buf);
        buf
    }

    /// Append the wire form to `buf`
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.identity.id.to_be_bytes());
        buf.push(self.identity.version);
        buf.extend_from_slice(&self.payload);
    }

    pub fn identity(&self) -> SchemaIdentity {
        self.identity
    }

    pub fn schema_id(&self) -> u16 {
        self.identity.id
    }

    pub fn schema_version(&self) -> u8 {
        self.identity.version
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn has_payload(&self) -> bool {
        !self.payload.is_empty()
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Total size of the wire form
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    /// Wrap the wire form in an Avro `bytes` value so the envelope can be
    /// nested inside another record.
    pub fn to_avro(&self) -> Value {
        Value::Bytes(self.encode())
    }

    /// Inverse of [`Envelope::to_avro`]. Accepts `bytes` and `fixed` values.
    pub fn from_avro(value: &Value) -> Option<Self> {
        match value {
            Value::Bytes(bytes) | Value::Fixed(_, bytes) => Self::decode(bytes),
            _ => None,
        }
    }
}

impl From<Envelope> for Vec<u8> {
    fn from(envelope: Envelope) -> Self {
        envelope.encode()
    }
}
