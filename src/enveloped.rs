//! Types that travel as envelopes

use crate::envelope::Envelope;

/// A type with an envelope form, usually produced and vetted by a factory
/// it keeps for its own schema generation.
pub trait Enveloped: Sized {
    /// Rebuild the value; `None` if the envelope is not one of ours
    fn from_envelope(envelope: &Envelope) -> Option<Self>;

    fn to_envelope(&self) -> Envelope;

    /// Rebuild the value from wire bytes
    fn from_wire(bytes: &[u8]) -> Option<Self> {
        Envelope::decode(bytes).and_then(|envelope| Self::from_envelope(&envelope))
    }

    fn to_wire(&self) -> Vec<u8> {
        self.to_envelope().encode()
    }
}
