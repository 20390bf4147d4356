//! Codec-facing configuration surface.
//!
//! Connection-level configuration (host, port, SSL mode, pooling) belongs to the
//! connection layer this crate treats as an external collaborator; the only
//! environment knob the codec itself needs is how to decode text-format `bytea`,
//! which depends on the server's `bytea_output` setting.

/// How the server is configured to render `bytea` in text format. Affects only
/// `bytea`'s text reader; binary `bytea` is unambiguous and ignores this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteaOutput {
    /// `\x`-prefixed hex, the default since PostgreSQL 9.0.
    #[default]
    Hex,
    /// The legacy octal-escape format used by PostgreSQL 8.x and earlier.
    Escape,
}

/// Configuration the codec needs from its environment, independent of the
/// connection that supplies bytes to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Mirrors the server's `bytea_output` setting; only affects text-format
    /// `bytea` decoding, since binary `bytea` is self-describing.
    pub bytea_output: ByteaOutput,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            bytea_output: ByteaOutput::Hex,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_hex_output() {
        assert_eq!(CodecConfig::default().bytea_output, ByteaOutput::Hex);
    }
}
