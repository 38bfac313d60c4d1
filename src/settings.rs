//! Format parameters shared by the compressor and the decompressor

use crate::util::field_range;

/// Configuration errors
///
/// These are raised before any input byte is looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Referencing a separately compressed stream is not implemented
    #[error("compressed stream references are not implemented")]
    CompressedReferenceUnsupported,
    /// Absolute addressing is not implemented
    #[error("absolute addressing is not implemented")]
    AbsoluteAddressingUnsupported,
    /// Diagnostic logging mode is not implemented
    #[error("diagnostic logging is not implemented")]
    DiagnosticLoggingUnsupported,
    /// A field width is outside of 1..=8 bytes
    #[error("{field} width of {width} bytes is outside 1..=8")]
    InvalidFieldWidth { field: &'static str, width: u8 },
    /// Marker run fields must fit in the general backreference fields
    #[error("marker run widths exceed backreference widths")]
    MarkerRunWiderThanBackRef,
}

/// What backreferences point into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReferenceMode {
    /// The stream being decompressed (the only supported mode)
    #[default]
    SelfStream,
    /// A separately compressed stream
    CompressedStream,
}

/// How the offset field is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressingMode {
    /// Distance back from the current position (the only supported mode)
    #[default]
    Relative,
    /// Position from the start of the stream
    Absolute,
}

/// Byte widths of the two little-endian fields of a backreference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldWidths {
    pub nb_bytes_address: u8,
    pub nb_bytes_length: u8,
}
impl FieldWidths {
    pub const fn new(nb_bytes_address: u8, nb_bytes_length: u8) -> Self {
        Self {
            nb_bytes_address,
            nb_bytes_length,
        }
    }

    /// Largest representable offset
    pub fn address_range(&self) -> usize {
        field_range(self.nb_bytes_address)
    }

    /// Largest representable length
    pub fn length_range(&self) -> usize {
        field_range(self.nb_bytes_length)
    }

    /// Bytes following the marker in a backreference token
    pub fn token_fields_len(&self) -> usize {
        self.nb_bytes_address as usize + self.nb_bytes_length as usize
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, width) in [
            ("address", self.nb_bytes_address),
            ("length", self.nb_bytes_length),
        ] {
            if !(1..=8).contains(&width) {
                return Err(ConfigError::InvalidFieldWidth { field, width });
            }
        }
        Ok(())
    }
}
impl Default for FieldWidths {
    fn default() -> Self {
        Self::new(2, 1)
    }
}

/// Compression format settings
///
/// Resolved once per call and never mutated while (de)compressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    /// The reserved marker byte introducing every backreference
    pub symbol: u8,
    /// Widths used by general backreferences (and by every token on the wire)
    pub backref: FieldWidths,
    /// Widths bounding how runs of `symbol` are re-expressed
    pub marker_run: FieldWidths,
    pub reference_to: ReferenceMode,
    pub addressing: AddressingMode,
    pub diagnostic_logging: bool,
}
impl Settings {
    /// Settings with the given marker and default 2-byte address / 1-byte length fields
    pub fn new(symbol: u8) -> Self {
        Self {
            symbol,
            ..Self::default()
        }
    }

    pub fn with_backref_widths(mut self, nb_bytes_address: u8, nb_bytes_length: u8) -> Self {
        self.backref = FieldWidths::new(nb_bytes_address, nb_bytes_length);
        self
    }

    pub fn with_marker_run_widths(mut self, nb_bytes_address: u8, nb_bytes_length: u8) -> Self {
        self.marker_run = FieldWidths::new(nb_bytes_address, nb_bytes_length);
        self
    }

    /// Set both width sets at once
    pub fn with_widths(self, nb_bytes_address: u8, nb_bytes_length: u8) -> Self {
        self.with_backref_widths(nb_bytes_address, nb_bytes_length)
            .with_marker_run_widths(nb_bytes_address, nb_bytes_length)
    }

    pub fn with_reference_to(mut self, reference_to: ReferenceMode) -> Self {
        self.reference_to = reference_to;
        self
    }

    pub fn with_addressing(mut self, addressing: AddressingMode) -> Self {
        self.addressing = addressing;
        self
    }

    pub fn with_diagnostic_logging(mut self, diagnostic_logging: bool) -> Self {
        self.diagnostic_logging = diagnostic_logging;
        self
    }

    /// Reject settings the format cannot (yet) express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reference_to == ReferenceMode::CompressedStream {
            return Err(ConfigError::CompressedReferenceUnsupported);
        }
        if self.addressing == AddressingMode::Absolute {
            return Err(ConfigError::AbsoluteAddressingUnsupported);
        }
        if self.diagnostic_logging {
            return Err(ConfigError::DiagnosticLoggingUnsupported);
        }
        self.backref.validate()?;
        self.marker_run.validate()?;
        if self.marker_run.nb_bytes_address > self.backref.nb_bytes_address
            || self.marker_run.nb_bytes_length > self.backref.nb_bytes_length
        {
            return Err(ConfigError::MarkerRunWiderThanBackRef);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let s = Settings::default();
        assert_eq!(s.symbol, 0);
        assert_eq!(s.backref, FieldWidths::new(2, 1));
        assert_eq!(s.marker_run, FieldWidths::new(2, 1));
        assert_eq!(s.validate(), Ok(()));
        assert_eq!(s.backref.address_range(), 65536);
        assert_eq!(s.backref.length_range(), 256);
        assert_eq!(s.backref.token_fields_len(), 3);
    }

    #[test]
    fn test_unsupported_modes() {
        assert_eq!(
            Settings::new(0xfe)
                .with_reference_to(ReferenceMode::CompressedStream)
                .validate(),
            Err(ConfigError::CompressedReferenceUnsupported)
        );
        assert_eq!(
            Settings::new(0xfe)
                .with_addressing(AddressingMode::Absolute)
                .validate(),
            Err(ConfigError::AbsoluteAddressingUnsupported)
        );
        assert_eq!(
            Settings::new(0xfe).with_diagnostic_logging(true).validate(),
            Err(ConfigError::DiagnosticLoggingUnsupported)
        );
    }

    #[test]
    fn test_bad_widths() {
        assert_eq!(
            Settings::new(0).with_widths(0, 1).validate(),
            Err(ConfigError::InvalidFieldWidth {
                field: "address",
                width: 0
            })
        );
        assert_eq!(
            Settings::new(0).with_widths(2, 9).validate(),
            Err(ConfigError::InvalidFieldWidth {
                field: "length",
                width: 9
            })
        );
        assert_eq!(
            Settings::new(0)
                .with_backref_widths(1, 1)
                .with_marker_run_widths(2, 1)
                .validate(),
            Err(ConfigError::MarkerRunWiderThanBackRef)
        );
        // narrower marker run widths are fine
        assert_eq!(
            Settings::new(0)
                .with_backref_widths(3, 2)
                .with_marker_run_widths(1, 1)
                .validate(),
            Ok(())
        );
    }
}
