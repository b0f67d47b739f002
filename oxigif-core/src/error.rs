//! Error types for OxiGIF operations.
//!
//! Two kinds cover the codec: [`ValidationError`] for caller-facing
//! precondition violations (checked before any read or write happens), and
//! [`EncodingError`] for faults inside the byte stream or the codec state.
//! [`GifError`] is the umbrella type public entry points return.

use std::io;
use thiserror::Error;

/// Caller-facing precondition violations.
///
/// Raised before any mutation; the caller must correct its inputs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A dimension is zero or exceeds the GIF limit of 65535.
    #[error("{field} must be in 1..=65535, got {value}")]
    DimensionOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: u32,
    },

    /// Pixel buffer length does not match the declared dimensions.
    #[error("pixel buffer length {actual} does not match {width}x{height} (expected {expected})")]
    BufferSizeMismatch {
        /// Required length in bytes.
        expected: usize,
        /// Provided length in bytes.
        actual: usize,
        /// Declared width.
        width: u16,
        /// Declared height.
        height: u16,
    },

    /// A palette holds no colors or more than 256.
    #[error("palette must hold 1..=256 colors, got {0}")]
    PaletteSize(usize),

    /// A pixel index points past the end of its palette.
    #[error("pixel index {index} out of range for palette of {palette_len} colors")]
    IndexOutOfRange {
        /// The offending index.
        index: u8,
        /// Number of colors in the palette.
        palette_len: usize,
    },

    /// max_colors outside the supported range.
    #[error("max_colors must be in 1..=256, got {0}")]
    InvalidMaxColors(usize),

    /// A writer method was called out of order.
    #[error("invalid writer state: cannot {operation} while {state}")]
    WriterState {
        /// The attempted operation.
        operation: &'static str,
        /// Human-readable current state.
        state: &'static str,
    },

    /// An animation was requested with no frames.
    #[error("animation requires at least one frame")]
    NoFrames,

    /// An animation frame's size differs from the first frame's.
    #[error("frame {index} is {actual_w}x{actual_h}, expected {expected_w}x{expected_h}")]
    FrameSizeMismatch {
        /// Zero-based frame position.
        index: usize,
        /// Canvas width set by the first frame.
        expected_w: u16,
        /// Canvas height set by the first frame.
        expected_h: u16,
        /// This frame's width.
        actual_w: u16,
        /// This frame's height.
        actual_h: u16,
    },
}

/// Faults in the byte stream or in the codec's internal state.
///
/// Decoders never panic on malformed input; they return one of these.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The stream does not start with a GIF signature.
    #[error("not a GIF stream{hint}: first bytes {dump}")]
    InvalidSignature {
        /// Hex dump of the stream head.
        dump: String,
        /// Extra hint when the magic matches another known format.
        hint: String,
    },

    /// The stream ended before a required structure was complete.
    #[error("unexpected end of stream at offset {offset}: expected {expected} more bytes")]
    UnexpectedEof {
        /// Byte offset where the shortage was detected.
        offset: usize,
        /// Number of bytes that were still required.
        expected: usize,
    },

    /// A record separator that is neither extension, image, nor trailer.
    #[error("unexpected separator {separator:#04x} at offset {offset} (context: {context})")]
    UnexpectedSeparator {
        /// The offending byte.
        separator: u8,
        /// Byte offset of the separator.
        offset: usize,
        /// Surrounding bytes rendered printable-or-escaped.
        context: String,
    },

    /// An LZW code outside the dictionary was read.
    #[error("invalid LZW code {code} (next free code {next_code}, width {width})")]
    InvalidLzwCode {
        /// The code read from the stream.
        code: u16,
        /// Next code the dictionary would assign.
        next_code: u16,
        /// Current read width in bits.
        width: u8,
    },

    /// A bit width outside what GIF LZW permits.
    #[error("invalid code width {0} (must be 1..={1})")]
    InvalidCodeWidth(u8, u8),

    /// An LZW minimum code size outside 2..=11.
    #[error("invalid LZW minimum code size {0}")]
    InvalidMinCodeSize(u8),

    /// The compressed stream ended mid-code.
    #[error("LZW stream truncated after {decoded} of {expected} pixels")]
    TruncatedPixelData {
        /// Pixels decoded before the stream ran out.
        decoded: usize,
        /// Pixels the image descriptor promised.
        expected: usize,
    },
}

/// The umbrella error type for OxiGIF operations.
#[derive(Debug, Error)]
pub enum GifError {
    /// Input precondition violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Malformed or corrupt stream.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// I/O error from an underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for OxiGIF operations.
pub type Result<T> = std::result::Result<T, GifError>;

impl EncodingError {
    /// Create an unexpected-EOF error.
    pub fn unexpected_eof(offset: usize, expected: usize) -> Self {
        Self::UnexpectedEof { offset, expected }
    }

    /// Create an invalid-signature error from the stream head.
    ///
    /// Recognizes a few common non-GIF magics and names them in the hint.
    pub fn invalid_signature(head: &[u8]) -> Self {
        let dump = head
            .iter()
            .take(16)
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        let hint = if head.first() == Some(&b'<') {
            " (looks like XML/HTML)"
        } else if head.len() >= 4 && &head[1..4] == b"PNG" {
            " (looks like PNG)"
        } else if head.starts_with(&[0xFF, 0xD8]) {
            " (looks like JPEG)"
        } else {
            ""
        };
        Self::InvalidSignature {
            dump,
            hint: hint.to_string(),
        }
    }

    /// Create an unexpected-separator error with escaped context bytes.
    pub fn unexpected_separator(separator: u8, offset: usize, surrounding: &[u8]) -> Self {
        let context = surrounding
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    (b as char).to_string()
                } else {
                    format!("\\x{b:02x}")
                }
            })
            .collect::<String>();
        Self::UnexpectedSeparator {
            separator,
            offset,
            context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_hints() {
        let err = EncodingError::invalid_signature(b"<html><body>");
        assert!(err.to_string().contains("XML/HTML"));

        let err = EncodingError::invalid_signature(b"\x89PNG\r\n\x1a\n");
        assert!(err.to_string().contains("PNG"));

        let err = EncodingError::invalid_signature(&[0xFF, 0xD8, 0xFF, 0xE0]);
        assert!(err.to_string().contains("JPEG"));

        let err = EncodingError::invalid_signature(b"RIFF....WEBP");
        assert!(!err.to_string().contains("looks like"));
    }

    #[test]
    fn test_signature_dump_is_bounded() {
        let err = EncodingError::invalid_signature(&[0xAB; 64]);
        let msg = err.to_string();
        assert_eq!(msg.matches("ab").count(), 16);
    }

    #[test]
    fn test_separator_context_escapes() {
        let err = EncodingError::unexpected_separator(0x7F, 42, b"GIF\x00\x01ab");
        let msg = err.to_string();
        assert!(msg.contains("GIF\\x00\\x01ab"));
        assert!(msg.contains("offset 42"));
    }

    #[test]
    fn test_umbrella_conversions() {
        let v: GifError = ValidationError::PaletteSize(300).into();
        assert!(matches!(v, GifError::Validation(_)));

        let e: GifError = EncodingError::unexpected_eof(10, 4).into();
        assert!(matches!(e, GifError::Encoding(_)));
    }
}
