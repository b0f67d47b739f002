//! LZW encoder (compression).

use std::collections::HashMap;

use crate::MAX_CODES;
use oxigif_core::bitstream::BitWriter;
use oxigif_core::error::EncodingError;

/// LZW encoder for GIF pixel data.
///
/// The dictionary is keyed by `(prefix_code, extension_byte)` pairs, so the
/// strings the classic description builds are never materialized.
#[derive(Debug)]
pub struct LzwEncoder {
    /// Effective minimum code size (GIF floor of 2 applied).
    min_code_size: u8,
}

impl LzwEncoder {
    /// Create an encoder for the given minimum code size in `1..=8`.
    ///
    /// A size of 1 (a 2-color palette) is widened to GIF's minimum of 2.
    pub fn new(min_code_size: u8) -> Result<Self, EncodingError> {
        if min_code_size == 0 || min_code_size > 8 {
            return Err(EncodingError::InvalidMinCodeSize(min_code_size));
        }
        Ok(Self {
            min_code_size: min_code_size.max(2),
        })
    }

    /// The effective minimum code size this encoder emits at.
    pub fn min_code_size(&self) -> u8 {
        self.min_code_size
    }

    /// Compress `indices` into a raw LZW bitstream (no sub-block framing).
    ///
    /// Every index must be below `2^min_code_size`; the stream opens with a
    /// clear code and closes with the end code.
    pub fn encode(&self, indices: &[u8]) -> Result<Vec<u8>, EncodingError> {
        let clear = 1u16 << self.min_code_size;
        let end = clear + 1;

        let mut width = self.min_code_size + 1;
        let mut next_code = end + 1;
        let mut table: HashMap<(u16, u8), u16> = HashMap::new();
        let mut writer = BitWriter::new();

        writer.write_code(clear, width)?;

        let check = |byte: u8, next_code: u16, width: u8| {
            if (byte as u16) < clear {
                Ok(())
            } else {
                Err(EncodingError::InvalidLzwCode {
                    code: byte as u16,
                    next_code,
                    width,
                })
            }
        };

        let Some((&head, rest)) = indices.split_first() else {
            writer.write_code(end, width)?;
            return Ok(writer.finish());
        };
        check(head, next_code, width)?;
        let mut prev = head as u16;

        for &byte in rest {
            check(byte, next_code, width)?;

            if let Some(&code) = table.get(&(prev, byte)) {
                prev = code;
                continue;
            }

            writer.write_code(prev, width)?;

            if next_code < MAX_CODES {
                table.insert((prev, byte), next_code);
                next_code += 1;
                // The decoder widens after the insertion that fills 2^W;
                // mirror that here so the next emission lands at its width.
                if next_code > (1 << width) && width < 12 {
                    width += 1;
                }
            } else {
                writer.write_code(clear, width)?;
                table.clear();
                next_code = end + 1;
                width = self.min_code_size + 1;
            }

            prev = byte as u16;
        }

        writer.write_code(prev, width)?;
        writer.write_code(end, width)?;
        Ok(writer.finish())
    }
}
