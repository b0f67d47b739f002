//! LZW decoder (decompression).

use crate::dictionary::CodeTable;
use oxigif_core::bitstream::BitReader;
use oxigif_core::error::EncodingError;

/// LZW decoder for GIF pixel data.
#[derive(Debug)]
pub struct LzwDecoder {
    table: CodeTable,
}

impl LzwDecoder {
    /// Create a decoder for the given minimum code size in `1..=11`.
    ///
    /// The decode side is more permissive than the encoder's `1..=8` so that
    /// a stream with an oversized-but-workable code size still decodes.
    pub fn new(min_code_size: u8) -> Result<Self, EncodingError> {
        Ok(Self {
            table: CodeTable::new(min_code_size)?,
        })
    }

    /// Decompress `data` into exactly `expected_len` palette indices.
    ///
    /// Stops at the end code, at `expected_len` pixels, or at end of input,
    /// whichever comes first. Reaching the end of input (or the end code)
    /// with fewer than `expected_len` pixels is a
    /// [`EncodingError::TruncatedPixelData`] fault; trailing codes past
    /// `expected_len` are ignored, matching GIFs in the wild that omit the
    /// end code or carry slack.
    pub fn decode(&mut self, data: &[u8], expected_len: usize) -> Result<Vec<u8>, EncodingError> {
        self.table.reset();
        let mut reader = BitReader::new(data);
        let mut output = Vec::with_capacity(expected_len);
        let mut prev: Option<u16> = None;

        let truncated = |output: &Vec<u8>| EncodingError::TruncatedPixelData {
            decoded: output.len(),
            expected: expected_len,
        };

        while output.len() < expected_len {
            let Some(code) = reader.read_code(self.table.width())? else {
                return Err(truncated(&output));
            };

            if code == self.table.clear_code() {
                self.table.reset();
                prev = None;
                continue;
            }
            if code == self.table.end_code() {
                return Err(truncated(&output));
            }

            let invalid_code = |table: &CodeTable| EncodingError::InvalidLzwCode {
                code,
                next_code: table.next_code(),
                width: table.width(),
            };

            if self.table.contains(code) {
                let start = output.len();
                self.table.expand(code, &mut output);
                if let Some(p) = prev {
                    if !self.table.is_full() {
                        self.table.push(p, output[start]);
                    }
                }
            } else if code == self.table.next_code() {
                // KwKwK: the code being defined right now. Its expansion is
                // the previous string followed by that string's first byte.
                let Some(p) = prev else {
                    return Err(invalid_code(&self.table));
                };
                let first = self.table.first_byte(p);
                self.table.expand(p, &mut output);
                output.push(first);
                if !self.table.is_full() {
                    self.table.push(p, first);
                }
            } else {
                return Err(invalid_code(&self.table));
            }

            prev = Some(code);
        }

        // The final expansion may overshoot the pixel count.
        output.truncate(expected_len);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::LzwEncoder;

    #[test]
    fn test_decode_known_stream() {
        // Hand-packed stream for [0,1,2,0,1,2,0,1,2] at size 2.
        let data = [0x44, 0x64, 0x78, 0x05];
        let mut decoder = LzwDecoder::new(2).unwrap();
        let indices = decoder.decode(&data, 9).unwrap();
        assert_eq!(indices, vec![0, 1, 2, 0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_decode_zero_pixels() {
        let mut decoder = LzwDecoder::new(2).unwrap();
        assert!(decoder.decode(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_stream_reports_progress() {
        let compressed = LzwEncoder::new(2).unwrap().encode(&[0, 1, 2, 3]).unwrap();
        let mut decoder = LzwDecoder::new(2).unwrap();
        let err = decoder.decode(&compressed[..1], 100).unwrap_err();
        assert!(matches!(
            err,
            EncodingError::TruncatedPixelData { expected: 100, .. }
        ));
    }

    #[test]
    fn test_early_end_code_is_truncation() {
        // clear(100) + end(101) packed LSB-first.
        let data = [0b0010_1100u8];
        let mut decoder = LzwDecoder::new(2).unwrap();
        let err = decoder.decode(&data, 4).unwrap_err();
        assert!(matches!(
            err,
            EncodingError::TruncatedPixelData {
                decoded: 0,
                expected: 4
            }
        ));
    }

    #[test]
    fn test_garbage_code_rejected() {
        // clear(100) then 7 (111) at width 3: 7 is past next_code 6.
        let data = [0b0011_1100u8];
        let mut decoder = LzwDecoder::new(2).unwrap();
        let err = decoder.decode(&data, 4).unwrap_err();
        assert!(matches!(
            err,
            EncodingError::InvalidLzwCode {
                code: 7,
                next_code: 6,
                width: 3
            }
        ));
    }

    #[test]
    fn test_kwkwk_without_prev_rejected() {
        // clear(100) then 6 (110) immediately: nothing precedes the KwKwK.
        let data = [0b0011_0100u8];
        let mut decoder = LzwDecoder::new(2).unwrap();
        assert!(matches!(
            decoder.decode(&data, 4),
            Err(EncodingError::InvalidLzwCode { code: 6, .. })
        ));
    }

    #[test]
    fn test_missing_end_code_tolerated() {
        // clear(100) then 1 (001) and nothing else: the pixel count is
        // satisfied before the absent end code matters.
        let data = [0b0000_1100u8];
        let mut decoder = LzwDecoder::new(2).unwrap();
        assert_eq!(decoder.decode(&data, 1).unwrap(), vec![1]);
    }

    #[test]
    fn test_decoder_reusable_across_calls() {
        let a = [0u8, 1, 0, 1];
        let b = [3u8, 2, 1, 0];
        let ca = LzwEncoder::new(2).unwrap().encode(&a).unwrap();
        let cb = LzwEncoder::new(2).unwrap().encode(&b).unwrap();

        let mut decoder = LzwDecoder::new(2).unwrap();
        assert_eq!(decoder.decode(&ca, 4).unwrap(), a);
        assert_eq!(decoder.decode(&cb, 4).unwrap(), b);
    }
}
