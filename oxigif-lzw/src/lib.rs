//! # OxiGIF LZW
//!
//! LZW compression and decompression specialized to GIF's conventions:
//!
//! - **LSB-first bit order**: codes are packed least significant bit first
//! - **Variable width**: codes start at `min_code_size + 1` bits and grow to 12
//! - **Clear/end codes**: `2^min_code_size` resets the dictionary,
//!   `clear + 1` ends the stream
//! - **Dictionary reset on overflow**: a full table (4096 codes) triggers a
//!   clear code and a fresh dictionary
//!
//! The input alphabet is palette indices `0..2^min_code_size`; the sub-block
//! framing that wraps the compressed bytes inside a GIF file lives in
//! `oxigif_core::subblock`, not here.
//!
//! ## Example
//!
//! ```rust
//! use oxigif_lzw::{compress, decompress};
//!
//! let indices = [0u8, 1, 2, 0, 1, 2, 0, 1, 2];
//! let compressed = compress(&indices, 2).unwrap();
//! let decompressed = decompress(&compressed, 2, indices.len()).unwrap();
//! assert_eq!(decompressed, indices);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod decoder;
mod dictionary;
mod encoder;

pub use decoder::LzwDecoder;
pub use encoder::LzwEncoder;

use oxigif_core::error::EncodingError;

/// Total code space: 12-bit codes.
pub const MAX_CODES: u16 = 4096;

/// Compress palette indices with GIF LZW.
///
/// `min_code_size` is the writer-chosen initial code size in `1..=8`
/// (a value of 1 is widened to GIF's minimum of 2). Every index must be
/// below `2^min_code_size`.
pub fn compress(indices: &[u8], min_code_size: u8) -> Result<Vec<u8>, EncodingError> {
    LzwEncoder::new(min_code_size)?.encode(indices)
}

/// Decompress a GIF LZW stream back into palette indices.
///
/// `expected_len` is the pixel count the image descriptor promised; output
/// stops there even if the stream carries trailing codes, and a stream that
/// ends without an end code is accepted once `expected_len` is reached.
pub fn decompress(
    data: &[u8],
    min_code_size: u8,
    expected_len: usize,
) -> Result<Vec<u8>, EncodingError> {
    LzwDecoder::new(min_code_size)?.decode(data, expected_len)
}
