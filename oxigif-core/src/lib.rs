//! # OxiGIF Core
//!
//! Core components for the OxiGIF codec library.
//!
//! This crate provides the fundamental building blocks shared by the
//! encoder and decoder:
//!
//! - [`bitstream`]: LSB-first bit-level I/O for variable-width LZW codes
//! - [`subblock`]: GIF data sub-block framing (length-prefixed, zero-terminated)
//! - [`color`]: RGB color tables with GIF size-field and padding rules
//! - [`image`]: truecolor and indexed image buffers, decoded frame records
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! OxiGIF is designed as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     oxigif info / extract / create                      │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container                                           │
//! │     GIF89a reader/writer, canvas compositor, façade     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     GIF-variant LZW, median-cut quantizer               │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader/BitWriter, sub-block framer, data model   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxigif_core::bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_code(0b101, 3).unwrap();
//! writer.write_code(0b11001, 5).unwrap();
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_code(3).unwrap(), Some(0b101));
//! assert_eq!(reader.read_code(5).unwrap(), Some(0b11001));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod bitstream;
pub mod color;
pub mod error;
pub mod image;
pub mod subblock;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use color::Palette;
pub use error::{EncodingError, GifError, Result, ValidationError};
pub use image::{DisposalMethod, Frame, IndexedImage, RgbaImage};
