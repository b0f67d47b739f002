//! # OxiGIF Codec
//!
//! The GIF89a container layer: a streaming reader, a state-guarded writer,
//! the canvas compositor that reconstructs displayed frames, and one-call
//! encode/decode entry points.
//!
//! ## Encoding
//!
//! ```rust
//! use oxigif_codec::{encode_static, EncodeOptions};
//! use oxigif_core::RgbaImage;
//!
//! let image = RgbaImage::filled(10, 10, [255, 0, 0, 255]).unwrap();
//! let bytes = encode_static(&image, &EncodeOptions::default()).unwrap();
//! assert_eq!(&bytes[..6], b"GIF89a");
//! ```
//!
//! ## Decoding
//!
//! ```rust
//! use oxigif_codec::{decode, encode_static, EncodeOptions};
//! use oxigif_core::RgbaImage;
//!
//! let image = RgbaImage::filled(4, 3, [0, 128, 255, 255]).unwrap();
//! let bytes = encode_static(&image, &EncodeOptions::default()).unwrap();
//!
//! let decoded = decode(&bytes).unwrap();
//! assert_eq!(decoded.info.frame_count, 1);
//! assert_eq!(decoded.frames[0].image.width(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod compositor;
pub mod reader;
pub mod screen;
pub mod writer;

pub use reader::{decode, read_info, DecodedGif, GifInfo};
pub use screen::LogicalScreen;
pub use writer::{FrameSpec, GifWriter};

use oxigif_core::error::{GifError, ValidationError};
use oxigif_core::image::{DisposalMethod, RgbaImage};
use oxigif_quant::Quantizer;

/// Options for [`encode_static`].
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Palette size ceiling (1..=256).
    pub max_colors: usize,
    /// Background color index written to the logical screen descriptor.
    pub background: u8,
    /// Pixel aspect ratio byte (0 = unspecified).
    pub pixel_aspect: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            max_colors: 256,
            background: 0,
            pixel_aspect: 0,
        }
    }
}

impl EncodeOptions {
    /// Set the palette size ceiling.
    pub fn max_colors(mut self, max_colors: usize) -> Self {
        self.max_colors = max_colors;
        self
    }

    /// Set the background color index.
    pub fn background(mut self, index: u8) -> Self {
        self.background = index;
        self
    }

    /// Set the pixel aspect ratio byte.
    pub fn pixel_aspect(mut self, aspect: u8) -> Self {
        self.pixel_aspect = aspect;
        self
    }
}

/// Per-frame overrides for [`encode_animation`].
#[derive(Debug, Clone, Default)]
pub struct FrameOptions {
    /// Delay override in milliseconds; the animation default applies when
    /// absent.
    pub delay_ms: Option<u32>,
    /// Disposal directive for this frame.
    pub disposal: DisposalMethod,
    /// Transparent palette index for this frame.
    pub transparent: Option<u8>,
}

/// Options for [`encode_animation`].
#[derive(Debug, Clone)]
pub struct AnimationOptions {
    /// Palette size ceiling (1..=256); the palette is trained on the first
    /// frame and shared by all of them.
    pub max_colors: usize,
    /// Default frame delay in milliseconds.
    pub delay_ms: u32,
    /// Netscape loop count; 0 loops forever.
    pub loops: u16,
    /// Per-frame overrides, matched to frames by position.
    pub frame_options: Vec<FrameOptions>,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            max_colors: 256,
            delay_ms: 100,
            loops: 0,
            frame_options: Vec::new(),
        }
    }
}

impl AnimationOptions {
    /// Set the palette size ceiling.
    pub fn max_colors(mut self, max_colors: usize) -> Self {
        self.max_colors = max_colors;
        self
    }

    /// Set the default frame delay in milliseconds.
    pub fn delay_ms(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set the loop count (0 = forever).
    pub fn loops(mut self, loops: u16) -> Self {
        self.loops = loops;
        self
    }

    /// Set a frame's overrides by position.
    pub fn frame(mut self, index: usize, options: FrameOptions) -> Self {
        if self.frame_options.len() <= index {
            self.frame_options
                .resize_with(index + 1, FrameOptions::default);
        }
        self.frame_options[index] = options;
        self
    }
}

/// Quantize a truecolor image and serialize it as a single-frame GIF.
pub fn encode_static(image: &RgbaImage, options: &EncodeOptions) -> Result<Vec<u8>, GifError> {
    let quantizer = Quantizer::from_image(image, options.max_colors)?;
    let indexed = quantizer.map_image(image)?;

    let mut writer = GifWriter::new();
    writer.write_header()?;
    writer.write_logical_screen(
        image.width() as u32,
        image.height() as u32,
        Some(indexed.palette()),
        options.background,
        options.pixel_aspect,
    )?;
    writer.write_frame(&FrameSpec::new(&indexed))?;
    writer.finish()
}

/// Quantize frames against the first frame's palette and serialize them as
/// an animated GIF with a Netscape loop extension.
pub fn encode_animation(
    frames: &[RgbaImage],
    options: &AnimationOptions,
) -> Result<Vec<u8>, GifError> {
    let Some(first) = frames.first() else {
        return Err(ValidationError::NoFrames.into());
    };
    for (index, frame) in frames.iter().enumerate().skip(1) {
        if frame.width() != first.width() || frame.height() != first.height() {
            return Err(ValidationError::FrameSizeMismatch {
                index,
                expected_w: first.width(),
                expected_h: first.height(),
                actual_w: frame.width(),
                actual_h: frame.height(),
            }
            .into());
        }
    }

    let quantizer = Quantizer::from_image(first, options.max_colors)?;

    let mut writer = GifWriter::new();
    writer.write_header()?;
    writer.write_logical_screen(
        first.width() as u32,
        first.height() as u32,
        Some(quantizer.palette()),
        0,
        0,
    )?;
    writer.write_animation_info(options.loops)?;

    for (index, frame) in frames.iter().enumerate() {
        let indexed = quantizer.map_image(frame)?;
        let overrides = options.frame_options.get(index);
        let spec = FrameSpec {
            image: &indexed,
            left: 0,
            top: 0,
            delay_ms: overrides
                .and_then(|o| o.delay_ms)
                .unwrap_or(options.delay_ms),
            disposal: overrides.map_or(DisposalMethod::None, |o| o.disposal),
            transparent: overrides.and_then(|o| o.transparent),
        };
        writer.write_frame(&spec)?;
    }

    writer.finish()
}
