//! GIF89a writer.
//!
//! [`GifWriter`] serializes into an owned byte vector and enforces the
//! container's strict record order with a runtime state guard:
//! header, logical screen, optional animation info, one or more frames,
//! trailer. Calls out of that order return
//! [`ValidationError::WriterState`].

use crate::screen::LogicalScreen;
use oxigif_core::color::Palette;
use oxigif_core::error::{GifError, ValidationError};
use oxigif_core::image::{DisposalMethod, IndexedImage, MAX_DIMENSION};
use oxigif_core::subblock;

/// GIF file signature plus the 89a version tag.
pub const GIF89A_SIGNATURE: &[u8; 6] = b"GIF89a";

/// Extension introducer byte.
pub const EXTENSION_INTRODUCER: u8 = 0x21;
/// Graphics control extension label.
pub const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;
/// Application extension label.
pub const APPLICATION_LABEL: u8 = 0xFF;
/// Comment extension label.
pub const COMMENT_LABEL: u8 = 0xFE;
/// Plain text extension label.
pub const PLAIN_TEXT_LABEL: u8 = 0x01;
/// Image descriptor separator.
pub const IMAGE_SEPARATOR: u8 = 0x2C;
/// Stream trailer byte.
pub const TRAILER: u8 = 0x3B;

/// Where the writer stands in the record sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Initial,
    HeaderWritten,
    ScreenWritten,
    AnimationWritten,
    FrameWritten,
    Finished,
}

impl WriterState {
    fn name(self) -> &'static str {
        match self {
            Self::Initial => "before the header",
            Self::HeaderWritten => "after the header",
            Self::ScreenWritten => "after the logical screen",
            Self::AnimationWritten => "after the animation info",
            Self::FrameWritten => "after a frame",
            Self::Finished => "finished",
        }
    }
}

/// One frame handed to [`GifWriter::write_frame`].
#[derive(Debug)]
pub struct FrameSpec<'a> {
    /// Quantized pixels and their palette (written as a local color table).
    pub image: &'a IndexedImage,
    /// Left edge of the frame on the logical screen.
    pub left: u16,
    /// Top edge of the frame on the logical screen.
    pub top: u16,
    /// Display duration in milliseconds (stored as centiseconds).
    pub delay_ms: u32,
    /// Disposal directive for this frame.
    pub disposal: DisposalMethod,
    /// Transparent palette index, if any.
    pub transparent: Option<u8>,
}

impl<'a> FrameSpec<'a> {
    /// A full-canvas frame at the origin with no control metadata.
    pub fn new(image: &'a IndexedImage) -> Self {
        Self {
            image,
            left: 0,
            top: 0,
            delay_ms: 0,
            disposal: DisposalMethod::None,
            transparent: None,
        }
    }

    fn carries_control_data(&self) -> bool {
        self.delay_ms > 0 || self.disposal != DisposalMethod::None || self.transparent.is_some()
    }
}

/// Serializer for the GIF89a container.
#[derive(Debug)]
pub struct GifWriter {
    output: Vec<u8>,
    state: WriterState,
    animated: bool,
}

impl Default for GifWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl GifWriter {
    /// Create a writer with an empty output buffer.
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            state: WriterState::Initial,
            animated: false,
        }
    }

    fn guard(&self, operation: &'static str, allowed: &[WriterState]) -> Result<(), GifError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ValidationError::WriterState {
                operation,
                state: self.state.name(),
            }
            .into())
        }
    }

    /// Emit the `GIF89a` signature.
    pub fn write_header(&mut self) -> Result<(), GifError> {
        self.guard("write the header", &[WriterState::Initial])?;
        self.output.extend_from_slice(GIF89A_SIGNATURE);
        self.state = WriterState::HeaderWritten;
        Ok(())
    }

    /// Emit the logical screen descriptor and the optional global color table.
    pub fn write_logical_screen(
        &mut self,
        width: u32,
        height: u32,
        global_palette: Option<&Palette>,
        background_index: u8,
        pixel_aspect: u8,
    ) -> Result<(), GifError> {
        self.guard("write the logical screen", &[WriterState::HeaderWritten])?;
        let width = check_dimension("canvas width", width)?;
        let height = check_dimension("canvas height", height)?;

        let screen = LogicalScreen {
            width,
            height,
            has_global_table: global_palette.is_some(),
            color_resolution: 0b111,
            sorted: false,
            table_size: global_palette.map_or(0, Palette::size_field),
            background_index,
            pixel_aspect,
        };
        screen.write(&mut self.output);

        if let Some(palette) = global_palette {
            self.output.extend_from_slice(&palette.padded_bytes());
        }

        self.state = WriterState::ScreenWritten;
        Ok(())
    }

    /// Emit the Netscape 2.0 looping extension. `loops` of 0 means forever.
    ///
    /// Calling this marks the stream as animated: every subsequent frame
    /// gets a graphics control extension even without control metadata.
    pub fn write_animation_info(&mut self, loops: u16) -> Result<(), GifError> {
        self.guard("write the animation info", &[WriterState::ScreenWritten])?;

        self.output.push(EXTENSION_INTRODUCER);
        self.output.push(APPLICATION_LABEL);
        self.output.push(11);
        self.output.extend_from_slice(b"NETSCAPE2.0");
        self.output.push(3);
        self.output.push(1);
        self.output.extend_from_slice(&loops.to_le_bytes());
        self.output.push(0);

        self.animated = true;
        self.state = WriterState::AnimationWritten;
        Ok(())
    }

    /// Emit one frame: graphics control (when needed), image descriptor,
    /// local color table, and LZW-compressed pixel data.
    pub fn write_frame(&mut self, frame: &FrameSpec<'_>) -> Result<(), GifError> {
        self.guard(
            "write a frame",
            &[
                WriterState::ScreenWritten,
                WriterState::AnimationWritten,
                WriterState::FrameWritten,
            ],
        )?;
        self.validate_frame(frame)?;

        if self.animated || frame.carries_control_data() {
            self.write_graphics_control(frame);
        }

        let image = frame.image;
        self.output.push(IMAGE_SEPARATOR);
        self.output.extend_from_slice(&frame.left.to_le_bytes());
        self.output.extend_from_slice(&frame.top.to_le_bytes());
        self.output.extend_from_slice(&image.width().to_le_bytes());
        self.output.extend_from_slice(&image.height().to_le_bytes());
        // Local color table always present; interlace and sort never set.
        self.output.push(0x80 | image.palette().size_field());
        self.output
            .extend_from_slice(&image.palette().padded_bytes());

        let min_code_size = image.palette().min_code_size();
        self.output.push(min_code_size);
        let compressed = oxigif_lzw::compress(image.indices(), min_code_size)?;
        subblock::write_blocks(&mut self.output, &compressed);

        self.state = WriterState::FrameWritten;
        Ok(())
    }

    /// Emit the trailer and yield the finished bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, GifError> {
        self.guard("finish", &[WriterState::FrameWritten])?;
        self.output.push(TRAILER);
        self.state = WriterState::Finished;
        Ok(self.output)
    }

    fn write_graphics_control(&mut self, frame: &FrameSpec<'_>) {
        let delay_cs = delay_to_centiseconds(frame.delay_ms);
        let packed =
            (frame.disposal.to_bits() & 0x07) << 2 | u8::from(frame.transparent.is_some());

        self.output.push(EXTENSION_INTRODUCER);
        self.output.push(GRAPHIC_CONTROL_LABEL);
        self.output.push(4);
        self.output.push(packed);
        self.output.extend_from_slice(&delay_cs.to_le_bytes());
        self.output.push(frame.transparent.unwrap_or(0));
        self.output.push(0);
    }

    fn validate_frame(&self, frame: &FrameSpec<'_>) -> Result<(), GifError> {
        // Pixel count, index range, and palette size were enforced when the
        // IndexedImage was built; here only the placement can go wrong.
        let right = frame.left as u32 + frame.image.width() as u32;
        let bottom = frame.top as u32 + frame.image.height() as u32;
        if right > MAX_DIMENSION {
            return Err(ValidationError::DimensionOutOfRange {
                field: "frame right edge",
                value: right,
            }
            .into());
        }
        if bottom > MAX_DIMENSION {
            return Err(ValidationError::DimensionOutOfRange {
                field: "frame bottom edge",
                value: bottom,
            }
            .into());
        }
        if let Some(transparent) = frame.transparent {
            if transparent as usize >= frame.image.palette().len() {
                return Err(ValidationError::IndexOutOfRange {
                    index: transparent,
                    palette_len: frame.image.palette().len(),
                }
                .into());
            }
        }
        Ok(())
    }
}

fn check_dimension(field: &'static str, value: u32) -> Result<u16, GifError> {
    if value == 0 || value > MAX_DIMENSION {
        return Err(ValidationError::DimensionOutOfRange { field, value }.into());
    }
    Ok(value as u16)
}

/// Convert a millisecond delay to GIF's centisecond unit, rounded and
/// clamped to the u16 field.
pub fn delay_to_centiseconds(delay_ms: u32) -> u16 {
    ((delay_ms as u64 + 5) / 10).min(u16::MAX as u64) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_image() -> IndexedImage {
        let palette = Palette::new(vec![[255, 0, 0], [0, 255, 0]]).unwrap();
        IndexedImage::new(2, 2, palette, vec![0, 1, 1, 0]).unwrap()
    }

    #[test]
    fn test_ordered_sequence_produces_signature_and_trailer() {
        let image = tiny_image();
        let mut writer = GifWriter::new();
        writer.write_header().unwrap();
        writer
            .write_logical_screen(2, 2, Some(image.palette()), 0, 0)
            .unwrap();
        writer.write_frame(&FrameSpec::new(&image)).unwrap();
        let bytes = writer.finish().unwrap();

        assert_eq!(&bytes[..6], b"GIF89a");
        assert_eq!(*bytes.last().unwrap(), TRAILER);
        // LE16 canvas dimensions.
        assert_eq!(&bytes[6..10], &[2, 0, 2, 0]);
    }

    #[test]
    fn test_out_of_order_calls_rejected() {
        let image = tiny_image();

        let mut writer = GifWriter::new();
        let err = writer.write_frame(&FrameSpec::new(&image)).unwrap_err();
        assert!(matches!(
            err,
            GifError::Validation(ValidationError::WriterState { .. })
        ));

        let mut writer = GifWriter::new();
        writer.write_header().unwrap();
        assert!(writer.write_header().is_err());
        assert!(writer.write_animation_info(0).is_err());
        assert!(writer.finish().is_err());
    }

    #[test]
    fn test_animation_info_only_before_frames() {
        let image = tiny_image();
        let mut writer = GifWriter::new();
        writer.write_header().unwrap();
        writer.write_logical_screen(2, 2, None, 0, 0).unwrap();
        writer.write_animation_info(0).unwrap();
        assert!(writer.write_animation_info(0).is_err());
        writer.write_frame(&FrameSpec::new(&image)).unwrap();
        assert!(writer.write_animation_info(0).is_err());
    }

    #[test]
    fn test_netscape_extension_bytes() {
        let mut writer = GifWriter::new();
        writer.write_header().unwrap();
        writer.write_logical_screen(2, 2, None, 0, 0).unwrap();
        writer.write_animation_info(7).unwrap();

        let bytes = &writer.output;
        let ext = &bytes[bytes.len() - 19..];
        assert_eq!(ext[0], EXTENSION_INTRODUCER);
        assert_eq!(ext[1], APPLICATION_LABEL);
        assert_eq!(ext[2], 11);
        assert_eq!(&ext[3..14], b"NETSCAPE2.0");
        assert_eq!(&ext[14..19], &[3, 1, 7, 0, 0]);
    }

    #[test]
    fn test_graphics_control_emitted_when_animated() {
        let image = tiny_image();
        let mut writer = GifWriter::new();
        writer.write_header().unwrap();
        writer.write_logical_screen(2, 2, None, 0, 0).unwrap();
        writer.write_animation_info(0).unwrap();
        let before = writer.output.len();
        writer.write_frame(&FrameSpec::new(&image)).unwrap();

        assert_eq!(writer.output[before], EXTENSION_INTRODUCER);
        assert_eq!(writer.output[before + 1], GRAPHIC_CONTROL_LABEL);
    }

    #[test]
    fn test_plain_static_frame_has_no_graphics_control() {
        let image = tiny_image();
        let mut writer = GifWriter::new();
        writer.write_header().unwrap();
        writer.write_logical_screen(2, 2, None, 0, 0).unwrap();
        let before = writer.output.len();
        writer.write_frame(&FrameSpec::new(&image)).unwrap();
        assert_eq!(writer.output[before], IMAGE_SEPARATOR);
    }

    #[test]
    fn test_frame_placement_validated() {
        let image = tiny_image();
        let mut writer = GifWriter::new();
        writer.write_header().unwrap();
        writer.write_logical_screen(2, 2, None, 0, 0).unwrap();

        let mut frame = FrameSpec::new(&image);
        frame.left = u16::MAX;
        assert!(writer.write_frame(&frame).is_err());

        let mut frame = FrameSpec::new(&image);
        frame.transparent = Some(2);
        assert!(writer.write_frame(&frame).is_err());
    }

    #[test]
    fn test_delay_rounding() {
        assert_eq!(delay_to_centiseconds(0), 0);
        assert_eq!(delay_to_centiseconds(4), 0);
        assert_eq!(delay_to_centiseconds(5), 1);
        assert_eq!(delay_to_centiseconds(100), 10);
        assert_eq!(delay_to_centiseconds(104), 10);
        assert_eq!(delay_to_centiseconds(105), 11);
        assert_eq!(delay_to_centiseconds(u32::MAX), u16::MAX);
    }
}
