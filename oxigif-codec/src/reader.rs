//! GIF stream reader.
//!
//! Parses GIF87a/GIF89a byte streams into typed records: logical screen,
//! extensions, and image data. Two views are exposed: [`read_info`] walks
//! the record structure without decompressing any pixels, and [`decode`]
//! runs the full LZW-plus-composition pipeline.

use tracing::{debug, warn};

use crate::compositor::{Compositor, FrameSource};
use crate::screen::LogicalScreen;
use crate::writer::{
    APPLICATION_LABEL, COMMENT_LABEL, EXTENSION_INTRODUCER, GRAPHIC_CONTROL_LABEL,
    IMAGE_SEPARATOR, PLAIN_TEXT_LABEL, TRAILER,
};
use oxigif_core::color::Palette;
use oxigif_core::error::{EncodingError, GifError};
use oxigif_core::image::{DisposalMethod, Frame};
use oxigif_core::subblock;

/// Stream-level metadata, available without touching pixel data.
#[derive(Debug, Clone)]
pub struct GifInfo {
    /// `"87a"` or `"89a"`.
    pub version: String,
    /// Logical screen width.
    pub width: u16,
    /// Logical screen height.
    pub height: u16,
    /// Number of image records.
    pub frame_count: usize,
    /// Sum of frame delays in milliseconds.
    pub duration_ms: u32,
    /// Netscape loop count; `Some(0)` means loop forever, `None` means the
    /// stream carried no looping extension.
    pub loop_count: Option<u16>,
    /// Background color index from the logical screen descriptor.
    pub background_index: u8,
    /// Pixel aspect ratio byte.
    pub pixel_aspect: u8,
    /// Sort flag from the logical screen descriptor.
    pub sorted: bool,
    /// Color resolution field from the logical screen descriptor.
    pub color_resolution: u8,
    /// Entry count of the global color table, if one is present.
    pub global_palette_len: Option<usize>,
    /// Identifiers of the extensions encountered, in stream order.
    pub extensions: Vec<String>,
    /// Comment extension texts.
    pub comments: Vec<String>,
    /// Concatenated XMP packet, if the stream carried one.
    pub xmp: Option<String>,
}

/// A fully decoded GIF: metadata plus composed frames.
#[derive(Debug)]
pub struct DecodedGif {
    /// Stream metadata.
    pub info: GifInfo,
    /// Full-canvas frames in presentation order.
    pub frames: Vec<Frame>,
    /// One entry per frame that decoded badly and was replaced with a
    /// placeholder.
    pub diagnostics: Vec<String>,
}

/// Parse stream metadata without decompressing pixel data.
pub fn read_info(data: &[u8]) -> Result<GifInfo, GifError> {
    let (info, _, _) = parse(data, false)?;
    Ok(info)
}

/// Decode the whole stream into composed full-canvas frames.
pub fn decode(data: &[u8]) -> Result<DecodedGif, GifError> {
    let (info, frames, diagnostics) = parse(data, true)?;
    Ok(DecodedGif {
        info,
        frames,
        diagnostics,
    })
}

/// Cached graphics-control fields, applied to the next image record.
#[derive(Debug, Clone, Copy, Default)]
struct GraphicsControl {
    delay_cs: u16,
    disposal: DisposalMethod,
    transparent: Option<u8>,
}

type ParseOutput = (GifInfo, Vec<Frame>, Vec<String>);

fn parse(data: &[u8], decode_pixels: bool) -> Result<ParseOutput, GifError> {
    // Signature plus logical screen descriptor.
    if data.len() < 6 + LogicalScreen::LEN {
        if data.len() >= 6 && (&data[..6] == b"GIF87a" || &data[..6] == b"GIF89a") {
            return Err(EncodingError::unexpected_eof(
                data.len(),
                6 + LogicalScreen::LEN - data.len(),
            )
            .into());
        }
        return Err(EncodingError::invalid_signature(data).into());
    }
    let version = match &data[..6] {
        b"GIF87a" => "87a",
        b"GIF89a" => "89a",
        _ => return Err(EncodingError::invalid_signature(data).into()),
    };

    let screen = LogicalScreen::parse(&data[6..6 + LogicalScreen::LEN])?;
    let mut pos = 6 + LogicalScreen::LEN;

    let global_palette = if screen.has_global_table {
        let len = screen.global_table_len();
        let Some(bytes) = data.get(pos..pos + len) else {
            return Err(EncodingError::unexpected_eof(pos, len).into());
        };
        pos += len;
        Some(Palette::from_flat_bytes(bytes).expect("table length is a positive multiple of 3"))
    } else {
        None
    };

    let mut info = GifInfo {
        version: version.to_string(),
        width: screen.width,
        height: screen.height,
        frame_count: 0,
        duration_ms: 0,
        loop_count: None,
        background_index: screen.background_index,
        pixel_aspect: screen.pixel_aspect,
        sorted: screen.sorted,
        color_resolution: screen.color_resolution,
        global_palette_len: global_palette.as_ref().map(Palette::len),
        extensions: Vec::new(),
        comments: Vec::new(),
        xmp: None,
    };

    let mut compositor = if decode_pixels {
        Some(Compositor::new(&screen, global_palette.as_ref()))
    } else {
        None
    };
    let mut frames = Vec::new();
    let mut diagnostics = Vec::new();
    let mut control: Option<GraphicsControl> = None;

    loop {
        let Some(&separator) = data.get(pos) else {
            debug!(offset = pos, "stream ended without trailer");
            break;
        };
        pos += 1;

        match separator {
            EXTENSION_INTRODUCER => {
                let Some(&label) = data.get(pos) else {
                    return Err(EncodingError::unexpected_eof(pos, 1).into());
                };
                pos += 1;
                pos = parse_extension(data, pos, label, &mut info, &mut control)?;
            }
            IMAGE_SEPARATOR => {
                pos = parse_image(
                    data,
                    pos,
                    global_palette.as_ref(),
                    control.take(),
                    compositor.as_mut(),
                    &mut info,
                    &mut frames,
                    &mut diagnostics,
                )?;
            }
            TRAILER => break,
            _ => {
                let offset = pos - 1;
                let start = offset.saturating_sub(8);
                let end = (offset + 8).min(data.len());
                return Err(EncodingError::unexpected_separator(
                    separator,
                    offset,
                    &data[start..end],
                )
                .into());
            }
        }
    }

    Ok((info, frames, diagnostics))
}

fn parse_extension(
    data: &[u8],
    mut pos: usize,
    label: u8,
    info: &mut GifInfo,
    control: &mut Option<GraphicsControl>,
) -> Result<usize, GifError> {
    match label {
        GRAPHIC_CONTROL_LABEL => {
            let (block, next) = subblock::collect_blocks(data, pos)?;
            if block.len() >= 4 {
                *control = Some(GraphicsControl {
                    delay_cs: u16::from_le_bytes([block[1], block[2]]),
                    disposal: DisposalMethod::from_packed(block[0]),
                    transparent: (block[0] & 0x01 != 0).then_some(block[3]),
                });
            } else {
                debug!(len = block.len(), "short graphics control block ignored");
            }
            pos = next;
        }
        APPLICATION_LABEL => {
            pos = parse_application_extension(data, pos, info)?;
        }
        COMMENT_LABEL => {
            let (text, next) = subblock::collect_blocks(data, pos)?;
            info.comments
                .push(String::from_utf8_lossy(&text).into_owned());
            pos = next;
        }
        PLAIN_TEXT_LABEL => {
            // The 12-byte grid block is itself sub-block framed.
            debug!("skipping plain text extension");
            pos = subblock::skip_blocks(data, pos)?;
        }
        other => {
            debug!(label = other, "skipping unknown extension");
            info.extensions.push(format!("0x{other:02X}"));
            pos = subblock::skip_blocks(data, pos)?;
        }
    }
    Ok(pos)
}

fn parse_application_extension(
    data: &[u8],
    pos: usize,
    info: &mut GifInfo,
) -> Result<usize, GifError> {
    // The identifier travels as the first sub-block, conventionally 11 bytes.
    let Some(&id_len) = data.get(pos) else {
        return Err(EncodingError::unexpected_eof(pos, 1).into());
    };
    if id_len != 11 {
        debug!(id_len, "application extension with nonstandard identifier");
        info.extensions.push("0xFF".to_string());
        return Ok(subblock::skip_blocks(data, pos)?);
    }
    let Some(identifier) = data.get(pos + 1..pos + 12) else {
        return Err(EncodingError::unexpected_eof(pos + 1, 11).into());
    };
    let name = String::from_utf8_lossy(identifier).into_owned();
    debug!(identifier = %name, "application extension");
    info.extensions.push(name);
    let rest = pos + 12;

    match identifier {
        b"NETSCAPE2.0" | b"ANIMEXTS1.0" => {
            let (payload, next) = subblock::collect_blocks(data, rest)?;
            if payload.len() >= 3 && payload[0] == 1 {
                info.loop_count = Some(u16::from_le_bytes([payload[1], payload[2]]));
            }
            Ok(next)
        }
        b"XMP DataXMP" => {
            let (payload, next) = subblock::collect_blocks(data, rest)?;
            info.xmp = Some(String::from_utf8_lossy(&payload).into_owned());
            Ok(next)
        }
        // Recognized identifiers are already logged; their payloads carry
        // nothing this decoder consumes.
        _ => Ok(subblock::skip_blocks(data, rest)?),
    }
}

#[allow(clippy::too_many_arguments)]
fn parse_image(
    data: &[u8],
    mut pos: usize,
    global_palette: Option<&Palette>,
    control: Option<GraphicsControl>,
    compositor: Option<&mut Compositor>,
    info: &mut GifInfo,
    frames: &mut Vec<Frame>,
    diagnostics: &mut Vec<String>,
) -> Result<usize, GifError> {
    let Some(descriptor) = data.get(pos..pos + 9) else {
        return Err(EncodingError::unexpected_eof(pos, 9).into());
    };
    let left = u16::from_le_bytes([descriptor[0], descriptor[1]]);
    let top = u16::from_le_bytes([descriptor[2], descriptor[3]]);
    let width = u16::from_le_bytes([descriptor[4], descriptor[5]]);
    let height = u16::from_le_bytes([descriptor[6], descriptor[7]]);
    let packed = descriptor[8];
    pos += 9;

    let has_local_table = packed & 0x80 != 0;
    let interlaced = packed & 0x40 != 0;
    let local_table_size = packed & 0x07;

    let local_palette = if has_local_table {
        let len = 3 * (1usize << (local_table_size + 1));
        let Some(bytes) = data.get(pos..pos + len) else {
            return Err(EncodingError::unexpected_eof(pos, len).into());
        };
        pos += len;
        Some(Palette::from_flat_bytes(bytes).expect("table length is a positive multiple of 3"))
    } else {
        None
    };

    let Some(&min_code_size) = data.get(pos) else {
        return Err(EncodingError::unexpected_eof(pos, 1).into());
    };
    pos += 1;

    let control = control.unwrap_or_default();
    let delay_ms = control.delay_cs as u32 * 10;
    info.frame_count += 1;
    info.duration_ms += delay_ms;

    let Some(compositor) = compositor else {
        // Metadata-only pass: step over the pixel data.
        return Ok(subblock::skip_blocks(data, pos)?);
    };

    let (compressed, next) = subblock::collect_blocks(data, pos)?;
    let pixel_count = width as usize * height as usize;
    let palette = local_palette.as_ref().or(global_palette);

    let frame = match palette {
        Some(palette) => match oxigif_lzw::decompress(&compressed, min_code_size, pixel_count) {
            Ok(indices) => compositor.compose(FrameSource {
                rect: (left, top, width, height),
                indices: &indices,
                palette,
                interlaced,
                transparent: control.transparent,
                delay_ms,
                disposal: control.disposal,
            }),
            Err(err) => {
                warn!(frame = info.frame_count, %err, "corrupt frame replaced with placeholder");
                diagnostics.push(format!("frame {}: {err}", info.frame_count));
                compositor.compose_placeholder((left, top, width, height), delay_ms, control.disposal)
            }
        },
        None => {
            warn!(
                frame = info.frame_count,
                "frame has no color table, replaced with placeholder"
            );
            diagnostics.push(format!("frame {}: no color table", info.frame_count));
            compositor.compose_placeholder((left, top, width, height), delay_ms, control.disposal)
        }
    };
    frames.push(frame);

    Ok(next)
}
