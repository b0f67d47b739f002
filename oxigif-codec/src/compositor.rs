//! Canvas composition of decoded image records.
//!
//! GIF frames are sub-rectangle patches over a persistent logical screen.
//! The compositor owns that screen, applies each frame's predecessor
//! disposal before drawing, and hands out full-canvas snapshots as
//! independent [`Frame`] records.

use crate::screen::LogicalScreen;
use oxigif_core::color::Palette;
use oxigif_core::image::{DisposalMethod, Frame, RgbaImage};

/// One decoded image record ready for composition.
#[derive(Debug)]
pub struct FrameSource<'a> {
    /// Sub-rectangle `(left, top, width, height)` on the logical screen.
    pub rect: (u16, u16, u16, u16),
    /// Decompressed palette indices, `width * height` of them.
    pub indices: &'a [u8],
    /// The frame's color table (local, or the global fallback).
    pub palette: &'a Palette,
    /// Whether the rows arrive in GIF's four-pass interlaced order.
    pub interlaced: bool,
    /// Transparent index: matching pixels leave the canvas untouched.
    pub transparent: Option<u8>,
    /// Display duration in milliseconds.
    pub delay_ms: u32,
    /// Disposal directive carried by this frame.
    pub disposal: DisposalMethod,
}

/// The persistent canvas and the disposal state machine around it.
#[derive(Debug)]
pub struct Compositor {
    width: u16,
    height: u16,
    canvas: Vec<u8>,
    background: [u8; 4],
    snapshot: Option<Vec<u8>>,
    prev_rect: (u16, u16, u16, u16),
    prev_disposal: DisposalMethod,
}

impl Compositor {
    /// Create a canvas for the logical screen, filled with the background
    /// color when a global palette supplies one, transparent otherwise.
    pub fn new(screen: &LogicalScreen, global_palette: Option<&Palette>) -> Self {
        let background = global_palette
            .and_then(|p| p.get(screen.background_index))
            .map_or([0, 0, 0, 0], |c| [c.r, c.g, c.b, 255]);

        // A degenerate descriptor still gets a 1x1 canvas; frames clip to it.
        let width = screen.width.max(1);
        let height = screen.height.max(1);
        let pixels = width as usize * height as usize;
        let mut canvas = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            canvas.extend_from_slice(&background);
        }

        Self {
            width,
            height,
            canvas,
            background,
            snapshot: None,
            prev_rect: (0, 0, 0, 0),
            prev_disposal: DisposalMethod::None,
        }
    }

    /// Compose one frame onto the canvas and emit its record.
    pub fn compose(&mut self, source: FrameSource<'_>) -> Frame {
        self.apply_previous_disposal();
        if source.disposal == DisposalMethod::Previous {
            self.snapshot = Some(self.canvas.clone());
        }

        let (left, top, width, height) = source.rect;
        let deinterlaced;
        let indices = if source.interlaced {
            deinterlaced = deinterlace(source.indices, width as usize, height as usize);
            &deinterlaced[..]
        } else {
            source.indices
        };

        for y in 0..height {
            let dst_y = top as u32 + y as u32;
            if dst_y >= self.height as u32 {
                break;
            }
            for x in 0..width {
                let dst_x = left as u32 + x as u32;
                if dst_x >= self.width as u32 {
                    break;
                }
                let Some(&index) = indices.get(y as usize * width as usize + x as usize) else {
                    continue;
                };
                if source.transparent == Some(index) {
                    continue;
                }
                let Some(color) = source.palette.get(index) else {
                    continue;
                };
                let offset = (dst_y as usize * self.width as usize + dst_x as usize) * 4;
                self.canvas[offset..offset + 4].copy_from_slice(&[color.r, color.g, color.b, 255]);
            }
        }

        self.finish_frame(source.rect, source.delay_ms, source.disposal, source.transparent)
    }

    /// Emit a white placeholder for a frame whose pixel data was corrupt,
    /// keeping the disposal state machine consistent.
    pub fn compose_placeholder(
        &mut self,
        rect: (u16, u16, u16, u16),
        delay_ms: u32,
        disposal: DisposalMethod,
    ) -> Frame {
        self.apply_previous_disposal();
        if disposal == DisposalMethod::Previous {
            self.snapshot = Some(self.canvas.clone());
        }

        let (left, top, width, height) = rect;
        for y in 0..height {
            let dst_y = top as u32 + y as u32;
            if dst_y >= self.height as u32 {
                break;
            }
            for x in 0..width {
                let dst_x = left as u32 + x as u32;
                if dst_x >= self.width as u32 {
                    break;
                }
                let offset = (dst_y as usize * self.width as usize + dst_x as usize) * 4;
                self.canvas[offset..offset + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }

        self.finish_frame(rect, delay_ms, disposal, None)
    }

    fn apply_previous_disposal(&mut self) {
        match self.prev_disposal {
            DisposalMethod::None | DisposalMethod::Keep => {}
            DisposalMethod::Background => {
                let (left, top, width, height) = self.prev_rect;
                for y in 0..height {
                    let dst_y = top as u32 + y as u32;
                    if dst_y >= self.height as u32 {
                        break;
                    }
                    for x in 0..width {
                        let dst_x = left as u32 + x as u32;
                        if dst_x >= self.width as u32 {
                            break;
                        }
                        let offset =
                            (dst_y as usize * self.width as usize + dst_x as usize) * 4;
                        self.canvas[offset..offset + 4].copy_from_slice(&self.background);
                    }
                }
            }
            DisposalMethod::Previous => {
                if let Some(snapshot) = &self.snapshot {
                    self.canvas.copy_from_slice(snapshot);
                }
            }
        }
    }

    fn finish_frame(
        &mut self,
        rect: (u16, u16, u16, u16),
        delay_ms: u32,
        disposal: DisposalMethod,
        transparent: Option<u8>,
    ) -> Frame {
        self.prev_rect = rect;
        self.prev_disposal = disposal;

        let image = RgbaImage::new(self.width as u32, self.height as u32, self.canvas.clone())
            .expect("canvas matches the logical screen");
        Frame {
            image,
            delay_ms,
            disposal,
            rect,
            transparent,
        }
    }
}

/// Reorder interlaced rows into natural order.
///
/// The four passes cover rows `{0, 8, 16, ...}`, `{4, 12, ...}`,
/// `{2, 6, 10, ...}`, `{1, 3, 5, ...}`.
pub fn deinterlace(indices: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut output = vec![0u8; width * height];
    let mut src_row = 0usize;

    for (start, step) in [(0usize, 8usize), (4, 8), (2, 4), (1, 2)] {
        for y in (start..height).step_by(step) {
            let src = src_row * width;
            if src + width <= indices.len() {
                output[y * width..(y + 1) * width].copy_from_slice(&indices[src..src + width]);
            }
            src_row += 1;
        }
    }

    output
}
