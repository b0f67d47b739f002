//! # OxiGIF Quant
//!
//! Median-cut color quantization: reduces a truecolor image (or a set of
//! animation frames sharing one palette) to at most 256 indexed colors.
//!
//! The cut runs over the distinct colors of the training image, weighting
//! channel ranges perceptually (red 1.0, green 0.8, blue 0.5) so blue
//! variation splits last. Pixels whose exact color was in the training set
//! map through a lookup table; anything else falls back to the nearest
//! palette entry by squared Euclidean distance, which is what lets one
//! frame's palette serve a whole animation.
//!
//! ## Example
//!
//! ```rust
//! use oxigif_core::RgbaImage;
//! use oxigif_quant::quantize;
//!
//! let image = RgbaImage::filled(4, 4, [200, 40, 40, 255]).unwrap();
//! let indexed = quantize(&image, 16).unwrap();
//! assert_eq!(indexed.palette().len(), 1);
//! assert!(indexed.indices().iter().all(|&i| i == 0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod median_cut;

use std::collections::{HashMap, HashSet};

use oxigif_core::color::Palette;
use oxigif_core::error::ValidationError;
use oxigif_core::image::{IndexedImage, RgbaImage};
use rgb::RGBA8;

/// A trained palette plus the color-to-index mapping that produced it.
///
/// Build one with [`Quantizer::from_image`] (or [`Quantizer::from_pixels`]),
/// then run any number of images through [`Quantizer::map_image`]. Animated
/// encoding trains on the first frame and maps the rest through the same
/// instance.
#[derive(Debug)]
pub struct Quantizer {
    palette: Palette,
    exact: HashMap<[u8; 3], u8>,
}

impl Quantizer {
    /// Train a quantizer on the distinct colors of `image`.
    pub fn from_image(image: &RgbaImage, max_colors: usize) -> Result<Self, ValidationError> {
        Self::from_rgba_bytes(image.data(), max_colors)
    }

    /// Train a quantizer on RGBA pixels.
    pub fn from_pixels(pixels: &[RGBA8], max_colors: usize) -> Result<Self, ValidationError> {
        let mut quantizer = Self::empty(max_colors)?;
        quantizer.train(pixels.iter().map(|p| [p.r, p.g, p.b]), max_colors);
        Ok(quantizer)
    }

    fn from_rgba_bytes(data: &[u8], max_colors: usize) -> Result<Self, ValidationError> {
        let mut quantizer = Self::empty(max_colors)?;
        quantizer.train(
            data.chunks_exact(4).map(|p| [p[0], p[1], p[2]]),
            max_colors,
        );
        Ok(quantizer)
    }

    fn empty(max_colors: usize) -> Result<Self, ValidationError> {
        if max_colors == 0 || max_colors > 256 {
            return Err(ValidationError::InvalidMaxColors(max_colors));
        }
        Ok(Self {
            palette: Palette::new(vec![[0, 0, 0]]).expect("single-entry palette is valid"),
            exact: HashMap::new(),
        })
    }

    fn train(&mut self, colors: impl Iterator<Item = [u8; 3]>, max_colors: usize) {
        // Distinct colors in first-seen order.
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for color in colors {
            if seen.insert(color) {
                unique.push(color);
            }
        }
        if unique.is_empty() {
            unique.push([0, 0, 0]);
        }

        let boxes = median_cut::partition(unique, max_colors);

        let mut entries = Vec::with_capacity(boxes.len());
        self.exact = HashMap::new();
        for (index, (mean, members)) in boxes.into_iter().enumerate() {
            entries.push(mean);
            for color in members {
                self.exact.insert(color, index as u8);
            }
        }
        self.palette = Palette::new(entries).expect("median cut yields 1..=256 boxes");
    }

    /// The palette the training pass produced.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Index for one color: exact training-set hit, else nearest neighbor.
    pub fn index_of(&self, r: u8, g: u8, b: u8) -> u8 {
        match self.exact.get(&[r, g, b]) {
            Some(&index) => index,
            None => self.palette.nearest(r, g, b),
        }
    }

    /// Map an image through the trained palette.
    pub fn map_image(&self, image: &RgbaImage) -> Result<IndexedImage, ValidationError> {
        let indices: Vec<u8> = image
            .data()
            .chunks_exact(4)
            .map(|p| self.index_of(p[0], p[1], p[2]))
            .collect();
        IndexedImage::new(
            image.width() as u32,
            image.height() as u32,
            self.palette.clone(),
            indices,
        )
    }
}

/// Quantize an image to at most `max_colors` colors in one call.
pub fn quantize(image: &RgbaImage, max_colors: usize) -> Result<IndexedImage, ValidationError> {
    Quantizer::from_image(image, max_colors)?.map_image(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_from_pixels(width: u32, height: u32, pixels: &[[u8; 4]]) -> RgbaImage {
        let data: Vec<u8> = pixels.iter().flatten().copied().collect();
        RgbaImage::new(width, height, data).unwrap()
    }

    #[test]
    fn test_corner_colors_get_distinct_indices() {
        // Four distinct colors at max_colors 4: palette of exactly 4, and
        // the index buffer is a permutation of 0..4.
        let image = image_from_pixels(
            2,
            2,
            &[
                [255, 0, 0, 255],
                [0, 255, 0, 255],
                [0, 0, 255, 255],
                [255, 255, 0, 255],
            ],
        );
        let indexed = quantize(&image, 4).unwrap();
        assert_eq!(indexed.palette().len(), 4);

        let mut indices = indexed.indices().to_vec();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_few_colors_pass_through_exactly() {
        let image = image_from_pixels(
            2,
            1,
            &[[10, 20, 30, 255], [200, 100, 50, 255]],
        );
        let indexed = quantize(&image, 256).unwrap();
        assert_eq!(indexed.palette().len(), 2);
        let p0 = indexed.palette().entries()[indexed.indices()[0] as usize];
        let p1 = indexed.palette().entries()[indexed.indices()[1] as usize];
        assert_eq!(p0, [10, 20, 30]);
        assert_eq!(p1, [200, 100, 50]);
    }

    #[test]
    fn test_reduction_caps_palette() {
        // A 16x16 grid of 256 distinct colors squeezed to 8.
        let pixels: Vec<[u8; 4]> = (0..256u32)
            .map(|i| [(i % 16 * 17) as u8, (i / 16 * 17) as u8, (i % 7 * 36) as u8, 255])
            .collect();
        let image = image_from_pixels(16, 16, &pixels);
        let indexed = quantize(&image, 8).unwrap();
        assert!(indexed.palette().len() <= 8);
        assert!(indexed
            .indices()
            .iter()
            .all(|&i| (i as usize) < indexed.palette().len()));
    }

    #[test]
    fn test_shared_palette_maps_unseen_colors() {
        let first = image_from_pixels(2, 1, &[[255, 0, 0, 255], [0, 0, 255, 255]]);
        let quantizer = Quantizer::from_image(&first, 4).unwrap();

        // A color the training frame never saw maps to its nearest entry.
        let second = image_from_pixels(2, 1, &[[250, 10, 10, 255], [10, 10, 250, 255]]);
        let indexed = quantizer.map_image(&second).unwrap();
        let entries = indexed.palette().entries();
        assert_eq!(entries[indexed.indices()[0] as usize], [255, 0, 0]);
        assert_eq!(entries[indexed.indices()[1] as usize], [0, 0, 255]);
    }

    #[test]
    fn test_max_colors_bounds() {
        let image = RgbaImage::filled(1, 1, [0, 0, 0, 255]).unwrap();
        assert!(matches!(
            quantize(&image, 0),
            Err(ValidationError::InvalidMaxColors(0))
        ));
        assert!(matches!(
            quantize(&image, 257),
            Err(ValidationError::InvalidMaxColors(257))
        ));
        assert!(quantize(&image, 1).is_ok());
    }

    #[test]
    fn test_alpha_is_ignored_for_training() {
        let image = image_from_pixels(2, 1, &[[50, 60, 70, 0], [50, 60, 70, 255]]);
        let indexed = quantize(&image, 256).unwrap();
        assert_eq!(indexed.palette().len(), 1);
    }
}
