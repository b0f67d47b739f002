//! GIF color tables.
//!
//! A color table is an ordered sequence of 1..=256 RGB triplets. On the wire
//! it is padded with black to the next power of two and preceded by a 3-bit
//! size field `s` such that the serialized table holds exactly `2^(s+1)`
//! entries.

use crate::error::ValidationError;
use rgb::RGB8;

/// An ordered GIF color table of 1..=256 RGB colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<[u8; 3]>,
}

impl Palette {
    /// Build a palette from RGB triplets, validating the length bound.
    pub fn new(entries: Vec<[u8; 3]>) -> Result<Self, ValidationError> {
        if entries.is_empty() || entries.len() > 256 {
            return Err(ValidationError::PaletteSize(entries.len()));
        }
        Ok(Self { entries })
    }

    /// Parse a palette from flat `r g b` bytes, as read from a color table.
    ///
    /// `bytes.len()` must be a non-zero multiple of 3, at most 768.
    pub fn from_flat_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        if bytes.is_empty() || bytes.len() % 3 != 0 {
            return Err(ValidationError::PaletteSize(bytes.len() / 3));
        }
        Self::new(bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
    }

    /// Number of colors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; an empty palette cannot be constructed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The color triplets in palette order.
    pub fn entries(&self) -> &[[u8; 3]] {
        &self.entries
    }

    /// Color at `index`, if in range.
    pub fn get(&self, index: u8) -> Option<RGB8> {
        self.entries
            .get(index as usize)
            .map(|&[r, g, b]| RGB8 { r, g, b })
    }

    /// The GIF size field: the smallest `s` in 0..=7 with `2^(s+1) >= len`.
    pub fn size_field(&self) -> u8 {
        let mut s = 0u8;
        while (1usize << (s + 1)) < self.entries.len() {
            s += 1;
        }
        s
    }

    /// Number of entries in the serialized (padded) table: `2^(s+1)`.
    pub fn padded_len(&self) -> usize {
        1 << (self.size_field() + 1)
    }

    /// Serialize as `3 * 2^(s+1)` bytes, zero-padded past the real entries.
    pub fn padded_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.padded_len() * 3);
        for entry in &self.entries {
            out.extend_from_slice(entry);
        }
        out.resize(self.padded_len() * 3, 0);
        out
    }

    /// Index of the entry closest to `(r, g, b)` by squared Euclidean
    /// distance. Ties resolve to the lowest index.
    pub fn nearest(&self, r: u8, g: u8, b: u8) -> u8 {
        let mut best_idx = 0u8;
        let mut best_dist = u32::MAX;

        for (i, &[pr, pg, pb]) in self.entries.iter().enumerate() {
            let dr = r as i32 - pr as i32;
            let dg = g as i32 - pg as i32;
            let db = b as i32 - pb as i32;
            let dist = (dr * dr + dg * dg + db * db) as u32;
            if dist < best_dist {
                best_dist = dist;
                best_idx = i as u8;
                if dist == 0 {
                    break;
                }
            }
        }

        best_idx
    }

    /// Minimum LZW code size for this palette: `max(2, ceil(log2(len)))`.
    pub fn min_code_size(&self) -> u8 {
        let mut bits = 2u8;
        while (1usize << bits) < self.entries.len() {
            bits += 1;
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        assert!(Palette::new(vec![]).is_err());
        assert!(Palette::new(vec![[0, 0, 0]; 257]).is_err());
        assert!(Palette::new(vec![[0, 0, 0]; 256]).is_ok());
        assert!(Palette::new(vec![[1, 2, 3]]).is_ok());
    }

    #[test]
    fn test_size_field() {
        let sizes = [
            (1, 0),
            (2, 0),
            (3, 1),
            (4, 1),
            (5, 2),
            (16, 3),
            (17, 4),
            (128, 6),
            (129, 7),
            (256, 7),
        ];
        for (count, expected) in sizes {
            let pal = Palette::new(vec![[0, 0, 0]; count]).unwrap();
            assert_eq!(pal.size_field(), expected, "count {count}");
        }
    }

    #[test]
    fn test_padded_bytes_shape() {
        let pal = Palette::new(vec![[1, 2, 3], [4, 5, 6], [7, 8, 9]]).unwrap();
        let bytes = pal.padded_bytes();
        // 3 colors pad up to 4 entries.
        assert_eq!(bytes.len(), 3 * (1 << (pal.size_field() + 1)));
        assert_eq!(&bytes[..9], &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(bytes[9..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_flat_bytes_roundtrip() {
        let pal = Palette::new(vec![[10, 20, 30], [40, 50, 60]]).unwrap();
        let parsed = Palette::from_flat_bytes(&pal.padded_bytes()).unwrap();
        assert_eq!(parsed.entries()[..2], pal.entries()[..]);
    }

    #[test]
    fn test_flat_bytes_rejects_ragged() {
        assert!(Palette::from_flat_bytes(&[1, 2]).is_err());
        assert!(Palette::from_flat_bytes(&[]).is_err());
    }

    #[test]
    fn test_nearest() {
        let pal =
            Palette::new(vec![[0, 0, 0], [255, 0, 0], [0, 255, 0], [0, 0, 255]]).unwrap();
        assert_eq!(pal.nearest(0, 0, 0), 0);
        assert_eq!(pal.nearest(250, 5, 5), 1);
        assert_eq!(pal.nearest(10, 200, 10), 2);
        assert_eq!(pal.nearest(0, 0, 140), 3);
    }

    #[test]
    fn test_min_code_size() {
        for (count, expected) in [(2, 2), (4, 2), (5, 3), (8, 3), (9, 4), (64, 6), (256, 8)] {
            let pal = Palette::new(vec![[0, 0, 0]; count]).unwrap();
            assert_eq!(pal.min_code_size(), expected, "count {count}");
        }
    }
}
