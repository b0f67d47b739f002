//! CLI helpers: binary PPM glue and progress bars.

use std::error::Error;
use std::fs;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use oxigif_core::image::RgbaImage;

/// Write a frame as a binary PPM (P6). Alpha is dropped.
pub fn write_ppm(path: &Path, image: &RgbaImage) -> Result<(), Box<dyn Error>> {
    let mut out = format!("P6\n{} {}\n255\n", image.width(), image.height()).into_bytes();
    out.reserve(image.width() as usize * image.height() as usize * 3);
    for pixel in image.data().chunks_exact(4) {
        out.extend_from_slice(&pixel[..3]);
    }
    fs::write(path, out)?;
    Ok(())
}

/// Read a binary PPM (P6, 8-bit) as an opaque RGBA image.
pub fn read_ppm(path: &Path) -> Result<RgbaImage, Box<dyn Error>> {
    let data = fs::read(path)?;
    let mut parser = PpmParser { data: &data, pos: 0 };

    if parser.token()? != b"P6" {
        return Err(format!("{}: not a binary PPM (P6)", path.display()).into());
    }
    let width: u32 = parse_number(parser.token()?, path, "width")?;
    let height: u32 = parse_number(parser.token()?, path, "height")?;
    let maxval: u32 = parse_number(parser.token()?, path, "maxval")?;
    if maxval != 255 {
        return Err(format!("{}: only 8-bit PPM is supported", path.display()).into());
    }
    // A single whitespace byte separates the header from the raster.
    parser.pos += 1;

    let expected = width as usize * height as usize * 3;
    let Some(raster) = data.get(parser.pos..parser.pos + expected) else {
        return Err(format!("{}: truncated pixel data", path.display()).into());
    };

    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for pixel in raster.chunks_exact(3) {
        rgba.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 255]);
    }
    Ok(RgbaImage::new(width, height, rgba)?)
}

fn parse_number(token: &[u8], path: &Path, field: &str) -> Result<u32, Box<dyn Error>> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| format!("{}: invalid PPM {field}", path.display()).into())
}

struct PpmParser<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PpmParser<'a> {
    /// Next whitespace-delimited token, skipping `#` comment lines.
    fn token(&mut self) -> Result<&'a [u8], Box<dyn Error>> {
        loop {
            while self
                .data
                .get(self.pos)
                .is_some_and(|b| b.is_ascii_whitespace())
            {
                self.pos += 1;
            }
            if self.data.get(self.pos) == Some(&b'#') {
                while self.data.get(self.pos).is_some_and(|&b| b != b'\n') {
                    self.pos += 1;
                }
                continue;
            }
            break;
        }

        let start = self.pos;
        while self
            .data
            .get(self.pos)
            .is_some_and(|b| !b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err("unexpected end of PPM header".into());
        }
        Ok(&self.data[start..self.pos])
    }
}

/// Progress bar in the house style; hidden entirely when disabled.
pub fn create_progress_bar(len: u64, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("static template is valid"),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ppm_roundtrip() {
        let dir = std::env::temp_dir().join("oxigif-ppm-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.ppm");

        let image = RgbaImage::new(
            2,
            1,
            vec![10, 20, 30, 255, 200, 100, 50, 255],
        )
        .unwrap();
        write_ppm(&path, &image).unwrap();
        let back = read_ppm(&path).unwrap();
        assert_eq!(back.data(), image.data());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_ppm_header_comments() {
        let dir = std::env::temp_dir().join("oxigif-ppm-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("comments.ppm");

        let mut data = b"P6\n# a comment\n1 1\n255\n".to_vec();
        data.extend_from_slice(&[1, 2, 3]);
        std::fs::write(&path, data).unwrap();

        let image = read_ppm(&path).unwrap();
        assert_eq!(image.data(), &[1, 2, 3, 255]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_ppm_rejects_other_magic() {
        let dir = std::env::temp_dir().join("oxigif-ppm-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.ppm");
        std::fs::write(&path, b"P3\n1 1\n255\n1 2 3\n").unwrap();
        assert!(read_ppm(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
