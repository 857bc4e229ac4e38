//! Frame payload to image conversion

use std::io::Write;
use std::str::FromStr;

use anyhow::{bail, Result};
use pixelcast_protocol::unpack_bits;

/// How the frame payload is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// 1 bit per pixel in 8-row pages, bit 0 at the top (panel layout)
    Paged,
    /// 1 bit per pixel, row-major, MSB is the leftmost pixel
    Packed,
    /// One palette index byte per pixel, non-zero is lit
    Indexed,
}

impl Layout {
    /// Bits per pixel in the payload
    pub fn bits_per_pixel(self) -> u8 {
        match self {
            Layout::Paged | Layout::Packed => 1,
            Layout::Indexed => 8,
        }
    }
}

impl FromStr for Layout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "paged" => Ok(Layout::Paged),
            "packed" => Ok(Layout::Packed),
            "indexed" => Ok(Layout::Indexed),
            other => bail!("unknown layout '{}'", other),
        }
    }
}

/// Convert a payload to one 0/255 byte per pixel, row-major
pub fn to_grey(payload: &[u8], width: usize, height: usize, layout: Layout) -> Result<Vec<u8>> {
    let expected = width * height * layout.bits_per_pixel() as usize / 8;
    if payload.len() != expected {
        bail!(
            "{}x{} {:?} frame needs {} bytes, got {}",
            width,
            height,
            layout,
            expected,
            payload.len()
        );
    }

    let pixels = match layout {
        Layout::Packed => payload.iter().flat_map(|&b| unpack_bits(b)).collect(),
        Layout::Paged => {
            let mut pixels = Vec::with_capacity(width * height);
            for y in 0..height {
                for x in 0..width {
                    let byte = payload[x + (y / 8) * width];
                    pixels.push(if byte & (1 << (y % 8)) != 0 { 255 } else { 0 });
                }
            }
            pixels
        }
        Layout::Indexed => payload
            .iter()
            .map(|&b| if b != 0 { 255 } else { 0 })
            .collect(),
    };
    Ok(pixels)
}

/// Nearest-neighbour upscale by an integer factor
pub fn upscale(pixels: &[u8], width: usize, height: usize, factor: usize) -> Vec<u8> {
    if factor <= 1 {
        return pixels.to_vec();
    }
    let mut out = Vec::with_capacity(pixels.len() * factor * factor);
    for y in 0..height * factor {
        let row = &pixels[(y / factor) * width..][..width];
        for &px in row {
            out.extend(std::iter::repeat(px).take(factor));
        }
    }
    out
}

/// Write a binary greyscale PGM (P5) image
pub fn write_pgm<W: Write>(out: &mut W, pixels: &[u8], width: usize, height: usize) -> Result<()> {
    write!(out, "P5\n{} {}\n255\n", width, height)?;
    out.write_all(pixels)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_is_msb_first() {
        let grey = to_grey(&[0b1000_0001], 8, 1, Layout::Packed).unwrap();
        assert_eq!(grey, [255, 0, 0, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn test_paged_bit_is_row() {
        // 2 columns, 8 rows: column 0 lit at row 0, column 1 at row 7
        let grey = to_grey(&[0x01, 0x80], 2, 8, Layout::Paged).unwrap();
        assert_eq!(grey[0], 255);
        assert_eq!(grey[1], 0);
        assert_eq!(grey[7 * 2 + 1], 255);
        assert_eq!(grey.iter().filter(|&&p| p == 255).count(), 2);
    }

    #[test]
    fn test_length_checked() {
        assert!(to_grey(&[0; 3], 4, 4, Layout::Indexed).is_err());
    }

    #[test]
    fn test_upscale() {
        let big = upscale(&[1, 2], 2, 1, 2);
        assert_eq!(big, [1, 1, 2, 2, 1, 1, 2, 2]);
    }

    #[test]
    fn test_pgm_header() {
        let mut out = Vec::new();
        write_pgm(&mut out, &[0, 255], 2, 1).unwrap();
        assert_eq!(out, b"P5\n2 1\n255\n\x00\xff");
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("paged".parse::<Layout>().unwrap(), Layout::Paged);
        assert!("planar".parse::<Layout>().is_err());
    }
}
