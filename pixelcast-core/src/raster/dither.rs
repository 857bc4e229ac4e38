//! Ordered dithering
//!
//! Reduces an indexed greyscale frame to the two levels a monochrome
//! panel can show, using a 4×4 Bayer threshold matrix.

use crate::framebuffer::{FrameBuffer, PixelMode};

/// 4×4 Bayer matrix, values 0..16
const BAYER_4X4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Threshold for a pixel position on the 0..=255 scale
#[inline]
pub fn threshold(x: usize, y: usize) -> u8 {
    BAYER_4X4[y % 4][x % 4] * 16 + 8
}

/// Dither an indexed frame in place to indices {0, 1}
///
/// Paged frames are already binary and are left untouched.
pub fn ordered<B>(fb: &mut FrameBuffer<B>)
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    if fb.mode() != PixelMode::Indexed {
        return;
    }
    let width = fb.width();
    for (i, px) in fb.as_bytes_mut().iter_mut().enumerate() {
        let (x, y) = (i % width, i / width);
        *px = u8::from(*px > threshold(x, y));
    }
}
