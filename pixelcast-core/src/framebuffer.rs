//! Framebuffer store
//!
//! One buffer per firmware, owned by the frame loop. The rasterizer
//! writes it, then the display adapter and the debug mirror read the
//! same bytes in turn. Storage is supplied by the caller (usually a
//! `StaticCell` array) so the buffer never touches the heap.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::{Gray8, GrayColor};
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Point, Size};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rows per panel page in [`PixelMode::Paged`]
pub const PAGE_HEIGHT: usize = 8;

/// Memory layout of the framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PixelMode {
    /// One palette index byte per pixel, row-major
    #[default]
    Indexed,
    /// One bit per pixel in 8-row pages, the panel driver's own layout
    ///
    /// Byte `x + (y / 8) * width` holds column `x` of page `y / 8`;
    /// bit `y % 8` is the pixel.
    Paged,
}

impl PixelMode {
    /// Bytes needed for a `width × height` frame
    pub const fn buffer_len(self, width: usize, height: usize) -> usize {
        match self {
            PixelMode::Indexed => width * height,
            PixelMode::Paged => width * (height / PAGE_HEIGHT),
        }
    }

    /// Bits stored per pixel
    pub const fn bits_per_pixel(self) -> u8 {
        match self {
            PixelMode::Indexed => 8,
            PixelMode::Paged => 1,
        }
    }

    /// Read a pixel from raw bytes in this layout
    #[inline]
    fn read(self, bytes: &[u8], width: usize, x: usize, y: usize) -> u8 {
        match self {
            PixelMode::Indexed => bytes[x + y * width],
            PixelMode::Paged => {
                let byte = bytes[x + (y / PAGE_HEIGHT) * width];
                (byte >> (y % PAGE_HEIGHT)) & 1
            }
        }
    }
}

/// Errors from creating a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameBufferError {
    /// Storage is smaller than the layout requires
    InsufficientStorage { needed: usize, available: usize },
    /// Width or height is zero
    ZeroDimension,
    /// Paged layout needs a height that is a multiple of 8
    UnalignedPages,
}

/// Indexed pixel grid over caller-provided storage
pub struct FrameBuffer<B> {
    storage: B,
    width: usize,
    height: usize,
    mode: PixelMode,
    len: usize,
    generation: u32,
}

impl<B> FrameBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Bind `storage` as a zeroed `width × height` framebuffer
    pub fn new(
        mut storage: B,
        width: usize,
        height: usize,
        mode: PixelMode,
    ) -> Result<Self, FrameBufferError> {
        if width == 0 || height == 0 {
            return Err(FrameBufferError::ZeroDimension);
        }
        if mode == PixelMode::Paged && height % PAGE_HEIGHT != 0 {
            return Err(FrameBufferError::UnalignedPages);
        }

        let available = storage.as_ref().len();
        let len = match width.checked_mul(height) {
            Some(_) => mode.buffer_len(width, height),
            None => usize::MAX,
        };
        if available < len {
            return Err(FrameBufferError::InsufficientStorage {
                needed: len,
                available,
            });
        }

        storage.as_mut()[..len].fill(0);

        Ok(Self {
            storage,
            width,
            height,
            mode,
            len,
            generation: 0,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Memory layout
    pub fn mode(&self) -> PixelMode {
        self.mode
    }

    /// Number of completed frames
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// The frame bytes, exactly `mode.buffer_len(width, height)` long
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage.as_ref()[..self.len]
    }

    /// Mutable frame bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.storage.as_mut()[..self.len]
    }

    #[inline]
    fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Read the pixel at `(x, y)`
    ///
    /// Paged buffers return 0 or 1. Out-of-range coordinates are a
    /// caller bug; they assert in debug builds and read as 0 otherwise.
    pub fn pixel_at(&self, x: usize, y: usize) -> u8 {
        debug_assert!(self.in_bounds(x, y), "pixel ({}, {}) out of range", x, y);
        if !self.in_bounds(x, y) {
            return 0;
        }
        self.mode.read(self.as_bytes(), self.width, x, y)
    }

    /// Write the pixel at `(x, y)`
    ///
    /// Paged buffers set the bit for any non-zero index. Out-of-range
    /// coordinates assert in debug builds and are ignored otherwise.
    pub fn set_pixel(&mut self, x: usize, y: usize, index: u8) {
        debug_assert!(self.in_bounds(x, y), "pixel ({}, {}) out of range", x, y);
        if !self.in_bounds(x, y) {
            return;
        }
        self.put(x, y, index);
    }

    /// Write without the debug assertion; caller has checked bounds
    #[inline]
    fn put(&mut self, x: usize, y: usize, index: u8) {
        let width = self.width;
        match self.mode {
            PixelMode::Indexed => self.as_bytes_mut()[x + y * width] = index,
            PixelMode::Paged => {
                let byte = &mut self.as_bytes_mut()[x + (y / PAGE_HEIGHT) * width];
                let mask = 1 << (y % PAGE_HEIGHT);
                if index != 0 {
                    *byte |= mask;
                } else {
                    *byte &= !mask;
                }
            }
        }
    }

    /// Zero every pixel
    pub fn clear(&mut self) {
        self.as_bytes_mut().fill(0);
    }

    /// Mark the current contents as a finished frame
    ///
    /// Returns the new generation. Readers compare generations to know
    /// they are looking at the same frame.
    pub fn commit(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Read-only view of the current frame
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            pixels: self.as_bytes(),
            width: self.width,
            height: self.height,
            mode: self.mode,
            generation: self.generation,
        }
    }

    /// Release the storage
    pub fn into_storage(self) -> B {
        self.storage
    }
}

impl<B> OriginDimensions for FrameBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl<B> DrawTarget for FrameBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = Gray8;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            if self.in_bounds(x, y) {
                self.put(x, y, color.luma());
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = match self.mode {
            PixelMode::Indexed => color.luma(),
            PixelMode::Paged if color.luma() != 0 => 0xFF,
            PixelMode::Paged => 0x00,
        };
        self.as_bytes_mut().fill(fill);
        Ok(())
    }
}

/// Read-only snapshot handed to sinks
///
/// Only [`FrameBuffer::view`] builds one, so `pixels` always holds
/// exactly `mode.buffer_len(width, height)` bytes.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pixels: &'a [u8],
    width: usize,
    height: usize,
    mode: PixelMode,
    generation: u32,
}

impl<'a> FrameView<'a> {
    /// Frame bytes in [`Self::mode`] layout
    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Memory layout of the bytes
    pub fn mode(&self) -> PixelMode {
        self.mode
    }

    /// Generation of the frame this view belongs to
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Read the pixel at `(x, y)`, or 0 when out of range
    pub fn pixel_at(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.mode.read(self.pixels, self.width, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_new_zeroes_storage() {
        let fb = FrameBuffer::new([0xAAu8; 32], 8, 4, PixelMode::Indexed).unwrap();
        assert_eq!(fb.as_bytes().len(), 32);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_insufficient_storage() {
        let result = FrameBuffer::new([0u8; 16], 8, 4, PixelMode::Indexed);
        assert_eq!(
            result.err(),
            Some(FrameBufferError::InsufficientStorage {
                needed: 32,
                available: 16
            })
        );
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert_eq!(
            FrameBuffer::new([0u8; 8], 0, 4, PixelMode::Indexed).err(),
            Some(FrameBufferError::ZeroDimension)
        );
        assert_eq!(
            FrameBuffer::new([0u8; 64], 8, 12, PixelMode::Paged).err(),
            Some(FrameBufferError::UnalignedPages)
        );
    }

    #[test]
    fn test_larger_storage_exposes_exact_length() {
        let fb = FrameBuffer::new([0u8; 100], 4, 4, PixelMode::Indexed).unwrap();
        assert_eq!(fb.as_bytes().len(), 16);
    }

    #[test]
    fn test_indexed_pixels() {
        let mut fb = FrameBuffer::new([0u8; 12], 4, 3, PixelMode::Indexed).unwrap();
        fb.set_pixel(3, 2, 7);
        assert_eq!(fb.pixel_at(3, 2), 7);
        assert_eq!(fb.as_bytes()[11], 7);
    }

    #[test]
    fn test_paged_layout() {
        let mut fb = FrameBuffer::new([0u8; 64], 32, 16, PixelMode::Paged).unwrap();
        assert_eq!(fb.as_bytes().len(), 64);

        fb.set_pixel(5, 0, 1);
        fb.set_pixel(5, 9, 200);
        assert_eq!(fb.as_bytes()[5], 0b0000_0001);
        assert_eq!(fb.as_bytes()[32 + 5], 0b0000_0010);
        assert_eq!(fb.pixel_at(5, 9), 1);

        fb.set_pixel(5, 9, 0);
        assert_eq!(fb.pixel_at(5, 9), 0);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_out_of_range_ignored() {
        let mut fb = FrameBuffer::new([0u8; 4], 2, 2, PixelMode::Indexed).unwrap();
        fb.set_pixel(2, 0, 1);
        assert_eq!(fb.pixel_at(2, 0), 0);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_out_of_range_asserts() {
        let mut fb = FrameBuffer::new([0u8; 4], 2, 2, PixelMode::Indexed).unwrap();
        fb.set_pixel(2, 0, 1);
    }

    #[test]
    fn test_commit_bumps_generation() {
        let mut fb = FrameBuffer::new([0u8; 4], 2, 2, PixelMode::Indexed).unwrap();
        assert_eq!(fb.view().generation(), 0);
        assert_eq!(fb.commit(), 1);
        assert_eq!(fb.view().generation(), 1);
    }

    #[test]
    fn test_draw_target_clips() {
        let mut fb = FrameBuffer::new([0u8; 16], 4, 4, PixelMode::Indexed).unwrap();
        Rectangle::new(Point::new(-2, 2), Size::new(10, 10))
            .into_styled(PrimitiveStyle::with_fill(Gray8::new(9)))
            .draw(&mut fb)
            .unwrap();

        assert_eq!(fb.pixel_at(0, 1), 0);
        assert_eq!(fb.pixel_at(0, 2), 9);
        assert_eq!(fb.pixel_at(3, 3), 9);
    }

    #[test]
    fn test_view_matches_buffer() {
        let mut fb = FrameBuffer::new([0u8; 8], 8, 8, PixelMode::Paged).unwrap();
        fb.set_pixel(7, 7, 1);
        let view = fb.view();
        assert_eq!(view.pixels().len(), 8);
        assert_eq!(view.pixel_at(7, 7), 1);
        assert_eq!(view.pixel_at(8, 0), 0);
    }

    #[test]
    fn test_view_length_follows_layout() {
        // Oversized storage never leaks into the view
        let fb = FrameBuffer::new([0u8; 64], 4, 8, PixelMode::Paged).unwrap();
        let view = fb.view();
        assert_eq!((view.width(), view.height()), (4, 8));
        assert_eq!(view.mode(), PixelMode::Paged);
        assert_eq!(view.pixels().len(), PixelMode::Paged.buffer_len(4, 8));
        assert_eq!(view.pixel_at(3, 7), 0);

        let fb = FrameBuffer::new([0u8; 64], 4, 8, PixelMode::Indexed).unwrap();
        assert_eq!(fb.view().pixels().len(), 32);
        assert_eq!(fb.view().generation(), 0);
    }
}
