//! Panel driver trait
//!
//! Defines the interface the display adapter needs from a page-buffer
//! panel driver.

/// Page-buffer panel driver
///
/// A driver owns a buffer in the panel's native page layout that
/// `draw_pixel` writes and `send_buffer` transfers. `send_shared`
/// transfers caller-owned bytes in the same layout instead, so a
/// framebuffer laid out as pages can be sent without a copy.
pub trait Panel {
    /// Bus error type
    type Error;

    /// Reset and configure the controller
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Clear the driver's own buffer (no bus traffic)
    fn clear_buffer(&mut self);

    /// Set the pixel at `(x, y)` in the driver's own buffer
    fn draw_pixel(&mut self, x: usize, y: usize);

    /// Transfer the driver's own buffer to the panel
    fn send_buffer(&mut self) -> Result<(), Self::Error>;

    /// Transfer `pages` to the panel
    ///
    /// `pages` must hold `width * height / 8` bytes in page layout: byte
    /// `x + (y / 8) * width`, bit `y % 8`.
    fn send_shared(&mut self, pages: &[u8]) -> Result<(), Self::Error>;

    /// Panel size in pixels as `(width, height)`
    fn dimensions(&self) -> (usize, usize);
}

impl<P: Panel + ?Sized> Panel for &mut P {
    type Error = P::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        (**self).init()
    }

    fn clear_buffer(&mut self) {
        (**self).clear_buffer()
    }

    fn draw_pixel(&mut self, x: usize, y: usize) {
        (**self).draw_pixel(x, y)
    }

    fn send_buffer(&mut self) -> Result<(), Self::Error> {
        (**self).send_buffer()
    }

    fn send_shared(&mut self, pages: &[u8]) -> Result<(), Self::Error> {
        (**self).send_shared(pages)
    }

    fn dimensions(&self) -> (usize, usize) {
        (**self).dimensions()
    }
}
