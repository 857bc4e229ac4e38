//! Rasterizer binding
//!
//! The 3-D pipeline renders into the framebuffer through its
//! `embedded-graphics` [`DrawTarget`](embedded_graphics::draw_target::DrawTarget)
//! implementation. A [`Rasterizer`] produces one complete frame per call:
//! clear, transform, draw, then any post-process such as dithering.
//! The frame loop commits the frame afterwards.

pub mod dither;
pub mod scenes;

pub use scenes::{Checkerboard, Scene, SpinningTriangle};

use crate::framebuffer::FrameBuffer;

/// Per-frame inputs for a rasterizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameContext {
    /// Animation counter value
    pub tick: u16,
    /// Frames completed so far
    pub frame: u32,
}

/// Something that renders a full frame into the framebuffer
pub trait Rasterizer {
    /// Render one frame. Post-processing must be applied before returning.
    fn render<B>(&mut self, target: &mut FrameBuffer<B>, ctx: FrameContext)
    where
        B: AsRef<[u8]> + AsMut<[u8]>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for &mut R {
    fn render<B>(&mut self, target: &mut FrameBuffer<B>, ctx: FrameContext)
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        (**self).render(target, ctx)
    }
}
