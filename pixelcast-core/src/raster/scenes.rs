//! Demo scenes
//!
//! Two small rasterizers used by the firmware: a filled triangle spun
//! about the view axis, and a block pattern that scrolls with the
//! animation counter.

use embedded_graphics::pixelcolor::Gray8;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Triangle};

use super::{dither, FrameContext, Rasterizer};
use crate::config::{RenderConfig, SceneKind};
use crate::framebuffer::FrameBuffer;

/// Triangle corners in normalized device coordinates
const TRIANGLE: [(f32, f32); 3] = [(-0.9, -0.9), (0.9, -0.9), (0.0, 0.9)];

/// Filled triangle rotated about z by `base_deg + tick * step_deg`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinningTriangle {
    /// Rotation applied on every frame
    pub base_deg: f32,
    /// Extra rotation per animation tick
    pub step_deg: f32,
    /// Fill shade before dithering
    pub shade: u8,
    /// Apply ordered dithering after drawing
    pub dither: bool,
}

impl Default for SpinningTriangle {
    fn default() -> Self {
        Self {
            base_deg: 1.5,
            step_deg: 1.5,
            shade: 255,
            dither: true,
        }
    }
}

impl SpinningTriangle {
    /// Rotation in degrees for a given tick
    pub fn angle_deg(&self, tick: u16) -> f32 {
        self.base_deg + tick as f32 * self.step_deg
    }

    /// Corner positions in pixel space for a `width × height` viewport
    pub fn corners(&self, tick: u16, width: usize, height: usize) -> [Point; 3] {
        let rad = self.angle_deg(tick).to_radians();
        let (sin, cos) = (libm::sinf(rad), libm::cosf(rad));
        let (w, h) = (width as f32, height as f32);

        TRIANGLE.map(|(x, y)| {
            let rx = x * cos - y * sin;
            let ry = x * sin + y * cos;
            // Viewport transform, y grows downwards in the framebuffer
            let px = (rx + 1.0) * 0.5 * w;
            let py = (1.0 - ry) * 0.5 * h;
            Point::new(libm::roundf(px) as i32, libm::roundf(py) as i32)
        })
    }
}

impl Rasterizer for SpinningTriangle {
    fn render<B>(&mut self, target: &mut FrameBuffer<B>, ctx: FrameContext)
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        target.clear();

        let [a, b, c] = self.corners(ctx.tick, target.width(), target.height());
        let _ = Triangle::new(a, b, c)
            .into_styled(PrimitiveStyle::with_fill(Gray8::new(self.shade)))
            .draw(target);

        if self.dither {
            dither::ordered(target);
        }
    }
}

/// 4×4 lit blocks on an 8-pixel period, shifted diagonally by the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkerboard {
    period: usize,
    lit: usize,
}

impl Default for Checkerboard {
    fn default() -> Self {
        Self::new(8, 4)
    }
}

impl Checkerboard {
    /// Pattern with a `period`-pixel repeat and `lit` pixels on per run
    ///
    /// A zero period is raised to 1 and `lit` is capped at the period.
    pub const fn new(period: usize, lit: usize) -> Self {
        let period = if period == 0 { 1 } else { period };
        let lit = if lit > period { period } else { lit };
        Self { period, lit }
    }

    /// Pattern period in pixels
    pub fn period(&self) -> usize {
        self.period
    }

    /// Lit run within each period
    pub fn lit(&self) -> usize {
        self.lit
    }

    /// Whether `(x, y)` is lit at `tick`
    pub fn is_lit(&self, x: usize, y: usize, tick: u16) -> bool {
        let t = tick as usize;
        (x + t) % self.period < self.lit && (y + t) % self.period < self.lit
    }
}

impl Rasterizer for Checkerboard {
    fn render<B>(&mut self, target: &mut FrameBuffer<B>, ctx: FrameContext)
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        target.clear();
        for y in 0..target.height() {
            for x in 0..target.width() {
                if self.is_lit(x, y, ctx.tick) {
                    target.set_pixel(x, y, 1);
                }
            }
        }
    }
}

/// Scene picked by configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scene {
    Triangle(SpinningTriangle),
    Checkerboard(Checkerboard),
}

impl Scene {
    /// Build the configured scene with default parameters
    pub fn from_config(config: &RenderConfig) -> Self {
        match config.scene {
            SceneKind::Triangle => Scene::Triangle(SpinningTriangle {
                dither: config.dither,
                ..Default::default()
            }),
            SceneKind::Checkerboard => Scene::Checkerboard(Checkerboard::default()),
        }
    }
}

impl Rasterizer for Scene {
    fn render<B>(&mut self, target: &mut FrameBuffer<B>, ctx: FrameContext)
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        match self {
            Scene::Triangle(scene) => scene.render(target, ctx),
            Scene::Checkerboard(scene) => scene.render(target, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::PixelMode;

    #[test]
    fn test_unrotated_corners() {
        let tri = SpinningTriangle {
            base_deg: 0.0,
            step_deg: 0.0,
            ..Default::default()
        };
        let [a, b, c] = tri.corners(0, 256, 64);
        assert_eq!(a, Point::new(13, 61));
        assert_eq!(b, Point::new(243, 61));
        assert_eq!(c, Point::new(128, 3));
    }

    #[test]
    fn test_triangle_renders_binary_frame() {
        let mut fb = FrameBuffer::new([0u8; 64 * 32], 64, 32, PixelMode::Indexed).unwrap();
        SpinningTriangle::default().render(&mut fb, FrameContext::default());

        assert!(fb.as_bytes().iter().all(|&b| b <= 1));
        // Centroid is inside, corners of the viewport are not
        assert_eq!(fb.pixel_at(32, 18), 1);
        assert_eq!(fb.pixel_at(0, 0), 0);
        assert_eq!(fb.pixel_at(63, 0), 0);
    }

    #[test]
    fn test_triangle_on_paged_buffer() {
        let mut fb = FrameBuffer::new([0u8; 256], 64, 32, PixelMode::Paged).unwrap();
        SpinningTriangle::default().render(&mut fb, FrameContext::default());
        assert_eq!(fb.pixel_at(32, 18), 1);
        assert_eq!(fb.pixel_at(0, 0), 0);
    }

    #[test]
    fn test_checkerboard_shifts_with_tick() {
        let board = Checkerboard::default();
        assert!(board.is_lit(0, 0, 0));
        assert!(!board.is_lit(4, 0, 0));
        assert!(board.is_lit(4, 4, 4));
        assert!(!board.is_lit(0, 0, 4));
    }

    #[test]
    fn test_checkerboard_fills_quarter() {
        let mut fb = FrameBuffer::new([0u8; 256], 16, 16, PixelMode::Indexed).unwrap();
        Checkerboard::default().render(&mut fb, FrameContext { tick: 3, frame: 0 });
        let lit = fb.as_bytes().iter().filter(|&&b| b == 1).count();
        assert_eq!(lit, 64);
    }

    #[test]
    fn test_checkerboard_zero_period() {
        let board = Checkerboard::new(0, 3);
        assert_eq!((board.period(), board.lit()), (1, 1));
        // Every pixel is lit with a one-pixel period
        assert!(board.is_lit(5, 9, 2));
    }

    #[test]
    fn test_scene_from_config() {
        let mut config = RenderConfig::default();
        config.dither = false;
        match Scene::from_config(&config) {
            Scene::Triangle(tri) => assert!(!tri.dither),
            other => panic!("unexpected scene {:?}", other),
        }

        config.scene = SceneKind::Checkerboard;
        let mut scene = Scene::from_config(&config);
        let mut fb = FrameBuffer::new([0u8; 8], 8, 8, PixelMode::Paged).unwrap();
        scene.render(&mut fb, FrameContext::default());
        assert_eq!(fb.pixel_at(0, 0), 1);
        assert_eq!(fb.pixel_at(4, 0), 0);
    }
}
