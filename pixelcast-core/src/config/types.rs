//! Configuration type definitions

use heapless::String;
use pixelcast_protocol::NibbleScheme;

use crate::framebuffer::PixelMode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum channel name length
pub const MAX_NAME_LEN: usize = 16;

/// Highest accepted frame rate
pub const MAX_FPS: u16 = 120;

/// How the display adapter gets pixels to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DisplayMode {
    /// Redraw the panel's own buffer pixel by pixel, then send it
    Copy,
    /// Send straight out of the framebuffer; needs the paged layout
    #[default]
    Aliased,
}

/// Demo scene to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SceneKind {
    #[default]
    Triangle,
    Checkerboard,
}

/// Frame loop steady state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LoopKind {
    /// Render once, then idle
    SingleShot,
    /// Render at `fps` forever
    #[default]
    Continuous,
}

/// Panel geometry and framebuffer layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PanelConfig {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Framebuffer memory layout
    pub layout: PixelMode,
    /// Display adapter mode
    pub display: DisplayMode,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 64,
            layout: PixelMode::Paged,
            display: DisplayMode::Aliased,
        }
    }
}

/// Rendering and pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderConfig {
    pub scene: SceneKind,
    pub looping: LoopKind,
    /// Target frames per second
    pub fps: u16,
    /// Animation counter step per frame
    pub anim_step: u16,
    /// Animation counter wraps to zero past this value
    pub anim_bound: u16,
    /// Ordered dithering after each draw (indexed layout only)
    pub dither: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scene: SceneKind::Triangle,
            looping: LoopKind::Continuous,
            fps: 60,
            anim_step: 1,
            anim_bound: 7,
            dither: true,
        }
    }
}

/// Debug mirror channel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MirrorConfig {
    /// Mirror frames at all
    pub enabled: bool,
    /// Channel name shown to the host
    pub channel: String<MAX_NAME_LEN>,
    /// Channel ring buffer size in bytes
    pub capacity: usize,
    /// Payload nibble scheme
    pub scheme: NibbleScheme,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        let mut channel = String::new();
        // Fits in MAX_NAME_LEN
        let _ = channel.push_str("Framebuffer");
        Self {
            enabled: true,
            channel,
            capacity: 512,
            scheme: NibbleScheme::OrMasked,
        }
    }
}

/// Complete firmware configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FirmwareConfig {
    pub panel: PanelConfig,
    pub render: RenderConfig,
    pub mirror: MirrorConfig,
}
