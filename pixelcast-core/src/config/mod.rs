//! Configuration types
//!
//! Board-agnostic firmware configuration. The firmware build parses
//! `pixelcast.toml` into these types on the host and bakes the result
//! into the binary.

pub mod types;

pub use types::*;

use pixelcast_protocol::FrameFormat;

use crate::frame_loop::{AnimationCounter, LoopMode};
use crate::framebuffer::{PixelMode, PAGE_HEIGHT};

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Panel width or height is zero
    ZeroDimension,
    /// Paged layout with a height that is not a multiple of 8
    UnalignedPages,
    /// Aliased display mode needs the paged layout
    AliasedNeedsPaged,
    /// Frame rate outside `1..=MAX_FPS`
    FrameRate(u16),
    /// Animation step is zero
    ZeroStep,
    /// Animation step is larger than its bound
    StepExceedsBound,
    /// Mirror channel capacity is zero
    ZeroCapacity,
    /// Mirror channel name is empty
    EmptyChannelName,
}

impl FirmwareConfig {
    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let panel = &self.panel;
        if panel.width == 0 || panel.height == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if panel.layout == PixelMode::Paged && panel.height as usize % PAGE_HEIGHT != 0 {
            return Err(ConfigError::UnalignedPages);
        }
        if panel.display == DisplayMode::Aliased && panel.layout != PixelMode::Paged {
            return Err(ConfigError::AliasedNeedsPaged);
        }

        let render = &self.render;
        if render.fps == 0 || render.fps > MAX_FPS {
            return Err(ConfigError::FrameRate(render.fps));
        }
        if render.anim_step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        if render.anim_step > render.anim_bound {
            return Err(ConfigError::StepExceedsBound);
        }

        let mirror = &self.mirror;
        if mirror.enabled {
            if mirror.capacity == 0 {
                return Err(ConfigError::ZeroCapacity);
            }
            if mirror.channel.is_empty() {
                return Err(ConfigError::EmptyChannelName);
            }
        }

        Ok(())
    }

    /// Time between frame starts in continuous mode
    pub fn frame_interval_ms(&self) -> u32 {
        1000 / u32::from(self.render.fps.max(1))
    }

    /// Loop mode for the frame loop controller
    pub fn loop_mode(&self) -> LoopMode {
        match self.render.looping {
            LoopKind::SingleShot => LoopMode::SingleShot,
            LoopKind::Continuous => LoopMode::Continuous {
                frame_interval_ms: self.frame_interval_ms(),
            },
        }
    }

    /// Animation counter seeded from the render settings
    pub fn animation(&self) -> AnimationCounter {
        AnimationCounter::new(self.render.anim_step, self.render.anim_bound)
    }

    /// Framebuffer bytes for the configured panel and layout
    pub fn buffer_len(&self) -> usize {
        self.panel
            .layout
            .buffer_len(self.panel.width as usize, self.panel.height as usize)
    }

    /// Mirror wire format at the target's native word width
    pub fn frame_format(&self) -> FrameFormat {
        FrameFormat::with_scheme(self.mirror.scheme)
    }
}
