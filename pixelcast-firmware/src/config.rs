//! Firmware configuration
//!
//! `pixelcast.toml` is parsed and validated by the build script; the
//! result is compiled in as [`firmware_config`] plus the constants that
//! size static buffers.

use pixelcast_core::config::{DisplayMode, FirmwareConfig, LoopKind, SceneKind};
use pixelcast_core::PixelMode;
use pixelcast_protocol::NibbleScheme;

include!(concat!(env!("OUT_DIR"), "/config.rs"));
