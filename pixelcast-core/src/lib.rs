//! Pixelcast Core - board-agnostic rendering and frame loop logic
//!
//! This crate contains everything between the rasterizer and the output
//! sinks that does not touch hardware:
//! - Framebuffer store shared by the rasterizer and both sinks
//! - Rasterizer binding and demo scenes
//! - Sink fan-out, including the debug-channel mirror
//! - Frame loop state machine
//! - Firmware configuration

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod fanout;
pub mod frame_loop;
pub mod framebuffer;
pub mod raster;

pub use config::{ConfigError, DisplayMode, FirmwareConfig};
pub use fanout::{FanoutError, FrameSink, MirrorSink};
pub use frame_loop::{AnimationCounter, FrameLoop, LoopAction, LoopError, LoopMode, LoopState};
pub use framebuffer::{FrameBuffer, FrameBufferError, FrameView, PixelMode};
pub use raster::{FrameContext, Rasterizer, Scene};
