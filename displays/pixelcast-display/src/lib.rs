//! Display side of Pixelcast
//!
//! This crate provides:
//! - [`Panel`] trait, the boundary to a page-buffer panel driver
//! - [`DisplayAdapter`], the frame sink that pushes framebuffer contents
//!   to a panel, either by copying pixels or by sending the shared bytes
//! - [`PanelBus`], typed bus/GPIO message execution over `embedded-hal`
//! - [`Sh1122`], a driver for 256×64 SH1122 OLED controllers
//!
//! # Architecture
//!
//! ```text
//! FrameLoop ──FrameView──▶ DisplayAdapter ──▶ Panel (Sh1122)
//!                                                  │
//!                                                  ▼
//!                                      ControllerBus (PanelBus)
//!                                                  │
//!                                                  ▼
//!                                   SpiBus + OutputPin + DelayNs
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod adapter;
pub mod bus;
pub mod panel;
pub mod sh1122;

// Re-export key types
pub use adapter::{DisplayAdapter, DisplayError, DisplayMode};
pub use bus::{BusError, ControllerBus, PanelBus};
pub use panel::Panel;
pub use sh1122::{Sh1122, Sh1122Error};
