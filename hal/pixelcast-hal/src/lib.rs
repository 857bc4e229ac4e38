//! Pixelcast Hardware Abstraction Layer
//!
//! This crate holds the board-agnostic pieces that sit between the
//! application and the chip HAL:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (pixelcast-firmware)       │
//! └─────────────────────────────────────────┘
//!          │                     │
//!          ▼                     ▼
//! ┌─────────────────┐   ┌─────────────────┐
//! │ link (panel bus │   │ channel (debug  │
//! │ messages)       │   │ up-channels)    │
//! └─────────────────┘   └─────────────────┘
//!          │                     │
//!          ▼                     ▼
//! ┌─────────────────────────────────────────┐
//! │  embedded-hal / embedded-io impls       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`link`] - Typed byte-transport and GPIO/delay messages for panel drivers
//! - [`channel`] - Registration of blocking debug up-channels
//! - [`spi`] - SPI bus configuration for the panel

#![no_std]
#![deny(unsafe_code)]

pub mod channel;
pub mod link;
pub mod spi;

// Re-export key types at crate root for convenience
pub use channel::{ChannelConfig, ChannelError, ChannelMode, ChannelRegistry, UpChannel};
pub use link::{ByteCommand, GpioCommand, Handled};
pub use spi::SpiConfig;
