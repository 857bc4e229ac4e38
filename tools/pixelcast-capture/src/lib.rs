//! Host side of the Pixelcast framebuffer mirror
//!
//! Reads the mirror stream (from the debug probe's TCP bridge or a raw
//! dump), decodes frames and writes them out as greyscale images.

pub mod capture;
pub mod image;

pub use capture::{connect, prepare_dir, Capture, MAX_PAYLOAD};
pub use image::{to_grey, upscale, write_pgm, Layout};
