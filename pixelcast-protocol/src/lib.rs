//! Framebuffer transport protocol
//!
//! This crate defines the byte stream used to mirror a framebuffer to a
//! host over a debug channel. The channel has no framing of its own and
//! may carry other traffic, so the stream synchronizes itself:
//!
//! ```text
//! ┌────────┬────────┬───────┬────────┬──────────────────────┐
//! │ MARKER │ LENGTH │ WIDTH │ HEIGHT │ PAYLOAD              │
//! │ 0x00   │ 1 word │ 1 word│ 1 word │ 2 × LENGTH carriers  │
//! └────────┴────────┴───────┴────────┴──────────────────────┘
//! ```
//!
//! Header words are sent in native byte order. Every payload byte
//! travels as two carrier bytes whose low nibble is `0xF`, so no payload
//! carrier can ever equal the marker. The protocol is unidirectional and
//! best-effort: no acknowledgment, checksum or retransmission.

#![no_std]
#![deny(unsafe_code)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod decoder;
pub mod frame;
pub mod nibble;

pub use decoder::{unpack_bits, DecodeError, DecodedFrame, FrameDecoder};
pub use frame::{
    encoded_len, send, FrameFormat, FrameHeader, SendError, WordWidth, MARKER,
};
pub use nibble::NibbleScheme;
