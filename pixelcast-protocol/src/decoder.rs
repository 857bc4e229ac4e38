//! Receiver side of the framebuffer transport
//!
//! [`FrameDecoder`] is fed one byte at a time from the host end of the
//! debug channel. It skips everything up to a marker, reads the three
//! header words, then collects `2 × length` carriers. Any violation of
//! the carrier rule drops the partial frame and returns to marker
//! search, so a corrupted or truncated frame costs at most that frame.

use heapless::Vec;

use crate::frame::{FrameFormat, MARKER};
use crate::nibble::is_carrier;

/// Errors reported while decoding. The decoder has already resynced
/// when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// A payload byte did not have the carrier low nibble
    BadCarrier,
    /// A marker arrived before the payload was complete
    Truncated,
    /// Declared length exceeds the decoder's capacity
    PayloadTooLarge,
    /// Declared length does not match width × height at the expected depth
    LayoutMismatch,
}

/// A complete frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame<const N: usize> {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Raw payload bytes
    pub payload: Vec<u8, N>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Skipping bytes until a marker
    WaitingForMarker,
    /// Collecting header word `field` (0 = length, 1 = width, 2 = height)
    ReadingHeader { field: usize },
    /// Collecting carrier pairs
    ReadingPayload,
}

/// Byte-fed frame decoder holding up to `N` payload bytes
#[derive(Debug, Clone)]
pub struct FrameDecoder<const N: usize> {
    format: FrameFormat,
    bits_per_pixel: Option<u8>,
    state: DecodeState,
    word: Vec<u8, 8>,
    header: [usize; 3],
    pending_high: Option<u8>,
    payload: Vec<u8, N>,
}

impl<const N: usize> FrameDecoder<N> {
    /// Create a decoder for the given wire format
    pub fn new(format: FrameFormat) -> Self {
        Self {
            format,
            bits_per_pixel: None,
            state: DecodeState::WaitingForMarker,
            word: Vec::new(),
            header: [0; 3],
            pending_high: None,
            payload: Vec::new(),
        }
    }

    /// Reject frames whose length is not `width × height × bpp / 8`
    pub fn with_bits_per_pixel(mut self, bpp: u8) -> Self {
        self.bits_per_pixel = Some(bpp);
        self
    }

    /// Drop any partial frame and wait for the next marker
    pub fn reset(&mut self) {
        self.state = DecodeState::WaitingForMarker;
        self.restart();
    }

    /// Clear per-frame progress
    fn restart(&mut self) {
        self.word.clear();
        self.header = [0; 3];
        self.pending_high = None;
        self.payload.clear();
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(frame))` when a frame completes, `Ok(None)` when
    /// more bytes are needed, or `Err` when the current frame was dropped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<DecodedFrame<N>>, DecodeError> {
        match self.state {
            DecodeState::WaitingForMarker => {
                if byte == MARKER {
                    self.restart();
                    self.state = DecodeState::ReadingHeader { field: 0 };
                }
                Ok(None)
            }
            DecodeState::ReadingHeader { field } => {
                // Capacity is 8 and words are at most 8 bytes
                let _ = self.word.push(byte);
                if self.word.len() < self.format.word.bytes() {
                    return Ok(None);
                }

                let value = self.format.word.decode(&self.word).unwrap_or(u64::MAX);
                self.word.clear();
                self.header[field] = usize::try_from(value).unwrap_or(usize::MAX);

                if field < 2 {
                    self.state = DecodeState::ReadingHeader { field: field + 1 };
                    return Ok(None);
                }
                self.begin_payload()
            }
            DecodeState::ReadingPayload => {
                if byte == MARKER {
                    // A new frame started; follow it
                    self.restart();
                    self.state = DecodeState::ReadingHeader { field: 0 };
                    return Err(DecodeError::Truncated);
                }
                if !is_carrier(byte) {
                    self.reset();
                    return Err(DecodeError::BadCarrier);
                }

                let Some(high) = self.pending_high.take() else {
                    self.pending_high = Some(byte);
                    return Ok(None);
                };
                let value = match self.format.scheme.decode(high, byte) {
                    Some(value) => value,
                    None => {
                        self.reset();
                        return Err(DecodeError::BadCarrier);
                    }
                };
                // Length was checked against N in begin_payload
                let _ = self.payload.push(value);

                if self.payload.len() == self.header[0] {
                    Ok(Some(self.finish()))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Validate the header and switch to payload collection
    fn begin_payload(&mut self) -> Result<Option<DecodedFrame<N>>, DecodeError> {
        let [length, width, height] = self.header;

        if length > N {
            self.reset();
            return Err(DecodeError::PayloadTooLarge);
        }

        if let Some(bpp) = self.bits_per_pixel {
            let expected_bits = width
                .checked_mul(height)
                .and_then(|px| px.checked_mul(bpp as usize));
            if expected_bits != length.checked_mul(8) {
                self.reset();
                return Err(DecodeError::LayoutMismatch);
            }
        }

        if length == 0 {
            return Ok(Some(self.finish()));
        }

        self.state = DecodeState::ReadingPayload;
        Ok(None)
    }

    /// Hand out the collected frame and return to marker search
    fn finish(&mut self) -> DecodedFrame<N> {
        let frame = DecodedFrame {
            width: self.header[1],
            height: self.header[2],
            payload: core::mem::take(&mut self.payload),
        };
        self.reset();
        frame
    }

    /// Feed multiple bytes
    ///
    /// Returns the first complete frame found, if any, together with the
    /// number of bytes consumed. Bytes after that frame are not consumed.
    pub fn feed_bytes(
        &mut self,
        bytes: &[u8],
    ) -> Result<(Option<DecodedFrame<N>>, usize), DecodeError> {
        for (i, &byte) in bytes.iter().enumerate() {
            if let Some(frame) = self.feed(byte)? {
                return Ok((Some(frame), i + 1));
            }
        }
        Ok((None, bytes.len()))
    }
}

/// Expand a 1-bit-per-pixel byte, MSB first, into 0/255 pixels
pub fn unpack_bits(byte: u8) -> [u8; 8] {
    let mut pixels = [0u8; 8];
    for (i, px) in pixels.iter_mut().enumerate() {
        if byte & (0x80 >> i) != 0 {
            *px = 255;
        }
    }
    pixels
}
