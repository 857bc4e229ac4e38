//! Transport frame encoding
//!
//! Frame layout:
//! - MARKER (1 byte): 0x00, the only synchronization primitive
//! - LENGTH (1 word): raw payload length in bytes
//! - WIDTH (1 word): frame width in pixels
//! - HEIGHT (1 word): frame height in pixels
//! - PAYLOAD (2 × LENGTH bytes): nibble carriers, see [`crate::nibble`]
//!
//! Words are [`WordWidth`] wide and sent in native byte order. Header
//! words are raw binary and may contain `0x00`; only the payload is
//! guaranteed marker-free.

use embedded_io::Write;

use crate::nibble::NibbleScheme;

/// Frame start marker
pub const MARKER: u8 = 0x00;

/// Payload carriers staged per channel write
const CHUNK_SIZE: usize = 64;

/// Width of the header words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WordWidth {
    /// 4-byte words (32-bit targets)
    W32,
    /// 8-byte words (64-bit targets)
    W64,
}

impl WordWidth {
    /// Word width of the compiling target
    #[cfg(target_pointer_width = "64")]
    pub const NATIVE: WordWidth = WordWidth::W64;
    /// Word width of the compiling target
    #[cfg(not(target_pointer_width = "64"))]
    pub const NATIVE: WordWidth = WordWidth::W32;

    /// Size of one word in bytes
    pub const fn bytes(self) -> usize {
        match self {
            WordWidth::W32 => 4,
            WordWidth::W64 => 8,
        }
    }

    /// Encode `value` in native byte order
    ///
    /// Returns the buffer and the number of bytes used, or `None` if the
    /// value does not fit the word.
    pub fn encode(self, value: usize) -> Option<([u8; 8], usize)> {
        let mut out = [0u8; 8];
        match self {
            WordWidth::W32 => {
                let v = u32::try_from(value).ok()?;
                out[..4].copy_from_slice(&v.to_ne_bytes());
                Some((out, 4))
            }
            WordWidth::W64 => {
                let v = u64::try_from(value).ok()?;
                out.copy_from_slice(&v.to_ne_bytes());
                Some((out, 8))
            }
        }
    }

    /// Decode a native-order word from exactly [`Self::bytes`] bytes
    pub fn decode(self, bytes: &[u8]) -> Option<u64> {
        match self {
            WordWidth::W32 => {
                let raw: [u8; 4] = bytes.try_into().ok()?;
                Some(u32::from_ne_bytes(raw) as u64)
            }
            WordWidth::W64 => {
                let raw: [u8; 8] = bytes.try_into().ok()?;
                Some(u64::from_ne_bytes(raw))
            }
        }
    }
}

/// Wire format parameters shared by sender and receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFormat {
    /// Payload carrier arithmetic
    pub scheme: NibbleScheme,
    /// Header word width
    pub word: WordWidth,
}

impl FrameFormat {
    /// Reference format for the compiling target
    pub const NATIVE: FrameFormat = FrameFormat {
        scheme: NibbleScheme::OrMasked,
        word: WordWidth::NATIVE,
    };

    /// Format with the given scheme and native word width
    pub const fn with_scheme(scheme: NibbleScheme) -> Self {
        Self {
            scheme,
            word: WordWidth::NATIVE,
        }
    }
}

impl Default for FrameFormat {
    fn default() -> Self {
        Self::NATIVE
    }
}

/// Header words of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    /// Raw payload length in bytes
    pub length: usize,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl FrameHeader {
    /// Encoded header words, in wire order
    ///
    /// Fails if any field does not fit the word width.
    pub fn words(&self, word: WordWidth) -> Result<[([u8; 8], usize); 3], FieldOverflow> {
        let length = word.encode(self.length).ok_or(FieldOverflow)?;
        let width = word.encode(self.width).ok_or(FieldOverflow)?;
        let height = word.encode(self.height).ok_or(FieldOverflow)?;
        Ok([length, width, height])
    }
}

/// A header field does not fit the configured word width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldOverflow;

/// Errors from sending a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError<E> {
    /// A header field does not fit the word width; nothing was written
    FieldOverflow,
    /// The channel failed; the frame is abandoned part-way
    Channel(E),
}

impl<E> From<FieldOverflow> for SendError<E> {
    fn from(_: FieldOverflow) -> Self {
        SendError::FieldOverflow
    }
}

/// Total bytes on the wire for a payload of `payload_len` bytes
pub const fn encoded_len(format: FrameFormat, payload_len: usize) -> usize {
    1 + 3 * format.word.bytes() + 2 * payload_len
}

/// Send one frame over a blocking channel
///
/// Writes the marker, the three header words and the encoded payload,
/// in that order. Every write may park the caller until the channel
/// has room; there is no timeout. If the channel reports an error the
/// frame is left incomplete and the error is returned; the receiver
/// recovers at the next marker.
pub fn send<W: Write>(
    channel: &mut W,
    payload: &[u8],
    width: usize,
    height: usize,
    format: FrameFormat,
) -> Result<(), SendError<W::Error>> {
    let header = FrameHeader {
        length: payload.len(),
        width,
        height,
    };
    let words = header.words(format.word)?;

    channel.write_all(&[MARKER]).map_err(SendError::Channel)?;
    for (bytes, len) in &words {
        channel
            .write_all(&bytes[..*len])
            .map_err(SendError::Channel)?;
    }

    let mut chunk = [0u8; CHUNK_SIZE];
    for block in payload.chunks(CHUNK_SIZE / 2) {
        for (i, &byte) in block.iter().enumerate() {
            let [high, low] = format.scheme.encode(byte);
            chunk[2 * i] = high;
            chunk[2 * i + 1] = low;
        }
        channel
            .write_all(&chunk[..2 * block.len()])
            .map_err(SendError::Channel)?;
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_io::ErrorType;
    use std::vec::Vec;

    /// Channel that records every write call
    #[derive(Default)]
    pub(crate) struct Capture {
        pub bytes: Vec<u8>,
        pub writes: Vec<usize>,
    }

    impl ErrorType for Capture {
        type Error = Infallible;
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            self.bytes.extend_from_slice(buf);
            self.writes.push(buf.len());
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    /// Channel that fails after a number of accepted bytes
    struct Broken {
        remaining: usize,
    }

    #[derive(Debug, PartialEq)]
    struct Unplugged;

    impl embedded_io::Error for Unplugged {
        fn kind(&self) -> embedded_io::ErrorKind {
            embedded_io::ErrorKind::BrokenPipe
        }
    }

    impl ErrorType for Broken {
        type Error = Unplugged;
    }

    impl Write for Broken {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Unplugged> {
            if self.remaining == 0 {
                return Err(Unplugged);
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> Result<(), Unplugged> {
            Ok(())
        }
    }

    const W32: FrameFormat = FrameFormat {
        scheme: NibbleScheme::OrMasked,
        word: WordWidth::W32,
    };

    #[test]
    fn test_reference_frame() {
        let mut cap = Capture::default();
        send(&mut cap, &[0x00, 0xFF, 0x0F, 0xF0], 2, 2, W32).unwrap();

        let mut expected = Vec::new();
        expected.push(MARKER);
        expected.extend_from_slice(&4u32.to_ne_bytes());
        expected.extend_from_slice(&2u32.to_ne_bytes());
        expected.extend_from_slice(&2u32.to_ne_bytes());
        expected.extend_from_slice(&[0x0F, 0x0F, 0xFF, 0xFF, 0x0F, 0xFF, 0xFF, 0x0F]);

        assert_eq!(cap.bytes, expected);
        assert_eq!(cap.bytes.len(), encoded_len(W32, 4));
    }

    #[test]
    fn test_header_written_before_payload() {
        let mut cap = Capture::default();
        send(&mut cap, &[0xAB; 10], 5, 2, W32).unwrap();
        // marker, then one write per header word, then payload chunks
        assert_eq!(&cap.writes[..4], &[1, 4, 4, 4]);
        assert_eq!(cap.writes[4..].iter().sum::<usize>(), 20);
    }

    #[test]
    fn test_native_word_width() {
        let mut cap = Capture::default();
        send(&mut cap, &[1, 2, 3], 3, 1, FrameFormat::NATIVE).unwrap();
        let word = WordWidth::NATIVE.bytes();
        assert_eq!(cap.bytes.len(), 1 + 3 * word + 6);
        assert_eq!(
            WordWidth::NATIVE.decode(&cap.bytes[1..1 + word]),
            Some(3)
        );
    }

    #[test]
    fn test_empty_payload() {
        let mut cap = Capture::default();
        send(&mut cap, &[], 0, 0, W32).unwrap();
        assert_eq!(cap.bytes.len(), 13);
        assert_eq!(cap.bytes[0], MARKER);
    }

    #[test]
    fn test_large_payload_is_chunked() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(2048).collect();
        let mut cap = Capture::default();
        send(&mut cap, &payload, 256, 64, W32).unwrap();
        assert_eq!(cap.bytes.len(), encoded_len(W32, 2048));
        assert!(cap.writes.iter().all(|&n| n <= CHUNK_SIZE));
        assert!(cap.bytes[13..].iter().all(|&b| b != MARKER));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_field_overflow_writes_nothing() {
        let mut cap = Capture::default();
        let result = send(&mut cap, &[], usize::MAX, 1, W32);
        assert_eq!(result, Err(SendError::FieldOverflow));
        assert!(cap.bytes.is_empty());
    }

    #[test]
    fn test_channel_error_aborts_frame() {
        let mut broken = Broken { remaining: 5 };
        let result = send(&mut broken, &[1, 2, 3], 3, 1, W32);
        assert_eq!(result, Err(SendError::Channel(Unplugged)));
    }

    #[test]
    fn test_word_roundtrip() {
        let (bytes, len) = WordWidth::W32.encode(0x1234_5678).unwrap();
        assert_eq!(len, 4);
        assert_eq!(WordWidth::W32.decode(&bytes[..4]), Some(0x1234_5678));
        assert_eq!(WordWidth::W32.decode(&bytes[..3]), None);
    }
}
