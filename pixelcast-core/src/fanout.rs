//! Frame sinks
//!
//! After a frame is committed, the loop hands one [`FrameView`] to its
//! sinks. Sinks only read; they run one after the other on the same
//! snapshot, so no locking is needed on a single core.

use embedded_io::Write;
use pixelcast_protocol::{send, FrameFormat, SendError};

use crate::framebuffer::FrameView;

/// Consumer of finished frames
pub trait FrameSink {
    /// Error type for this sink
    type Error;

    /// Take the frame. Must not return before the sink is done with it.
    fn consume(&mut self, frame: &FrameView<'_>) -> Result<(), Self::Error>;
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    type Error = S::Error;

    fn consume(&mut self, frame: &FrameView<'_>) -> Result<(), Self::Error> {
        (**self).consume(frame)
    }
}

/// A disabled sink is `None`
impl<S: FrameSink> FrameSink for Option<S> {
    type Error = S::Error;

    fn consume(&mut self, frame: &FrameView<'_>) -> Result<(), Self::Error> {
        match self {
            Some(sink) => sink.consume(frame),
            None => Ok(()),
        }
    }
}

/// Which half of a sink pair failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FanoutError<A, B> {
    First(A),
    Second(B),
}

/// Both sinks see every frame; a failure in the first does not skip the second.
impl<A: FrameSink, B: FrameSink> FrameSink for (A, B) {
    type Error = FanoutError<A::Error, B::Error>;

    fn consume(&mut self, frame: &FrameView<'_>) -> Result<(), Self::Error> {
        let first = self.0.consume(frame);
        let second = self.1.consume(frame);
        first.map_err(FanoutError::First)?;
        second.map_err(FanoutError::Second)
    }
}

/// Mirrors frames to a blocking debug channel
pub struct MirrorSink<W> {
    channel: W,
    format: FrameFormat,
    frames_sent: u32,
}

impl<W: Write> MirrorSink<W> {
    /// Mirror over `channel` in the given wire format
    pub fn new(channel: W, format: FrameFormat) -> Self {
        Self {
            channel,
            format,
            frames_sent: 0,
        }
    }

    /// Frames fully written so far
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    /// Wire format in use
    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Release the channel
    pub fn into_inner(self) -> W {
        self.channel
    }
}

impl<W: Write> FrameSink for MirrorSink<W> {
    type Error = SendError<W::Error>;

    fn consume(&mut self, frame: &FrameView<'_>) -> Result<(), Self::Error> {
        send(
            &mut self.channel,
            frame.pixels(),
            frame.width(),
            frame.height(),
            self.format,
        )?;
        self.frames_sent = self.frames_sent.wrapping_add(1);
        Ok(())
    }
}
