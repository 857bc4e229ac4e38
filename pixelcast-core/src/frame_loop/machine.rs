//! Frame loop state machine

use super::animation::AnimationCounter;
use crate::fanout::FrameSink;
use crate::framebuffer::FrameBuffer;
use crate::raster::{FrameContext, Rasterizer};

/// How many frames the loop produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopMode {
    /// Render and flush once, then idle
    SingleShot,
    /// Render, flush and pace forever
    Continuous {
        /// Target time between frame starts
        frame_interval_ms: u32,
    },
}

/// Loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopState {
    /// Nothing rendered yet
    Boot,
    /// Next step renders a frame
    Render,
    /// Next step hands the frame to the sinks
    Flush,
    /// Next step advances the animation and waits for the frame slot
    Pace,
    /// Single-shot frame delivered; nothing left to do
    Idle,
    /// Shut down
    Stopped,
}

impl LoopState {
    /// Check if the loop will not render again
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Idle | LoopState::Stopped)
    }
}

/// What the caller should do after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopAction {
    /// Call `step` again right away
    Continue,
    /// Wait for the next frame slot, then call `step`
    WaitFrame { interval_ms: u32 },
    /// Nothing more to render; park until shutdown
    Park,
    /// Loop is stopped
    Halt,
}

/// Errors from a loop step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopError<E> {
    /// A sink failed; the loop has already moved past the flush
    Sink(E),
}

/// Frame loop controller, owner of the framebuffer
pub struct FrameLoop<B> {
    framebuffer: FrameBuffer<B>,
    mode: LoopMode,
    state: LoopState,
    counter: AnimationCounter,
    frames: u32,
}

impl<B> FrameLoop<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Create a loop around `framebuffer`
    pub fn new(framebuffer: FrameBuffer<B>, mode: LoopMode, counter: AnimationCounter) -> Self {
        Self {
            framebuffer,
            mode,
            state: LoopState::Boot,
            counter,
            frames: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Loop mode
    pub fn mode(&self) -> LoopMode {
        self.mode
    }

    /// Animation counter
    pub fn counter(&self) -> &AnimationCounter {
        &self.counter
    }

    /// Frames flushed so far
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Shared framebuffer
    pub fn framebuffer(&self) -> &FrameBuffer<B> {
        &self.framebuffer
    }

    /// Mutable framebuffer, for drawing outside the loop (e.g. a splash)
    pub fn framebuffer_mut(&mut self) -> &mut FrameBuffer<B> {
        &mut self.framebuffer
    }

    /// Stop the loop from any state
    pub fn shutdown(&mut self) {
        self.state = LoopState::Stopped;
    }

    /// Run one state transition
    pub fn step<R, S>(
        &mut self,
        rasterizer: &mut R,
        sinks: &mut S,
    ) -> Result<LoopAction, LoopError<S::Error>>
    where
        R: Rasterizer,
        S: FrameSink,
    {
        match self.state {
            LoopState::Boot => {
                self.state = LoopState::Render;
                Ok(LoopAction::Continue)
            }
            LoopState::Render => {
                let ctx = FrameContext {
                    tick: self.counter.value(),
                    frame: self.frames,
                };
                rasterizer.render(&mut self.framebuffer, ctx);
                self.framebuffer.commit();
                self.state = LoopState::Flush;
                Ok(LoopAction::Continue)
            }
            LoopState::Flush => {
                let result = sinks.consume(&self.framebuffer.view());
                self.frames = self.frames.wrapping_add(1);
                self.state = match self.mode {
                    LoopMode::SingleShot => LoopState::Idle,
                    LoopMode::Continuous { .. } => LoopState::Pace,
                };
                result.map_err(LoopError::Sink)?;
                Ok(LoopAction::Continue)
            }
            LoopState::Pace => {
                self.counter.advance();
                self.state = LoopState::Render;
                let interval_ms = match self.mode {
                    LoopMode::Continuous { frame_interval_ms } => frame_interval_ms,
                    LoopMode::SingleShot => 0,
                };
                Ok(LoopAction::WaitFrame { interval_ms })
            }
            LoopState::Idle => Ok(LoopAction::Park),
            LoopState::Stopped => Ok(LoopAction::Halt),
        }
    }

    /// Step until the loop asks to wait, park or halt
    ///
    /// A sink error ends the run early; the loop state is already past
    /// the flush, so the next call carries on with the following frame.
    pub fn run_frame<R, S>(
        &mut self,
        rasterizer: &mut R,
        sinks: &mut S,
    ) -> Result<LoopAction, LoopError<S::Error>>
    where
        R: Rasterizer,
        S: FrameSink,
    {
        loop {
            match self.step(rasterizer, sinks)? {
                LoopAction::Continue => continue,
                action => return Ok(action),
            }
        }
    }
}
