//! Frame loop controller
//!
//! Owns the framebuffer and sequences render → flush → pace. The loop
//! never sleeps or spins itself: each [`FrameLoop::step`] returns a
//! [`LoopAction`] telling the caller whether to continue, wait for the
//! next frame slot, park, or stop.

pub mod animation;
pub mod machine;

pub use animation::AnimationCounter;
pub use machine::{FrameLoop, LoopAction, LoopError, LoopMode, LoopState};
