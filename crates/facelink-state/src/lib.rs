//! facelink State - the animation frame being streamed
//!
//! One [`AnimationFrame`] lives for the whole streaming session. The
//! producer writes channel values into it once per processed video frame;
//! filtered writes go through a per-channel moving-average history, blink
//! channels are written straight through.

pub mod frame;
pub mod history;
pub mod timecode;

pub use frame::*;
pub use history::*;
pub use timecode::*;
