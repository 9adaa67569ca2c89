//! facelink Runtime - Streaming session orchestration
//!
//! Per processed video frame the producer runs:
//! 1. Measure landmark geometry
//! 2. Map features to calibrated channel weights
//! 3. Apply the weights through the frame's temporal filter
//! 4. Stamp the timecode
//! 5. Encode the LiveLink message
//! 6. Publish it to the transport slot
//!
//! The transport loop sends the latest published message independently.

pub mod config;
pub mod pipeline;
pub mod session;
pub mod telemetry;

pub use config::*;
pub use pipeline::*;
pub use session::*;
pub use telemetry::*;
