//! facelink Core - Fundamental types shared by every facelink crate
//!
//! This crate defines:
//! - The closed set of 61 blendshape channels and their wire ordinals
//! - The error type used across geometry, state, wire and transport
//! - Protocol constants (channel count, landmark count)

pub mod channel;
pub mod error;

pub use channel::*;
pub use error::*;

/// Number of blendshape channels carried by every animation frame
pub const CHANNEL_COUNT: usize = 61;

/// LiveLink face protocol version written by the encoder
pub const PROTOCOL_VERSION: u32 = 6;

/// Minimum number of landmarks a face source must supply per frame
pub const MIN_LANDMARKS: usize = 468;
