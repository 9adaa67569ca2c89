//! facelink Wire Protocol - LiveLink face message format
//!
//! A message is:
//! - Version (4 bytes, LE)
//! - Identity (variable, ASCII, starts with `$`)
//! - Name length (4 bytes, BE signed) + name (UTF-8)
//! - Frame number, sub-frame, fps, fps denominator (4 x 4 bytes, BE)
//! - Channel count (1 byte, always 61)
//! - Channel values (61 x f32, BE)

pub mod codec;
pub mod header;

pub use codec::*;
pub use header::*;
