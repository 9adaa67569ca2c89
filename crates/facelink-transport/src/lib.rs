//! facelink Transport Layer - UDP streaming of encoded frames
//!
//! This crate provides:
//! - A single-slot snapshot buffer shared by producer and sender
//! - The sending loop, which always sends the latest snapshot
//! - A listener that receives and decodes LiveLink datagrams

pub mod listener;
pub mod slot;
pub mod stream;

pub use listener::*;
pub use slot::*;
pub use stream::*;
