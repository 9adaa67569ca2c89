//! facelink Test Harness - Synthetic faces and end-to-end validation
//!
//! This crate provides:
//! - Synthetic face meshes driven by a handful of expression parameters
//! - Jittered landmark noise
//! - End-to-end streaming over loopback UDP

pub mod fixtures;
pub mod integration;

pub use fixtures::*;
pub use integration::*;
