//! facelink Mapper - geometry to blendshape weights
//!
//! Each channel is driven by one geometric feature remapped through its
//! calibration range into [0, 1], optionally inverted. A few channels are
//! derived from others (dimples, nose sneer, mouth stretch) or gated by
//! them (funnel). Channels with neither a calibration range nor a derivation
//! keep whatever value they last had.

pub mod calibration;
pub mod mapper;
pub mod remap;

pub use calibration::*;
pub use mapper::*;
pub use remap::*;
