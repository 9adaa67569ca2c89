//! facelink Geometry
//!
//! Stateless measurements on a face landmark mesh. Landmarks come from an
//! external detector (468+ points in the MediaPipe canonical topology); this
//! crate turns them into the scalar features the blendshape mapper needs.
//!
//! Every measurement is finite: degenerate configurations (collapsed eyes,
//! zero head height) produce a neutral 0 instead of NaN or infinity.

pub mod canonical;
pub mod features;
pub mod landmark;
pub mod pose;

pub use canonical::*;
pub use features::*;
pub use landmark::*;
pub use pose::*;
