//! Scene-side state the scheduler consumes
//!
//! The core does not own a scene graph; it only needs an ordered table of
//! opaque geometry batches and a minimal camera. Everything heavier
//! (materials, transforms, paging) belongs to the embedding layers.

pub mod batches;
pub mod camera;

pub use batches::{BatchKey, BatchSet};
pub use camera::Camera;
