//! Rendering control core
//!
//! `api` defines the collaborator interfaces the scheduler drives (color
//! queue, render context, ground targets, navigation); `frame` holds the
//! per-tick scheduling machinery itself.

pub mod api;
pub mod frame;
