//! # Viewer Engine
//!
//! Scheduling core for an interactive viewer of large, progressively
//! streamed CAD scenes. The centerpiece is the adaptive progressive
//! renderer: a per-tick control loop that decides, under a moving time
//! budget, how much of a possibly huge geometry queue to draw this frame
//! and in what order (highlighted, normal, ghosted), while incrementally
//! converging the ground shadow and reflection passes that cannot finish
//! in one frame either.
//!
//! The crate owns no GPU resources. Command submission, geometry paging,
//! camera math, and UI live behind the traits in [`render::api`]; this
//! crate sequences them so that interaction stays responsive when the
//! scene-draw cost vastly exceeds a frame, and the image always converges
//! to a complete frame once motion stops.
//!
//! ## Quick start
//!
//! ```no_run
//! use viewer_engine::config::ViewerConfig;
//! use viewer_engine::render::frame::FrameOrchestrator;
//!
//! let config = ViewerConfig::default();
//! let mut orchestrator = FrameOrchestrator::new(&config).expect("valid config");
//! // each display refresh: orchestrator.tick(TickInputs { .. })
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod foundation;
pub mod render;
pub mod scene;

pub use config::{Config, ViewerConfig};
pub use error::ViewerError;
pub use events::{EventSink, ViewerEvent};
pub use render::frame::{FrameOrchestrator, TickInputs, TickReport};
