//! Per-tick frame scheduling
//!
//! The pieces compose bottom-up: [`flags`] tracks what work is pending,
//! [`budget`] adapts the per-tick draw allowance, [`phase`] sequences the
//! redraw passes, [`ground`] paces the incremental shadow/reflection
//! builds, and [`orchestrator`] ties them together in the tick routine.

pub mod budget;
pub mod flags;
pub mod ground;
pub mod orchestrator;
pub mod phase;

pub use budget::FrameBudget;
pub use flags::{FrameState, InvalidationFlags};
pub use ground::{GroundPassState, ReflectionOutcome, ReflectionUpdater, ShadowUpdater};
pub use orchestrator::{FrameOrchestrator, TickInputs, TickReport};
pub use phase::{PhaseMachine, PhaseTransition, RenderPhase};
