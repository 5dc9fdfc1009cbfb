//! Collaborator abstraction traits for the scheduling core
//!
//! This module defines the interfaces the frame orchestrator drives each
//! tick. Implementations (GPU command submission, geometry paging,
//! navigation) live outside this crate; the traits keep the scheduler free
//! of any backend dependency and make the whole control loop testable with
//! in-memory mocks.

use crate::scene::{BatchKey, Camera};

/// Override-material mode for one pass of the color queue
///
/// Mirrors the redraw phases that actually issue draws; `Finished` has no
/// queue pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePass {
    /// Selection-emphasis material
    Highlighted,
    /// No override; regular materials
    Normal,
    /// Faded override for hidden geometry
    Ghosted,
}

/// Receiver for draw requests issued by the color queue
///
/// Passed explicitly to [`ProgressiveQueue::render_some`] so the queue has
/// no implicit dependency on orchestrator internals.
pub trait DrawSink {
    /// Issue the draw for one batch
    fn draw(&mut self, batch: BatchKey);
}

/// Time-sliced color queue over the scene's geometry batches
///
/// The queue owns the draw ordering and its own cursor; the orchestrator
/// only resets it at phase boundaries and feeds it a time budget. The
/// cursor is the single source of truth for progress: budget exhaustion
/// mid-pass resumes from the same position next tick with no duplicate
/// draws.
pub trait ProgressiveQueue {
    /// Restart the queue for a pass with the given override mode
    ///
    /// `clear` indicates a fresh redraw cycle (target was cleared) rather
    /// than a phase continuation within the same cycle.
    fn reset(&mut self, camera: &Camera, pass: QueuePass, clear: bool);

    /// Issue draws until `budget_ms` is spent or the pass completes
    ///
    /// Returns the unspent budget in milliseconds; a phase boundary hands
    /// the leftover straight to the next pass in the same tick.
    fn render_some(&mut self, sink: &mut dyn DrawSink, budget_ms: f64) -> f64;

    /// Drop any override material left by the previous pass
    ///
    /// The same queue instance is reused across phases, so a pass that set
    /// an override must be followed by this before the next pass runs.
    fn clear_override(&mut self);

    /// Whether the queue has no batches at all
    fn is_empty(&self) -> bool;

    /// Whether the current pass has issued every draw
    fn is_done(&self) -> bool;

    /// Whether any batch carries highlight emphasis
    fn has_highlighted(&self) -> bool;

    /// Whether every batch is visible (no ghosted pass needed)
    fn all_visible(&self) -> bool;

    /// Completion of the current pass in `[0, 1]`
    fn progress(&self) -> f32;

    /// Whether a page-out failed or a batch arrived incomplete, requiring a
    /// rerun of the redraw cycle
    fn needs_render(&self) -> bool;

    /// Acknowledge a [`ProgressiveQueue::needs_render`] report
    fn clear_needs_render(&mut self);

    /// Whether the model is still streaming in
    fn is_loading(&self) -> bool;
}

/// GPU-facing frame lifecycle operations
///
/// The scheduler sequences these; it never touches command buffers or
/// targets itself.
pub trait RenderContext {
    /// Recreate size-dependent targets after a surface resize
    fn resize(&mut self, width: u32, height: u32);

    /// Begin a scene render into the color target, optionally clearing it
    fn begin_scene(&mut self, camera: &Camera, clear: bool);

    /// Issue the draw for one batch into the color target
    fn draw_batch(&mut self, batch: BatchKey);

    /// Render the post-scene overlay layer (markup, gizmos, UI chrome)
    fn render_overlay(&mut self);

    /// Recompute the final composition
    ///
    /// `final_pass` marks the end-of-cycle composite that follows the
    /// `Finished` phase, as opposed to an intermediate progressive blit.
    fn compose_final_frame(&mut self, final_pass: bool);

    /// Present the composed buffer
    fn present(&mut self);
}

/// Incrementally built ground contact-shadow map
pub trait GroundShadowTarget {
    /// Discard the accumulated shadow map
    fn clear(&mut self);

    /// Accumulate one batch's shadow contribution
    fn render_into(&mut self, batch: BatchKey);

    /// Filter/blur the finished map
    fn postprocess(&mut self);

    /// Composite the shadow onto the current color target
    fn composite(&mut self, camera: &Camera);

    /// Composite the shadow into the ground reflection's own target, so
    /// shadows appear inside reflections
    fn composite_into_reflection(&mut self);

    /// Whether the target holds a usable result
    fn is_valid(&self) -> bool;
}

/// Incrementally built ground mirror reflection
pub trait GroundReflectionTarget {
    /// Discard the accumulated reflection
    fn clear(&mut self);

    /// Accumulate one batch's mirrored render
    fn render_into(&mut self, batch: BatchKey);

    /// Filter the finished reflection
    fn postprocess(&mut self);

    /// Composite the reflection onto the current color target
    fn composite(&mut self, camera: &Camera);

    /// Whether the camera fully culls the ground plane from this view
    fn is_ground_culled(&self, camera: &Camera) -> bool;

    /// Whether the target holds a usable result
    fn is_valid(&self) -> bool;
}

/// User navigation (orbit/pan/zoom) polled once per tick
pub trait NavigationController {
    /// Advance by `delta_ms`; returns whether the camera moved
    fn update(&mut self, delta_ms: f64) -> bool;
}

/// Scripted or playback animation polled once per tick
pub trait AnimationController {
    /// Advance by `delta_ms`; returns whether anything moved
    fn update(&mut self, delta_ms: f64) -> bool;
}

/// A controller that never moves; default for embeddings without
/// navigation or animation
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticController;

impl NavigationController for StaticController {
    fn update(&mut self, _delta_ms: f64) -> bool {
        false
    }
}

impl AnimationController for StaticController {
    fn update(&mut self, _delta_ms: f64) -> bool {
        false
    }
}
