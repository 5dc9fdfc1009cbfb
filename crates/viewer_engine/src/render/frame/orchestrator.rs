//! Per-tick frame orchestration
//!
//! [`FrameOrchestrator::tick`] is the single entry point called once per
//! display refresh. One tick services pending invalidation, adapts the draw
//! budget, advances the incremental ground passes, drives the color queue
//! through its phases under the remaining budget, and composites. Nothing
//! here blocks; work that does not fit in the budget resumes next tick from
//! the stored cursors.
//!
//! The tick path never fails: incomplete progress is a state, not an error.
//! Fallible surfaces are construction and configuration only.

use crate::config::{ProgressiveConfig, ViewerConfig};
use crate::events::{EventSink, ViewerEvent};
use crate::foundation::math::{ground_plane_transform, Aabb, Mat4};
use crate::foundation::time::{FrameClock, Stopwatch};
use crate::render::api::{
    AnimationController, DrawSink, GroundReflectionTarget, GroundShadowTarget,
    NavigationController, ProgressiveQueue, QueuePass, RenderContext,
};
use crate::render::frame::budget::FrameBudget;
use crate::render::frame::flags::{FrameState, InvalidationFlags};
use crate::render::frame::ground::{ReflectionOutcome, ReflectionUpdater, ShadowUpdater};
use crate::render::frame::phase::{AdvanceContext, PhaseMachine, PhaseTransition, RenderPhase};
use crate::scene::{BatchKey, BatchSet, Camera};
use crate::ViewerError;

/// Everything a tick borrows from the embedding layer
pub struct TickInputs<'a> {
    /// Monotonic timestamp of this display refresh, in milliseconds
    pub now_ms: f64,
    /// Current camera snapshot
    pub camera: &'a Camera,
    /// The scene's geometry batch table
    pub batches: &'a mut BatchSet,
    /// Time-sliced color queue
    pub queue: &'a mut dyn ProgressiveQueue,
    /// GPU-facing frame lifecycle
    pub context: &'a mut dyn RenderContext,
    /// Ground shadow target
    pub shadow_target: &'a mut dyn GroundShadowTarget,
    /// Ground reflection target
    pub reflection_target: &'a mut dyn GroundReflectionTarget,
    /// User navigation, polled for motion
    pub navigation: &'a mut dyn NavigationController,
    /// Animation playback, polled for motion
    pub animation: &'a mut dyn AnimationController,
    /// Receiver for outbound notifications
    pub events: &'a mut dyn EventSink,
}

/// What one tick accomplished
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Motion was observed this tick
    pub moved: bool,
    /// A new redraw cycle was started
    pub redraw_started: bool,
    /// Phase at the end of the tick
    pub phase: RenderPhase,
    /// Color-queue completion in [0, 1]
    pub progress: f32,
    /// Batches folded into the shadow build
    pub shadow_batches: usize,
    /// Reflection-pass activity
    pub reflection: ReflectionOutcome,
    /// A buffer was presented this tick
    pub presented: bool,
    /// Rolling average tick rate
    pub average_fps: f64,
}

/// Forwards queue draw requests to the render context
struct ContextSink<'a> {
    context: &'a mut dyn RenderContext,
}

impl DrawSink for ContextSink<'_> {
    fn draw(&mut self, batch: BatchKey) {
        self.context.draw_batch(batch);
    }
}

/// Top-level per-frame scheduler
///
/// Owns the invalidation flags, the adaptive budget, the phase machine, and
/// both ground-pass updaters. Collaborators are borrowed per tick so the
/// orchestrator carries no backend state of its own.
pub struct FrameOrchestrator {
    state: FrameState,
    clock: FrameClock,
    budget: FrameBudget,
    phases: PhaseMachine,
    shadow: ShadowUpdater,
    reflection: ReflectionUpdater,
    progressive: ProgressiveConfig,
    cached_bounds: Option<Aabb>,
    last_progress: Option<u32>,
}

impl FrameOrchestrator {
    /// Create an orchestrator from a validated configuration
    pub fn new(config: &ViewerConfig) -> Result<Self, ViewerError> {
        config.validate()?;
        Ok(Self {
            state: FrameState::new(),
            clock: FrameClock::new(),
            budget: FrameBudget::new(&config.frame),
            phases: PhaseMachine::new(),
            shadow: ShadowUpdater::new(config.ground.clone()),
            reflection: ReflectionUpdater::new(config.ground.clone()),
            progressive: config.progressive.clone(),
            cached_bounds: None,
            last_progress: None,
        })
    }

    /// Invalidation entry points for the embedding layer
    pub fn state_mut(&mut self) -> &mut FrameState {
        &mut self.state
    }

    /// Current invalidation state
    pub fn state(&self) -> &FrameState {
        &self.state
    }

    /// Current redraw phase
    pub fn phase(&self) -> RenderPhase {
        self.phases.phase()
    }

    /// The adaptive budget controller
    pub fn budget(&self) -> &FrameBudget {
        &self.budget
    }

    /// The frame clock
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Shadow-pass state (read-only)
    pub fn shadow_state(&self) -> &crate::render::frame::ground::GroundPassState {
        self.shadow.state()
    }

    /// Reflection-pass state (read-only)
    pub fn reflection_state(&self) -> &crate::render::frame::ground::GroundPassState {
        self.reflection.state()
    }

    /// Ground-plane placement for the current scene bounds
    ///
    /// Recomputed lazily after a `scene_dirty` invalidation.
    pub fn ground_transform(&mut self, batches: &BatchSet) -> Mat4 {
        let bounds = *self
            .cached_bounds
            .get_or_insert_with(|| batches.world_bounds());
        ground_plane_transform(&bounds)
    }

    /// Run one frame tick
    pub fn tick(&mut self, inputs: TickInputs<'_>) -> TickReport {
        let TickInputs {
            now_ms,
            camera,
            batches,
            queue,
            context,
            shadow_target,
            reflection_target,
            navigation,
            animation,
            events,
        } = inputs;

        self.clock.tick(now_ms);

        // (a) pending resize
        if let Some((width, height)) = self.state.take_pending_resize() {
            context.resize(width, height);
            events.emit(ViewerEvent::Resized { width, height });
        }

        // (b) motion: navigation, animation, programmatic camera updates,
        // and scene changes all count as movement for this tick
        let controls_moved = navigation.update(self.clock.delta_ms());
        let animation_moved = animation.update(self.clock.delta_ms());
        let moved = controls_moved
            || animation_moved
            || self.state.camera_updated()
            || self.state.scene_dirty();

        // (c) motion invalidates the frame and the overlay above it
        if moved {
            self.state
                .invalidate(InvalidationFlags::NEEDS_CLEAR | InvalidationFlags::OVERLAY_DIRTY);
        }

        // Geometry changes stale the cached bounds and both ground passes
        if self.state.scene_dirty() {
            self.cached_bounds = None;
            self.shadow.invalidate();
            self.reflection.invalidate();
            events.emit(ViewerEvent::SceneUpdated);
            self.state.clear_serviced(InvalidationFlags::SCENE_DIRTY);
        }

        // (d) begin a new redraw cycle when required
        let needs_clear = self.state.needs_clear();
        let restart = needs_clear || self.state.needs_render();
        if restart {
            if let Some(interval) = self.clock.avg_redraw_interval_ms() {
                self.budget.adjust(interval);
            }
            self.clock.begin_redraw(now_ms);

            // Camera motion invalidates the ground builds; a bare retry
            // (needs_render without motion) keeps them
            if moved {
                self.shadow.invalidate();
                self.reflection.invalidate();
            }
            self.shadow.mark_unrendered();
            self.reflection.mark_unrendered();

            let phase = self.phases.restart(queue.has_highlighted());
            queue.reset(camera, queue_pass(phase), needs_clear);
            context.begin_scene(camera, needs_clear);

            if moved {
                events.emit(ViewerEvent::CameraChanged);
            }
            self.last_progress = None;
            self.state.clear_serviced(
                InvalidationFlags::NEEDS_CLEAR
                    | InvalidationFlags::NEEDS_RENDER
                    | InvalidationFlags::CAMERA_UPDATED,
            );
        }

        // (e) ground passes advance regardless of color-queue pacing; once
        // motion stops they drain completely. Their measured cost comes out
        // of this tick's draw budget.
        let ground_timer = Stopwatch::start_new();
        let loading = queue.is_loading();
        let draw_all = !moved;
        let shadow_batches =
            self.shadow
                .update(batches, camera, shadow_target, loading, draw_all);
        let reflection = self.reflection.update(
            batches,
            camera,
            reflection_target,
            &self.shadow,
            shadow_target,
            queue.is_done(),
            loading,
            draw_all,
        );
        let ground_cost_ms = ground_timer.elapsed_millis();
        if shadow_batches > 0 || reflection.composited {
            // The image under the overlay changed
            self.state.invalidate(InvalidationFlags::OVERLAY_DIRTY);
        }

        let mut presented = false;
        if reflection.composited && queue.is_done() && self.phases.is_finished() {
            // A reflection landed after the cycle completed; show it now
            // rather than flashing an unshadowed frame next tick
            context.present();
            presented = true;
        }

        // (f) drive the color queue with whatever budget the ground passes
        // left over
        let mut drew = false;
        if !queue.is_empty() && !self.phases.is_finished() {
            let mut budget_ms = (self.budget.budget_for_tick(self.progressive.enabled)
                - ground_cost_ms)
                .max(0.0);
            loop {
                let mut sink = ContextSink { context: &mut *context };
                budget_ms = queue.render_some(&mut sink, budget_ms);
                drew = true;

                if !queue.is_done() {
                    // Budget exhausted mid-phase; the queue cursor resumes
                    // next tick
                    break;
                }

                // Passes that set an override material restore it before
                // the queue is reused
                if matches!(
                    self.phases.phase(),
                    RenderPhase::Highlighted | RenderPhase::Hidden
                ) {
                    queue.clear_override();
                }

                let advance = self.phases.advance(AdvanceContext {
                    all_visible: queue.all_visible(),
                    ghosting_enabled: self.progressive.ghosting_enabled,
                    reflection_settled: self.reflection.settled(
                        batches,
                        camera,
                        &*reflection_target,
                        loading,
                    ),
                });
                match advance {
                    PhaseTransition::Entered(RenderPhase::Finished) => {
                        context.render_overlay();
                        context.compose_final_frame(true);
                        context.present();
                        presented = true;
                        self.state.clear_serviced(InvalidationFlags::OVERLAY_DIRTY);
                        self.emit_progress(events, 100);
                        break;
                    }
                    PhaseTransition::Entered(next) => {
                        // Leftover budget rolls straight into the next
                        // phase in the same tick
                        queue.reset(camera, queue_pass(next), false);
                        if budget_ms <= 0.0 {
                            break;
                        }
                    }
                    PhaseTransition::Blocked | PhaseTransition::AlreadyFinished => break,
                }
            }

            if !self.phases.is_finished() {
                let percent = (queue.progress().clamp(0.0, 1.0) * 100.0) as u32;
                self.emit_progress(events, percent.min(99));
            }
        }

        // (g) overlay refresh for ticks that did not finish a cycle
        if self.state.overlay_dirty() {
            context.render_overlay();
            context.compose_final_frame(false);
            context.present();
            presented = true;
            self.state.clear_serviced(InvalidationFlags::OVERLAY_DIRTY);
        }

        // Failed page-outs surface as an automatic rerun, never an error
        if queue.needs_render() {
            self.state.invalidate(InvalidationFlags::NEEDS_RENDER);
            queue.clear_needs_render();
        }

        // (h)/(i) statistics and carried motion state
        self.state.set_last_tick_moved(moved);

        if drew || restart {
            log::trace!(
                "tick: phase {:?}, progress {:.0}%, budget {:.1} ms",
                self.phases.phase(),
                f64::from(queue.progress()) * 100.0,
                self.budget.target_ms()
            );
        }

        TickReport {
            moved,
            redraw_started: restart,
            phase: self.phases.phase(),
            progress: queue.progress(),
            shadow_batches,
            reflection,
            presented,
            average_fps: self.clock.average_fps(),
        }
    }

    fn emit_progress(&mut self, events: &mut dyn EventSink, percent: u32) {
        if self.last_progress != Some(percent) {
            events.emit(ViewerEvent::RenderProgress { percent });
            self.last_progress = Some(percent);
        }
    }
}

/// Queue override mode for a drawing phase
fn queue_pass(phase: RenderPhase) -> QueuePass {
    match phase {
        RenderPhase::Highlighted => QueuePass::Highlighted,
        RenderPhase::Hidden => QueuePass::Ghosted,
        // Finished never drives the queue; Normal is the no-override pass
        RenderPhase::Normal | RenderPhase::Finished => QueuePass::Normal,
    }
}
