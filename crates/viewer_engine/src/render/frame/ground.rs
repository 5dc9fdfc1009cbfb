//! Incremental ground shadow and reflection updaters
//!
//! Both passes walk the full geometry batch sequence, which can be far too
//! expensive for one frame, so each keeps a cursor and processes a bounded
//! slice per tick. Pacing is independent of the color queue's budget: the
//! cursors advance even on ticks where the color pass is idle, so the
//! ground passes converge on their own schedule.
//!
//! Invalidation is cursor-reset, not cancellation: a camera or geometry
//! change raises `needs_clear`, the next update restarts from batch zero,
//! and whatever the previous build accumulated is discarded.

use crate::config::GroundPassConfig;
use crate::render::api::{GroundReflectionTarget, GroundShadowTarget};
use crate::scene::{BatchSet, Camera};

/// Cursor and completion state for one incremental ground pass
#[derive(Debug, Clone)]
pub struct GroundPassState {
    /// Whether this pass runs at all
    pub enabled: bool,
    /// The pass must restart from batch zero before advancing further
    pub needs_clear: bool,
    /// The pass result has been composited this redraw cycle
    pub rendered: bool,
    /// The cursor has reached the end and postprocessing ran
    pub finished: bool,
    /// Next batch index to process; monotonic within a cycle
    pub cursor: usize,
    /// Batch count captured at the last reset
    pub total_batches: usize,
    /// Batches processed per advancing tick
    pub batches_per_frame: usize,
    /// Batch-table generation this pass was built against
    generation: Option<u64>,
}

impl GroundPassState {
    /// Create state for a pass; disabled passes never advance
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            needs_clear: true,
            rendered: false,
            finished: false,
            cursor: 0,
            total_batches: 0,
            batches_per_frame: 0,
            generation: None,
        }
    }

    /// Force a restart from batch zero on the next update
    pub fn invalidate(&mut self) {
        self.needs_clear = true;
    }

    /// A new redraw cycle began; the result must be composited again but
    /// the accumulated build survives
    pub fn mark_unrendered(&mut self) {
        self.rendered = false;
    }

    /// Whether the pass should do any work for the given scene state
    fn active(&self, batches: &BatchSet, camera: &Camera, loading: bool) -> bool {
        self.enabled && !camera.is_2d && !batches.is_empty() && !loading
    }

    /// Restart the cursor if a clear is pending or the batch sequence is no
    /// longer the one this pass was built against
    ///
    /// Returns true when a restart happened.
    fn reset_if_stale(&mut self, batches: &BatchSet, config: &GroundPassConfig) -> bool {
        let identity_changed = self.generation != Some(batches.generation());
        if !self.needs_clear && !identity_changed {
            return false;
        }
        self.cursor = 0;
        self.total_batches = batches.len();
        self.batches_per_frame = config.batches_per_frame(self.total_batches);
        self.rendered = false;
        self.finished = false;
        self.needs_clear = false;
        self.generation = Some(batches.generation());
        true
    }

    /// Claim the batch index range to process this tick
    fn claim_slice(&mut self, draw_all: bool) -> std::ops::Range<usize> {
        let remaining = self.total_batches - self.cursor;
        let count = if draw_all {
            remaining
        } else {
            self.batches_per_frame.min(remaining)
        };
        let start = self.cursor;
        self.cursor += count;
        start..self.cursor
    }
}

/// Incremental ground contact-shadow updater
#[derive(Debug)]
pub struct ShadowUpdater {
    state: GroundPassState,
    config: GroundPassConfig,
}

impl ShadowUpdater {
    /// Create an updater with the given pacing configuration
    pub fn new(config: GroundPassConfig) -> Self {
        Self {
            state: GroundPassState::new(config.shadow_enabled),
            config,
        }
    }

    /// Pass state, for overlay-dirty propagation and tests
    pub fn state(&self) -> &GroundPassState {
        &self.state
    }

    /// Force a restart on the next update
    pub fn invalidate(&mut self) {
        self.state.invalidate();
    }

    /// A new redraw cycle began; recomposite without rebuilding
    pub fn mark_unrendered(&mut self) {
        self.state.mark_unrendered();
    }

    /// Advance the shadow build and composite when complete
    ///
    /// `draw_all` collapses the remaining work into this tick (used once
    /// motion stops). Returns the number of batches processed.
    pub fn update(
        &mut self,
        batches: &mut BatchSet,
        camera: &Camera,
        target: &mut dyn GroundShadowTarget,
        loading: bool,
        draw_all: bool,
    ) -> usize {
        if !self.state.active(batches, camera, loading) {
            return 0;
        }

        if self.state.reset_if_stale(batches, &self.config) {
            target.clear();
        }

        let mut advanced = 0;
        if self.state.cursor < self.state.total_batches {
            let slice = self.state.claim_slice(draw_all);
            for index in slice {
                let Some(key) = batches.key_at(index) else {
                    continue;
                };
                // Hidden batches still cast during their contribution render
                batches.set_force_visible(key);
                target.render_into(key);
                batches.clear_force_visible(key);
                advanced += 1;
            }
            if self.state.cursor >= self.state.total_batches {
                target.postprocess();
                self.state.finished = true;
                log::debug!(
                    "ground shadow build complete ({} batches)",
                    self.state.total_batches
                );
            }
        }

        if self.state.finished && !self.state.rendered && target.is_valid() {
            target.composite(camera);
            self.state.rendered = true;
        }

        advanced
    }

    /// Draw the finished shadow into the reflection's own target
    pub fn composite_into_reflection(&self, target: &mut dyn GroundShadowTarget) {
        if self.state.finished && target.is_valid() {
            target.composite_into_reflection();
        }
    }
}

/// What a reflection update accomplished this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReflectionOutcome {
    /// Batches folded into the reflection build
    pub advanced: usize,
    /// The reflection (with its shadow) was composited onto the frame
    pub composited: bool,
}

/// Incremental ground reflection updater
///
/// Unlike the shadow pass, completion and composition are tracked
/// separately: a finished build may wait on color-pass state before it is
/// drawn, and a progressive interleave may composite an unfinished build.
#[derive(Debug)]
pub struct ReflectionUpdater {
    state: GroundPassState,
    config: GroundPassConfig,
}

impl ReflectionUpdater {
    /// Create an updater with the given pacing configuration
    pub fn new(config: GroundPassConfig) -> Self {
        Self {
            state: GroundPassState::new(config.reflection_enabled),
            config,
        }
    }

    /// Pass state, for overlay-dirty propagation and tests
    pub fn state(&self) -> &GroundPassState {
        &self.state
    }

    /// Force a restart on the next update
    pub fn invalidate(&mut self) {
        self.state.invalidate();
    }

    /// A new redraw cycle began; recomposite without rebuilding
    pub fn mark_unrendered(&mut self) {
        self.state.mark_unrendered();
    }

    /// Whether any in-progress reflection has settled for phase gating
    ///
    /// A pass that will never run for the current scene state (disabled,
    /// 2D view, empty scene, still loading) counts as trivially settled,
    /// as do culled and invalid targets, so none of them ever blocks the
    /// ghosted phase.
    pub fn settled(
        &self,
        batches: &BatchSet,
        camera: &Camera,
        target: &dyn GroundReflectionTarget,
        loading: bool,
    ) -> bool {
        if !self.state.active(batches, camera, loading) || self.state.finished {
            return true;
        }
        target.is_ground_culled(camera) || !target.is_valid()
    }

    /// Advance the reflection build and composite when permitted
    ///
    /// Composition requires (finished OR the color queue is still mid-pass,
    /// where progressive interleaving is acceptable) AND the ground plane
    /// in view. The shadow is drawn into the reflection target first so
    /// reflections carry shadows; the orchestrator handles what follows a
    /// composite on a fully-done queue (ghosted phase or present).
    pub fn update(
        &mut self,
        batches: &mut BatchSet,
        camera: &Camera,
        target: &mut dyn GroundReflectionTarget,
        shadow: &ShadowUpdater,
        shadow_target: &mut dyn GroundShadowTarget,
        queue_done: bool,
        loading: bool,
        draw_all: bool,
    ) -> ReflectionOutcome {
        let mut outcome = ReflectionOutcome::default();
        if !self.state.active(batches, camera, loading) {
            return outcome;
        }

        if self.state.reset_if_stale(batches, &self.config) {
            target.clear();
        }

        if self.state.cursor < self.state.total_batches {
            let slice = self.state.claim_slice(draw_all);
            for index in slice {
                let Some(key) = batches.key_at(index) else {
                    continue;
                };
                batches.set_force_visible(key);
                target.render_into(key);
                batches.clear_force_visible(key);
                outcome.advanced += 1;
            }
            // New content invalidates the previously composited result
            if outcome.advanced > 0 {
                self.state.rendered = false;
            }
            if self.state.cursor >= self.state.total_batches {
                target.postprocess();
                self.state.finished = true;
                log::debug!(
                    "ground reflection build complete ({} batches)",
                    self.state.total_batches
                );
            }
        }

        let may_composite = self.state.finished || !queue_done;
        if may_composite
            && !self.state.rendered
            && target.is_valid()
            && !target.is_ground_culled(camera)
        {
            shadow.composite_into_reflection(shadow_target);
            target.composite(camera);
            self.state.rendered = true;
            outcome.composited = true;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Aabb, Vec3};
    use crate::scene::BatchKey;

    #[derive(Default)]
    struct RecordingShadow {
        cleared: u32,
        rendered: Vec<BatchKey>,
        postprocessed: u32,
        composited: u32,
        composited_into_reflection: u32,
    }

    impl GroundShadowTarget for RecordingShadow {
        fn clear(&mut self) {
            self.cleared += 1;
        }
        fn render_into(&mut self, batch: BatchKey) {
            self.rendered.push(batch);
        }
        fn postprocess(&mut self) {
            self.postprocessed += 1;
        }
        fn composite(&mut self, _camera: &Camera) {
            self.composited += 1;
        }
        fn composite_into_reflection(&mut self) {
            self.composited_into_reflection += 1;
        }
        fn is_valid(&self) -> bool {
            self.postprocessed > 0
        }
    }

    #[derive(Default)]
    struct RecordingReflection {
        cleared: u32,
        rendered: Vec<BatchKey>,
        postprocessed: u32,
        composited: u32,
        culled: bool,
    }

    impl GroundReflectionTarget for RecordingReflection {
        fn clear(&mut self) {
            self.cleared += 1;
        }
        fn render_into(&mut self, batch: BatchKey) {
            self.rendered.push(batch);
        }
        fn postprocess(&mut self) {
            self.postprocessed += 1;
        }
        fn composite(&mut self, _camera: &Camera) {
            self.composited += 1;
        }
        fn is_ground_culled(&self, _camera: &Camera) -> bool {
            self.culled
        }
        fn is_valid(&self) -> bool {
            true
        }
    }

    fn scene_with(batch_count: usize) -> BatchSet {
        let mut batches = BatchSet::new();
        for i in 0..batch_count {
            batches.insert(Aabb::new(
                Vec3::new(i as f32, 0.0, 0.0),
                Vec3::new(i as f32 + 1.0, 1.0, 1.0),
            ));
        }
        batches
    }

    fn camera() -> Camera {
        Camera::default()
    }

    #[test]
    fn test_shadow_converges_in_bounded_ticks() {
        // N=95, ceiling 10 frames, floor 10 => 10 batches/tick, 10 ticks
        let mut batches = scene_with(95);
        let mut updater = ShadowUpdater::new(GroundPassConfig::new());
        let mut target = RecordingShadow::default();
        let camera = camera();

        let mut advancing_ticks = 0;
        while !updater.state().finished {
            let advanced = updater.update(&mut batches, &camera, &mut target, false, false);
            assert!(advanced > 0, "updater stalled before finishing");
            advancing_ticks += 1;
            assert!(advancing_ticks <= 10, "took more than ceil(95/10) ticks");
        }
        assert_eq!(advancing_ticks, 10);
        assert_eq!(updater.state().cursor, 95);
        assert_eq!(target.rendered.len(), 95);
        assert_eq!(target.postprocessed, 1);
        assert_eq!(target.composited, 1);
    }

    #[test]
    fn test_shadow_cursor_monotonic_and_resets_only_on_clear() {
        let mut batches = scene_with(30);
        let mut updater = ShadowUpdater::new(GroundPassConfig::new());
        let mut target = RecordingShadow::default();
        let camera = camera();

        updater.update(&mut batches, &camera, &mut target, false, false);
        let after_first = updater.state().cursor;
        updater.update(&mut batches, &camera, &mut target, false, false);
        assert!(updater.state().cursor >= after_first);

        updater.invalidate();
        updater.update(&mut batches, &camera, &mut target, false, false);
        // Restarted from zero, then advanced one slice
        assert_eq!(updater.state().cursor, updater.state().batches_per_frame);
        assert_eq!(target.cleared, 2);
    }

    #[test]
    fn test_shadow_detects_batch_identity_change() {
        let mut batches = scene_with(5);
        let mut updater = ShadowUpdater::new(GroundPassConfig::new());
        let mut target = RecordingShadow::default();
        let camera = camera();

        updater.update(&mut batches, &camera, &mut target, false, true);
        assert!(updater.state().finished);

        // Geometry arrival changes the sequence identity; next update resets
        batches.insert(Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)));
        updater.update(&mut batches, &camera, &mut target, false, true);
        assert_eq!(target.cleared, 2);
        assert_eq!(updater.state().total_batches, 6);
        assert!(updater.state().finished);
    }

    #[test]
    fn test_shadow_skips_when_disabled_2d_empty_or_loading() {
        let config = GroundPassConfig::new();
        let mut target = RecordingShadow::default();
        let camera_3d = camera();

        let mut disabled = ShadowUpdater::new(config.clone().with_shadow(false));
        let mut batches = scene_with(4);
        assert_eq!(
            disabled.update(&mut batches, &camera_3d, &mut target, false, false),
            0
        );

        let mut updater = ShadowUpdater::new(config);
        let mut flat_camera = camera();
        flat_camera.is_2d = true;
        assert_eq!(
            updater.update(&mut batches, &flat_camera, &mut target, false, false),
            0
        );

        let mut empty = BatchSet::new();
        assert_eq!(
            updater.update(&mut empty, &camera_3d, &mut target, false, false),
            0
        );
        assert_eq!(
            updater.update(&mut batches, &camera_3d, &mut target, true, false),
            0
        );
        assert!(target.rendered.is_empty());
    }

    #[test]
    fn test_shadow_draw_all_finishes_in_one_tick() {
        let mut batches = scene_with(95);
        let mut updater = ShadowUpdater::new(GroundPassConfig::new());
        let mut target = RecordingShadow::default();
        let advanced = updater.update(&mut batches, &camera(), &mut target, false, true);
        assert_eq!(advanced, 95);
        assert!(updater.state().finished);
    }

    #[test]
    fn test_shadow_composites_once_per_cycle() {
        let mut batches = scene_with(5);
        let mut updater = ShadowUpdater::new(GroundPassConfig::new());
        let mut target = RecordingShadow::default();
        let camera = camera();

        updater.update(&mut batches, &camera, &mut target, false, true);
        updater.update(&mut batches, &camera, &mut target, false, true);
        assert_eq!(target.composited, 1);

        // New redraw cycle recomposites without rebuilding
        updater.mark_unrendered();
        updater.update(&mut batches, &camera, &mut target, false, true);
        assert_eq!(target.composited, 2);
        assert_eq!(target.rendered.len(), 5);
    }

    #[test]
    fn test_force_visible_cleared_after_contribution() {
        let mut batches = scene_with(3);
        let keys: Vec<_> = batches.keys().collect();
        for key in &keys {
            batches.set_visible(*key, false);
        }
        let mut updater = ShadowUpdater::new(GroundPassConfig::new());
        let mut target = RecordingShadow::default();

        updater.update(&mut batches, &camera(), &mut target, false, true);
        assert_eq!(target.rendered.len(), 3);
        for key in keys {
            assert!(!batches.is_visible(key));
        }
    }

    #[test]
    fn test_reflection_tracks_finished_and_rendered_separately() {
        let mut batches = scene_with(20);
        let config = GroundPassConfig::new().with_reflection(true);
        let shadow = ShadowUpdater::new(config.clone());
        let mut shadow_target = RecordingShadow::default();
        let mut updater = ReflectionUpdater::new(config);
        let mut target = RecordingReflection::default();
        let camera = camera();

        // Mid-pass composite is allowed while the color queue is not done
        let outcome = updater.update(
            &mut batches,
            &camera,
            &mut target,
            &shadow,
            &mut shadow_target,
            false,
            false,
            false,
        );
        assert_eq!(outcome.advanced, 10);
        assert!(outcome.composited);
        assert!(!updater.state().finished);

        let outcome = updater.update(
            &mut batches,
            &camera,
            &mut target,
            &shadow,
            &mut shadow_target,
            false,
            false,
            false,
        );
        assert!(updater.state().finished);
        assert!(outcome.composited);
        assert_eq!(target.composited, 2);
    }

    #[test]
    fn test_reflection_waits_when_unfinished_and_queue_done() {
        let mut batches = scene_with(20);
        let config = GroundPassConfig::new().with_reflection(true);
        let shadow = ShadowUpdater::new(config.clone());
        let mut shadow_target = RecordingShadow::default();
        let mut updater = ReflectionUpdater::new(config);
        let mut target = RecordingReflection::default();

        let outcome = updater.update(
            &mut batches,
            &camera(),
            &mut target,
            &shadow,
            &mut shadow_target,
            true,
            false,
            false,
        );
        assert_eq!(outcome.advanced, 10);
        assert!(!outcome.composited, "unfinished build must wait on a done queue");
    }

    #[test]
    fn test_reflection_culled_never_composites_but_is_settled() {
        let mut batches = scene_with(10);
        let config = GroundPassConfig::new().with_reflection(true);
        let shadow = ShadowUpdater::new(config.clone());
        let mut shadow_target = RecordingShadow::default();
        let mut updater = ReflectionUpdater::new(config);
        let mut target = RecordingReflection {
            culled: true,
            ..RecordingReflection::default()
        };
        let camera = camera();

        assert!(updater.settled(&batches, &camera, &target, false));
        let outcome = updater.update(
            &mut batches,
            &camera,
            &mut target,
            &shadow,
            &mut shadow_target,
            false,
            false,
            true,
        );
        assert!(!outcome.composited);
        assert!(updater.state().finished);
    }

    #[test]
    fn test_reflection_composite_includes_finished_shadow() {
        let mut batches = scene_with(5);
        let config = GroundPassConfig::new().with_reflection(true);
        let mut shadow = ShadowUpdater::new(config.clone());
        let mut shadow_target = RecordingShadow::default();
        let mut updater = ReflectionUpdater::new(config);
        let mut target = RecordingReflection::default();
        let camera = camera();

        shadow.update(&mut batches, &camera, &mut shadow_target, false, true);
        updater.update(
            &mut batches,
            &camera,
            &mut target,
            &shadow,
            &mut shadow_target,
            false,
            false,
            true,
        );
        assert_eq!(shadow_target.composited_into_reflection, 1);
        assert_eq!(target.composited, 1);
    }

    #[test]
    fn test_disabled_reflection_always_settled() {
        let config = GroundPassConfig::new().with_reflection(false);
        let updater = ReflectionUpdater::new(config);
        let target = RecordingReflection::default();
        let batches = scene_with(3);
        assert!(updater.settled(&batches, &camera(), &target, false));
    }

    #[test]
    fn test_reflection_settled_when_pass_cannot_run() {
        // Enabled but never able to run: the gate must still open
        let config = GroundPassConfig::new().with_reflection(true);
        let updater = ReflectionUpdater::new(config);
        let target = RecordingReflection::default();
        let batches = scene_with(3);

        let mut flat_camera = camera();
        flat_camera.is_2d = true;
        assert!(updater.settled(&batches, &flat_camera, &target, false));

        let empty = BatchSet::new();
        assert!(updater.settled(&empty, &camera(), &target, false));

        assert!(updater.settled(&batches, &camera(), &target, true));

        // A runnable pass that has not finished still holds the gate
        assert!(!updater.settled(&batches, &camera(), &target, false));
    }
}
