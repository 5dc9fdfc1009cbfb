//! Progressive rendering demo
//!
//! Runs the frame orchestrator headless against in-memory collaborators:
//! a synthetic scene of geometry batches, a software color queue with a
//! fixed per-batch draw cost, and counting ground targets. The demo orbits
//! the camera for a while (ticks stay partial), then stops and logs how
//! the image converges to a complete frame.

use viewer_engine::config::{GroundPassConfig, ViewerConfig};
use viewer_engine::events::{CollectedEvents, ViewerEvent};
use viewer_engine::foundation::math::{Aabb, Vec3};
use viewer_engine::render::api::{
    DrawSink, GroundReflectionTarget, GroundShadowTarget, NavigationController,
    ProgressiveQueue, QueuePass, RenderContext, StaticController,
};
use viewer_engine::render::frame::{FrameOrchestrator, RenderPhase, TickInputs};
use viewer_engine::scene::{BatchKey, BatchSet, Camera};

/// Batches in the synthetic scene
const BATCH_COUNT: usize = 400;

/// Simulated CPU cost of issuing one batch draw, in milliseconds
const DRAW_COST_MS: f64 = 0.25;

/// Software color queue over the demo scene
///
/// Walks the batch table in order for the pass's population and charges a
/// fixed cost per draw against the budget.
struct SoftwareQueue {
    keys: Vec<BatchKey>,
    highlighted: Vec<BatchKey>,
    hidden: Vec<BatchKey>,
    pass: QueuePass,
    cursor: usize,
    drawn_total: usize,
}

impl SoftwareQueue {
    fn new(batches: &BatchSet) -> Self {
        let keys: Vec<_> = batches.keys().collect();
        Self {
            keys,
            highlighted: Vec::new(),
            hidden: Vec::new(),
            pass: QueuePass::Normal,
            cursor: 0,
            drawn_total: 0,
        }
    }

    fn pass_items(&self) -> &[BatchKey] {
        match self.pass {
            QueuePass::Highlighted => &self.highlighted,
            QueuePass::Normal => &self.keys,
            QueuePass::Ghosted => &self.hidden,
        }
    }

    fn total_items(&self) -> usize {
        self.highlighted.len() + self.keys.len() + self.hidden.len()
    }
}

impl ProgressiveQueue for SoftwareQueue {
    fn reset(&mut self, _camera: &Camera, pass: QueuePass, clear: bool) {
        self.pass = pass;
        self.cursor = 0;
        if clear {
            self.drawn_total = 0;
        }
    }

    fn render_some(&mut self, sink: &mut dyn DrawSink, budget_ms: f64) -> f64 {
        let mut remaining = budget_ms;
        while self.cursor < self.pass_items().len() && remaining >= DRAW_COST_MS {
            sink.draw(self.pass_items()[self.cursor]);
            self.cursor += 1;
            self.drawn_total += 1;
            if remaining.is_finite() {
                remaining -= DRAW_COST_MS;
            }
        }
        remaining
    }

    fn clear_override(&mut self) {}

    fn is_empty(&self) -> bool {
        self.total_items() == 0
    }

    fn is_done(&self) -> bool {
        self.cursor >= self.pass_items().len()
    }

    fn has_highlighted(&self) -> bool {
        !self.highlighted.is_empty()
    }

    fn all_visible(&self) -> bool {
        self.hidden.is_empty()
    }

    fn progress(&self) -> f32 {
        let total = self.total_items();
        if total == 0 {
            1.0
        } else {
            self.drawn_total as f32 / total as f32
        }
    }

    fn needs_render(&self) -> bool {
        false
    }

    fn clear_needs_render(&mut self) {}

    fn is_loading(&self) -> bool {
        false
    }
}

/// Counting render context standing in for the GPU layer
#[derive(Default)]
struct CountingContext {
    draws: usize,
    presents: usize,
    composites: usize,
}

impl RenderContext for CountingContext {
    fn resize(&mut self, width: u32, height: u32) {
        log::info!("surface resized to {width}x{height}");
    }
    fn begin_scene(&mut self, _camera: &Camera, _clear: bool) {}
    fn draw_batch(&mut self, _batch: BatchKey) {
        self.draws += 1;
    }
    fn render_overlay(&mut self) {}
    fn compose_final_frame(&mut self, _final_pass: bool) {
        self.composites += 1;
    }
    fn present(&mut self) {
        self.presents += 1;
    }
}

#[derive(Default)]
struct CountingShadow {
    accumulated: usize,
    valid: bool,
}

impl GroundShadowTarget for CountingShadow {
    fn clear(&mut self) {
        self.accumulated = 0;
        self.valid = false;
    }
    fn render_into(&mut self, _batch: BatchKey) {
        self.accumulated += 1;
    }
    fn postprocess(&mut self) {
        self.valid = true;
    }
    fn composite(&mut self, _camera: &Camera) {}
    fn composite_into_reflection(&mut self) {}
    fn is_valid(&self) -> bool {
        self.valid
    }
}

struct CountingReflection {
    scene_bounds: Aabb,
    accumulated: usize,
}

impl GroundReflectionTarget for CountingReflection {
    fn clear(&mut self) {
        self.accumulated = 0;
    }
    fn render_into(&mut self, _batch: BatchKey) {
        self.accumulated += 1;
    }
    fn postprocess(&mut self) {}
    fn composite(&mut self, _camera: &Camera) {}
    fn is_ground_culled(&self, camera: &Camera) -> bool {
        camera.ground_culled(&self.scene_bounds)
    }
    fn is_valid(&self) -> bool {
        true
    }
}

/// Orbit for a fixed number of ticks, then hold still
struct TimedOrbit {
    remaining_ticks: u32,
}

impl NavigationController for TimedOrbit {
    fn update(&mut self, _delta_ms: f64) -> bool {
        if self.remaining_ticks > 0 {
            self.remaining_ticks -= 1;
            true
        } else {
            false
        }
    }
}

fn build_scene() -> BatchSet {
    let mut batches = BatchSet::new();
    for i in 0..BATCH_COUNT {
        let x = (i % 20) as f32 * 2.0;
        let z = (i / 20) as f32 * 2.0;
        batches.insert(Aabb::new(
            Vec3::new(x, 0.0, z),
            Vec3::new(x + 1.0, 1.5, z + 1.0),
        ));
    }
    batches
}

fn main() {
    viewer_engine::foundation::logging::init();

    let config = ViewerConfig::default()
        .with_ground(GroundPassConfig::new().with_reflection(true));
    let mut orchestrator = match FrameOrchestrator::new(&config) {
        Ok(orchestrator) => orchestrator,
        Err(error) => {
            log::error!("failed to create orchestrator: {error}");
            std::process::exit(1);
        }
    };

    let mut batches = build_scene();
    let camera = Camera::new(Vec3::new(30.0, 25.0, 45.0), Vec3::new(20.0, 0.0, 10.0));
    let mut queue = SoftwareQueue::new(&batches);
    let mut context = CountingContext::default();
    let mut shadow = CountingShadow::default();
    let mut reflection = CountingReflection {
        scene_bounds: batches.world_bounds(),
        accumulated: 0,
    };
    let mut events = CollectedEvents::new();
    let mut navigation = TimedOrbit { remaining_ticks: 30 };

    log::info!(
        "scene: {} batches, {:.2} ms per draw ({} ms total draw cost)",
        BATCH_COUNT,
        DRAW_COST_MS,
        BATCH_COUNT as f64 * DRAW_COST_MS
    );

    let mut now_ms = 0.0;
    let mut ticks = 0;
    loop {
        now_ms += 16.7;
        ticks += 1;
        let report = orchestrator.tick(TickInputs {
            now_ms,
            camera: &camera,
            batches: &mut batches,
            queue: &mut queue,
            context: &mut context,
            shadow_target: &mut shadow,
            reflection_target: &mut reflection,
            navigation: &mut navigation,
            animation: &mut StaticController,
            events: &mut events,
        });

        if report.redraw_started {
            log::debug!(
                "tick {ticks}: redraw restarted, budget {:.1} ms",
                orchestrator.budget().target_ms()
            );
        }

        if report.phase == RenderPhase::Finished && !report.moved {
            log::info!(
                "converged after {ticks} ticks: {} draws, {} presents, \
                 shadow batches {}, reflection batches {}",
                context.draws,
                context.presents,
                shadow.accumulated,
                reflection.accumulated
            );
            break;
        }

        if ticks > 10_000 {
            log::error!("no convergence after {ticks} ticks");
            std::process::exit(1);
        }
    }

    let milestones: Vec<_> = events
        .events()
        .iter()
        .filter(|event| matches!(event, ViewerEvent::RenderProgress { .. }))
        .collect();
    log::info!("progress events emitted: {}", milestones.len());
    log::info!("average fps over run: {:.1}", orchestrator.clock().average_fps());
}
