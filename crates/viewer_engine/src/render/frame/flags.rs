//! Frame invalidation tracking
//!
//! External events never invoke drawing directly; they set flags here and
//! the orchestrator services them on the next tick. A flag set true stays
//! true until a tick actually performs the corresponding work.

use bitflags::bitflags;

bitflags! {
    /// Pending-work flags consumed by the orchestrator
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InvalidationFlags: u8 {
        /// The color target must be cleared and a new redraw cycle started
        const NEEDS_CLEAR = 1 << 0;
        /// A redraw is required without clearing (page-out retry)
        const NEEDS_RENDER = 1 << 1;
        /// The post-scene overlay layer must be re-rendered
        const OVERLAY_DIRTY = 1 << 2;
        /// Geometry changed; cached world bounds and ground passes are stale
        const SCENE_DIRTY = 1 << 3;
        /// The camera was programmatically updated
        const CAMERA_UPDATED = 1 << 4;
    }
}

/// Invalidation flags plus the carried-over motion state
///
/// Owned exclusively by the orchestrator; everything else reaches it
/// through the `note_*` methods.
#[derive(Debug, Default)]
pub struct FrameState {
    flags: InvalidationFlags,
    last_tick_moved: bool,
    pending_resize: Option<(u32, u32)>,
}

impl FrameState {
    /// Fresh state with an initial full redraw pending
    pub fn new() -> Self {
        Self {
            flags: InvalidationFlags::NEEDS_CLEAR | InvalidationFlags::OVERLAY_DIRTY,
            last_tick_moved: false,
            pending_resize: None,
        }
    }

    /// Raise flags directly
    pub fn invalidate(&mut self, flags: InvalidationFlags) {
        self.flags |= flags;
    }

    /// Clear exactly the flags whose work was performed this tick
    pub fn clear_serviced(&mut self, flags: InvalidationFlags) {
        self.flags &= !flags;
    }

    /// Current flag set
    pub fn flags(&self) -> InvalidationFlags {
        self.flags
    }

    /// Whether a full clear-and-redraw is pending
    pub fn needs_clear(&self) -> bool {
        self.flags.contains(InvalidationFlags::NEEDS_CLEAR)
    }

    /// Whether a redraw without clear is pending
    pub fn needs_render(&self) -> bool {
        self.flags.contains(InvalidationFlags::NEEDS_RENDER)
    }

    /// Whether the overlay layer is stale
    pub fn overlay_dirty(&self) -> bool {
        self.flags.contains(InvalidationFlags::OVERLAY_DIRTY)
    }

    /// Whether geometry changed since the last serviced tick
    pub fn scene_dirty(&self) -> bool {
        self.flags.contains(InvalidationFlags::SCENE_DIRTY)
    }

    /// Whether the camera was programmatically updated
    pub fn camera_updated(&self) -> bool {
        self.flags.contains(InvalidationFlags::CAMERA_UPDATED)
    }

    /// Whether the previous tick observed motion
    pub fn last_tick_moved(&self) -> bool {
        self.last_tick_moved
    }

    /// Record this tick's motion state for the next tick
    pub fn set_last_tick_moved(&mut self, moved: bool) {
        self.last_tick_moved = moved;
    }

    /// Take a pending resize, if any
    pub fn take_pending_resize(&mut self) -> Option<(u32, u32)> {
        self.pending_resize.take()
    }

    // External-event entry points. Each maps an event to the flag set it
    // dirties; none draws anything.

    /// The drawing surface was resized
    pub fn note_resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some((width, height));
        self.invalidate(InvalidationFlags::NEEDS_CLEAR | InvalidationFlags::OVERLAY_DIRTY);
    }

    /// A model or geometry batch was added or removed
    pub fn note_scene_changed(&mut self) {
        self.invalidate(
            InvalidationFlags::SCENE_DIRTY
                | InvalidationFlags::NEEDS_CLEAR
                | InvalidationFlags::OVERLAY_DIRTY,
        );
    }

    /// The camera was updated programmatically (fit, saved view, home)
    pub fn note_camera_updated(&mut self) {
        self.invalidate(InvalidationFlags::CAMERA_UPDATED | InvalidationFlags::NEEDS_CLEAR);
    }

    /// Selection/highlight set changed
    pub fn note_selection_changed(&mut self) {
        self.invalidate(InvalidationFlags::NEEDS_CLEAR | InvalidationFlags::OVERLAY_DIRTY);
    }

    /// Theming, lighting, or exposure changed
    pub fn note_appearance_changed(&mut self) {
        self.invalidate(InvalidationFlags::NEEDS_CLEAR);
    }

    /// An explode or cut-plane edit moved geometry
    pub fn note_model_transformed(&mut self) {
        self.invalidate(InvalidationFlags::SCENE_DIRTY | InvalidationFlags::NEEDS_CLEAR);
    }
}
