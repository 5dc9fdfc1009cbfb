//! Minimal camera state for the scheduling core
//!
//! Projection math and navigation belong to the embedding layers; the
//! scheduler only needs enough view state to decide whether the ground
//! plane is worth drawing and to hand a camera snapshot to the color queue
//! on each pass reset.

use crate::foundation::math::{Aabb, Vec3};

/// View state consumed by the frame orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position in world space
    pub position: Vec3,

    /// Look-at target in world space
    pub target: Vec3,

    /// Whether the scene is being viewed in 2D mode (sheets, drawings);
    /// ground passes are skipped entirely in 2D
    pub is_2d: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 10.0),
            target: Vec3::zeros(),
            is_2d: false,
        }
    }
}

impl Camera {
    /// Create a 3D camera at `position` looking at `target`
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            is_2d: false,
        }
    }

    /// Whether the ground plane under `bounds` is fully out of view
    ///
    /// The plane sits at the lowest Y extent of the scene. From underneath
    /// it (eye at or below plane height) neither the shadow nor the
    /// reflection is visible, so both passes can skip compositing.
    pub fn ground_culled(&self, bounds: &Aabb) -> bool {
        if bounds.is_empty() {
            return true;
        }
        self.position.y <= bounds.min.y
    }
}
