//! Math utilities and types
//!
//! Provides the fundamental math types the viewer core needs: vector and
//! matrix aliases over nalgebra, an axis-aligned bounding box for world
//! bounds, and the ground-plane transform used by the shadow and reflection
//! passes.

pub use nalgebra::{Matrix4, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Axis-aligned bounding box in world space
///
/// Tracks the extent of all loaded geometry. The ground passes derive their
/// plane placement and coverage from this box, so it must be re-merged
/// whenever geometry is added or removed (`scene_dirty` invalidation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,

    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// An empty box that behaves as the identity for `merge`
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Create a box from explicit corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Whether the box contains no geometry
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Merge another box into this one
    pub fn merge(&mut self, other: &Aabb) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Length of the box diagonal
    pub fn diagonal(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            (self.max - self.min).norm()
        }
    }
}

/// Compute the ground-plane transform for a scene with the given bounds
///
/// Places a unit quad on the lowest Y extent of the bounds, scaled to cover
/// the scene footprint with a margin so shadows near the silhouette do not
/// clip. Returns identity for empty bounds (the ground passes skip in that
/// case anyway).
pub fn ground_plane_transform(bounds: &Aabb) -> Mat4 {
    if bounds.is_empty() {
        return Mat4::identity();
    }

    // 1.5x footprint margin keeps contact shadows inside the plane
    let center = bounds.center();
    let extent = (bounds.max - bounds.min) * 0.5;
    let radius = extent.x.hypot(extent.z).max(f32::EPSILON) * 1.5;

    let translation = Mat4::new_translation(&Vec3::new(center.x, bounds.min.y, center.z));
    let scale = Mat4::new_nonuniform_scaling(&Vec3::new(radius, 1.0, radius));
    translation * scale
}
