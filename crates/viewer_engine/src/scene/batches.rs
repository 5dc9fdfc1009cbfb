//! Geometry batch table
//!
//! A batch is the unit of progressive work: an independently drawable chunk
//! of model geometry. The table keeps insertion order (the color queue and
//! ground passes walk batches by index), per-batch visibility, and a
//! force-visible override used while a batch contributes to a ground pass.
//!
//! The table's generation counter changes on any structural edit so the
//! ground updaters can detect that the sequence they were walking is no
//! longer the same one and reset their cursors.

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::Aabb;

new_key_type! {
    /// Opaque handle to a geometry batch
    pub struct BatchKey;
}

#[derive(Debug, Clone)]
struct Batch {
    bounds: Aabb,
    visible: bool,
    highlighted: bool,
    force_visible: bool,
}

/// Ordered table of geometry batches
#[derive(Debug, Default)]
pub struct BatchSet {
    batches: SlotMap<BatchKey, Batch>,
    order: Vec<BatchKey>,
    generation: u64,
}

impl BatchSet {
    /// Create an empty batch table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch with the given world bounds; returns its handle
    pub fn insert(&mut self, bounds: Aabb) -> BatchKey {
        let key = self.batches.insert(Batch {
            bounds,
            visible: true,
            highlighted: false,
            force_visible: false,
        });
        self.order.push(key);
        self.generation += 1;
        key
    }

    /// Remove a batch; no-op for stale handles
    pub fn remove(&mut self, key: BatchKey) {
        if self.batches.remove(key).is_some() {
            self.order.retain(|k| *k != key);
            self.generation += 1;
        }
    }

    /// Number of batches
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the table holds no batches
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Structural-identity counter; changes whenever batches are added or
    /// removed
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Batch handles in insertion order
    pub fn keys(&self) -> impl Iterator<Item = BatchKey> + '_ {
        self.order.iter().copied()
    }

    /// Handle of the batch at `index` in insertion order
    pub fn key_at(&self, index: usize) -> Option<BatchKey> {
        self.order.get(index).copied()
    }

    /// Set normal visibility for a batch
    pub fn set_visible(&mut self, key: BatchKey, visible: bool) {
        if let Some(batch) = self.batches.get_mut(key) {
            batch.visible = visible;
        }
    }

    /// Mark a batch as highlighted (selection emphasis)
    pub fn set_highlighted(&mut self, key: BatchKey, highlighted: bool) {
        if let Some(batch) = self.batches.get_mut(key) {
            batch.highlighted = highlighted;
        }
    }

    /// Effective visibility: the normal flag or an active force override
    pub fn is_visible(&self, key: BatchKey) -> bool {
        self.batches
            .get(key)
            .map(|batch| batch.visible || batch.force_visible)
            .unwrap_or(false)
    }

    /// Whether the batch is highlighted
    pub fn is_highlighted(&self, key: BatchKey) -> bool {
        self.batches
            .get(key)
            .map(|batch| batch.highlighted)
            .unwrap_or(false)
    }

    /// Whether any batch is highlighted
    pub fn any_highlighted(&self) -> bool {
        self.batches.values().any(|batch| batch.highlighted)
    }

    /// Whether every batch is visible without overrides
    pub fn all_visible(&self) -> bool {
        self.batches.values().all(|batch| batch.visible)
    }

    /// Force a batch visible for the duration of a ground-pass contribution
    ///
    /// Must be paired with [`BatchSet::clear_force_visible`] once the
    /// contribution render is issued; the override never survives a tick.
    pub fn set_force_visible(&mut self, key: BatchKey) {
        if let Some(batch) = self.batches.get_mut(key) {
            batch.force_visible = true;
        }
    }

    /// Drop the force-visible override for a batch
    pub fn clear_force_visible(&mut self, key: BatchKey) {
        if let Some(batch) = self.batches.get_mut(key) {
            batch.force_visible = false;
        }
    }

    /// Merged world bounds of all batches
    pub fn world_bounds(&self) -> Aabb {
        let mut bounds = Aabb::empty();
        for batch in self.batches.values() {
            bounds.merge(&batch.bounds);
        }
        bounds
    }
}
