//! Fragment transform applier
//!
//! Lowest-level mutator used by both tools. Reads go through the store so
//! that pending renderer-side transforms are resolved first; writes mark the
//! fragment dirty. [`FragmentApplier::finish`] issues the single redraw for
//! the whole batch.

use glam::{Quat, Vec3};

use crate::error::SceneError;
use crate::fragment::FragmentTransform;
use crate::ids::{FragmentId, ModelId};
use crate::scene::FragmentStore;

/// One batch of fragment writes followed by exactly one redraw
pub struct FragmentApplier<'a, S: FragmentStore + ?Sized> {
    store: &'a mut S,
    committed: usize,
}

impl<'a, S: FragmentStore + ?Sized> FragmentApplier<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            committed: 0,
        }
    }

    /// Read-only view of the store, for scene queries during the batch
    pub fn store(&self) -> &S {
        self.store
    }

    /// Current transform of a fragment
    pub fn begin_read(
        &mut self,
        model: ModelId,
        fragment: FragmentId,
    ) -> Result<FragmentTransform, SceneError> {
        self.store.read_transform(model, fragment)
    }

    /// Write back a transform
    pub fn commit(
        &mut self,
        model: ModelId,
        fragment: FragmentId,
        transform: FragmentTransform,
    ) -> Result<(), SceneError> {
        self.store.write_transform(model, fragment, transform)?;
        self.committed += 1;
        Ok(())
    }

    /// Read, move to an absolute position, commit
    pub fn set_position(
        &mut self,
        model: ModelId,
        fragment: FragmentId,
        position: Vec3,
    ) -> Result<FragmentTransform, SceneError> {
        let current = self.begin_read(model, fragment)?;
        let next = FragmentTransform::new(position, current.orientation);
        self.commit(model, fragment, next)?;
        Ok(next)
    }

    /// Read, add `delta` to the position, commit
    pub fn translate(
        &mut self,
        model: ModelId,
        fragment: FragmentId,
        delta: Vec3,
    ) -> Result<FragmentTransform, SceneError> {
        let next = self.begin_read(model, fragment)?.translated(delta);
        self.commit(model, fragment, next)?;
        Ok(next)
    }

    /// Read, rotate about `pivot`, commit
    pub fn rotate_about(
        &mut self,
        model: ModelId,
        fragment: FragmentId,
        pivot: Vec3,
        rotation: Quat,
    ) -> Result<FragmentTransform, SceneError> {
        let next = self
            .begin_read(model, fragment)?
            .rotated_about(pivot, rotation);
        self.commit(model, fragment, next)?;
        Ok(next)
    }

    /// Close the batch: one redraw if anything was written.
    ///
    /// Returns the number of committed writes.
    pub fn finish(self) -> usize {
        if self.committed > 0 {
            self.store.scene_updated();
        }
        self.committed
    }
}
