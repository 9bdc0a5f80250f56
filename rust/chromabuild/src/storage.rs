//! Backing store abstraction for finished point sequences.
//!
//! The engine writes each accepted chromatogram's points exactly once, at
//! finalization, and embeds the returned handle in the output entity. The
//! store is append-only; nothing is mutated post-write.

use crate::models::chromatogram::ChromatogramPoint;
use serde::Serialize;
use std::sync::Arc;

/// Opaque reference to a stored point sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StoreHandle(u64);

impl StoreHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Accepts a finished point sequence and returns an opaque handle for it.
pub trait PointStore {
    fn store(&mut self, points: &[ChromatogramPoint]) -> StoreHandle;
}

/// Store that keeps every sequence in memory, for tests and small runs.
#[derive(Debug, Default)]
pub struct InMemoryPointStore {
    sequences: Vec<Arc<[ChromatogramPoint]>>,
}

impl InMemoryPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retrieve(&self, handle: StoreHandle) -> Option<&[ChromatogramPoint]> {
        self.sequences.get(handle.0 as usize).map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl PointStore for InMemoryPointStore {
    fn store(&mut self, points: &[ChromatogramPoint]) -> StoreHandle {
        let handle = StoreHandle(self.sequences.len() as u64);
        self.sequences.push(points.into());
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(mz: f64, intensity: f32) -> ChromatogramPoint {
        ChromatogramPoint {
            rt_seconds: Some(1.0),
            mz,
            intensity,
        }
    }

    #[test]
    fn test_store_and_retrieve() {
        let mut store = InMemoryPointStore::new();
        let first = store.store(&[point(100.0, 1.0), point(100.1, 2.0)]);
        let second = store.store(&[point(200.0, 3.0)]);

        assert_ne!(first, second);
        assert_eq!(store.retrieve(first).unwrap().len(), 2);
        assert_eq!(store.retrieve(second).unwrap()[0].mz, 200.0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_retrieve_unknown_handle() {
        let store = InMemoryPointStore::new();
        assert!(store.retrieve(StoreHandle::new(7)).is_none());
    }
}
