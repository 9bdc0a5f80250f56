use crate::storage::StoreHandle;
use serde::{
    Deserialize,
    Serialize,
};
use std::sync::Arc;

/// A single point of a finished trace. The retention time is that of the
/// scan the point came from, absent when the scan carried none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChromatogramPoint {
    pub rt_seconds: Option<f32>,
    pub mz: f64,
    pub intensity: f32,
}

/// Retention-time span of a point sequence, in seconds.
///
/// Measured between the first and last point that carry a retention time;
/// 0.0 when fewer than two points do.
pub(crate) fn rt_span_seconds(points: &[ChromatogramPoint]) -> f32 {
    let mut rts = points.iter().filter_map(|p| p.rt_seconds);
    match rts.next() {
        Some(first) => match rts.last() {
            Some(last) => last - first,
            None => 0.0,
        },
        None => 0.0,
    }
}

/// An accepted, finished elution trace.
///
/// Immutable: the point sequence is frozen at finalization, the handle
/// points at the same sequence in the backing point store.
#[derive(Debug, Clone, Serialize)]
pub struct Chromatogram {
    points: Arc<[ChromatogramPoint]>,
    store_handle: StoreHandle,
    source: Arc<str>,
    height: f32,
    span_seconds: f32,
    apex_mz: f64,
}

impl Chromatogram {
    pub(crate) fn new(
        points: Arc<[ChromatogramPoint]>,
        store_handle: StoreHandle,
        source: Arc<str>,
    ) -> Self {
        // First apex wins on ties.
        let apex = points
            .iter()
            .copied()
            .reduce(|best, p| if p.intensity > best.intensity { p } else { best });
        let (height, apex_mz) = match apex {
            Some(p) => (p.intensity, p.mz),
            None => (0.0, 0.0),
        };
        let span_seconds = rt_span_seconds(&points);
        Self {
            points,
            store_handle,
            source,
            height,
            span_seconds,
            apex_mz,
        }
    }

    pub fn points(&self) -> &[ChromatogramPoint] {
        &self.points
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Maximum intensity over all points.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Last retention time minus first retention time, in seconds.
    pub fn span_seconds(&self) -> f32 {
        self.span_seconds
    }

    /// m/z of the highest-intensity point.
    pub fn apex_mz(&self) -> f64 {
        self.apex_mz
    }

    pub fn store_handle(&self) -> StoreHandle {
        self.store_handle
    }

    /// Display name of the originating data source.
    pub fn source(&self) -> &str {
        &self.source
    }
}
