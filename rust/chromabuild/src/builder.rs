//! Scan-by-scan orchestration: validation, progress, cancellation, and the
//! final accept/reject filter over the connector's candidate traces.

use crate::connector::TraceConnector;
use crate::errors::{
    ChromabuildError,
    Result,
};
use crate::models::chromatogram::{
    Chromatogram,
    ChromatogramPoint,
};
use crate::models::scan::Scan;
use crate::models::tolerance::MzToleranceProvider;
use crate::storage::PointStore;
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use std::sync::atomic::{
    AtomicBool,
    AtomicUsize,
    Ordering,
};
use std::sync::Arc;
use tracing::{
    debug,
    info,
};

/// Thresholds steering trace creation and acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuilderParams {
    /// Minimum intensity for a point to seed a new trace (strict).
    pub noise_level: f32,
    /// Minimum retention-time span for a candidate to be accepted (closed).
    pub min_span_seconds: f32,
    /// Minimum height for a candidate to be accepted (closed).
    pub min_height: f32,
}

#[derive(Debug, Default)]
struct Progress {
    processed: AtomicUsize,
    total: AtomicUsize,
    canceled: AtomicBool,
}

/// Shared view on a builder's progress, safe to hand to another thread.
///
/// Progress reads are best-effort: a concurrent reader may observe a stale
/// but monotonically non-decreasing value. Cancellation is cooperative and
/// observed once per scan boundary, never mid-scan.
#[derive(Debug, Clone, Default)]
pub struct ProgressHandle {
    inner: Arc<Progress>,
}

impl ProgressHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.canceled.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.inner.canceled.load(Ordering::Relaxed)
    }

    /// Fraction of scans processed, `None` while no scan count is known.
    pub fn finished_fraction(&self) -> Option<f32> {
        let total = self.inner.total.load(Ordering::Relaxed);
        if total == 0 {
            None
        } else {
            let processed = self.inner.processed.load(Ordering::Relaxed);
            Some(processed as f32 / total as f32)
        }
    }

    fn start_run(&self, total: usize) {
        self.inner.processed.store(0, Ordering::Relaxed);
        self.inner.total.store(total, Ordering::Relaxed);
    }

    fn mark_processed(&self) {
        self.inner.processed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Builds chromatograms from an ordered scan sequence.
///
/// Drives the [`TraceConnector`] one scan at a time, then filters the
/// candidate traces on height and span and writes the survivors' points to
/// the backing store.
pub struct ChromatogramBuilder<P: MzToleranceProvider, S: PointStore> {
    source_name: Arc<str>,
    scans: Vec<Scan>,
    params: BuilderParams,
    tolerance_provider: P,
    store: S,
    progress: ProgressHandle,
    result: Option<Vec<Chromatogram>>,
}

impl<P: MzToleranceProvider, S: PointStore> ChromatogramBuilder<P, S> {
    pub fn new(
        source_name: impl Into<Arc<str>>,
        scans: Vec<Scan>,
        params: BuilderParams,
        tolerance_provider: P,
        store: S,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            scans,
            params,
            tolerance_provider,
            store,
            progress: ProgressHandle::default(),
            result: None,
        }
    }

    /// Shared progress/cancellation handle for other threads.
    pub fn handle(&self) -> ProgressHandle {
        self.progress.clone()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.progress.cancel();
    }

    /// Fraction of scans processed, `None` before any run started.
    pub fn finished_fraction(&self) -> Option<f32> {
        self.progress.finished_fraction()
    }

    /// The last computed result, `None` before completion or after
    /// cancellation.
    pub fn result(&self) -> Option<&[Chromatogram]> {
        self.result.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the full pipeline.
    ///
    /// Returns `Ok(None)` when cancellation was observed: no result, as
    /// opposed to the empty-but-successful `Ok(Some(vec![]))` of a run whose
    /// candidates were all filtered out. Validation failures are fatal and
    /// happen before any trace state is created.
    pub fn execute(&mut self) -> Result<Option<Vec<Chromatogram>>> {
        info!("Started chromatogram builder on source {}", self.source_name);

        self.progress.start_run(self.scans.len());
        if self.scans.is_empty() {
            return Err(ChromabuildError::EmptyInput);
        }
        self.validate_scan_order()?;

        let mut connector = TraceConnector::new(self.params.noise_level);
        for scan in &self.scans {
            if self.progress.is_canceled() {
                info!(
                    "Chromatogram builder on source {} canceled after {} of {} scans",
                    self.source_name,
                    self.progress.inner.processed.load(Ordering::Relaxed),
                    self.scans.len()
                );
                return Ok(None);
            }
            let tolerance = self.tolerance_provider.mz_tolerance(scan);
            connector.add_scan(scan, &tolerance);
            self.progress.mark_processed();
        }

        let candidates = connector.finish();
        let num_candidates = candidates.len();
        let mut accepted = Vec::new();
        for trace in candidates {
            if trace.height() >= self.params.min_height
                && trace.span_seconds() >= self.params.min_span_seconds
            {
                let points: Arc<[ChromatogramPoint]> = trace.into_points().into();
                let handle = self.store.store(&points);
                accepted.push(Chromatogram::new(points, handle, self.source_name.clone()));
            }
        }
        debug!(
            "Discarded {} of {} candidate traces below the height/span thresholds",
            num_candidates - accepted.len(),
            num_candidates
        );

        info!(
            "Finished chromatogram builder on source {}: {} chromatograms",
            self.source_name,
            accepted.len()
        );
        self.result = Some(accepted.clone());
        Ok(Some(accepted))
    }

    /// Scans with a defined retention time must be non-decreasing; scans
    /// without one are skipped by this check only.
    fn validate_scan_order(&self) -> Result<()> {
        let timed: Vec<(usize, f32)> = self
            .scans
            .iter()
            .filter_map(|scan| scan.rt_seconds.map(|rt| (scan.scan_number, rt)))
            .collect();
        let offender = timed
            .par_windows(2)
            .find_first(|pair| pair[1].1 < pair[0].1);
        match offender {
            Some(pair) => Err(ChromabuildError::UnorderedScans {
                scan_number: pair[1].0,
            }),
            None => Ok(()),
        }
    }
}
