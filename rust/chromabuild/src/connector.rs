//! Greedy point-to-trace linking across consecutive scans.
//!
//! Each scan is matched against the set of in-progress traces: the scan's
//! points, visited strongest first, claim the nearest trace whose anchor m/z
//! lies within the scan's tolerance window. Unclaimed above-noise points
//! seed new traces; traces no point claimed are closed. A closed trace never
//! resurrects.

use crate::models::chromatogram::{
    ChromatogramPoint,
    rt_span_seconds,
};
use crate::models::scan::Scan;
use crate::models::tolerance::MzTolerance;

/// An elution trace under construction (or, after closing, a candidate for
/// the acceptance filter).
#[derive(Debug, Clone)]
pub struct Trace {
    id: u64,
    points: Vec<ChromatogramPoint>,
    last_mz: f64,
    max_intensity: f32,
    extended_this_scan: bool,
}

impl Trace {
    fn start(id: u64, point: ChromatogramPoint) -> Self {
        Self {
            id,
            points: vec![point],
            last_mz: point.mz,
            max_intensity: point.intensity,
            extended_this_scan: true,
        }
    }

    fn extend(&mut self, point: ChromatogramPoint) {
        self.last_mz = point.mz;
        self.max_intensity = self.max_intensity.max(point.intensity);
        self.extended_this_scan = true;
        self.points.push(point);
    }

    /// Monotonically assigned identifier; smaller means older.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn points(&self) -> &[ChromatogramPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<ChromatogramPoint> {
        self.points
    }

    /// m/z of the most recently added point, the matching anchor.
    pub fn last_mz(&self) -> f64 {
        self.last_mz
    }

    /// Running maximum intensity.
    pub fn height(&self) -> f32 {
        self.max_intensity
    }

    /// Retention-time span between the first and last timed point.
    pub fn span_seconds(&self) -> f32 {
        rt_span_seconds(&self.points)
    }
}

/// Owns the working set of in-progress traces and the closed candidates.
#[derive(Debug, Default)]
pub struct TraceConnector {
    noise_level: f32,
    next_trace_id: u64,
    active: Vec<Trace>,
    closed: Vec<Trace>,
}

impl TraceConnector {
    pub fn new(noise_level: f32) -> Self {
        Self {
            noise_level,
            ..Default::default()
        }
    }

    pub fn num_active(&self) -> usize {
        self.active.len()
    }

    /// Match one scan's points against the active traces.
    ///
    /// Every point ends up in exactly one of three places: appended to one
    /// existing trace, seeding one new trace, or dropped as noise. Traces
    /// this scan does not extend are closed afterwards; a gap of even a
    /// single scan terminates a trace.
    pub fn add_scan(&mut self, scan: &Scan, tolerance: &MzTolerance) {
        for trace in self.active.iter_mut() {
            trace.extended_this_scan = false;
        }

        // Only traces that entered this scan are match candidates; traces
        // seeded below are invisible to the remaining points of the scan.
        let mut match_index: Vec<(f64, usize)> = self
            .active
            .iter()
            .enumerate()
            .map(|(idx, trace)| (trace.last_mz, idx))
            .collect();
        match_index.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        // Strongest point first; ascending m/z settles intensity ties.
        let mut point_order: Vec<usize> = (0..scan.points.len()).collect();
        point_order.sort_unstable_by(|&a, &b| {
            let pa = &scan.points[a];
            let pb = &scan.points[b];
            pb.intensity
                .total_cmp(&pa.intensity)
                .then(pa.mz.total_cmp(&pb.mz))
        });

        for point_idx in point_order {
            let scan_point = scan.points[point_idx];
            let window = tolerance.mz_range(scan_point.mz);
            let lo = match_index.partition_point(|&(mz, _)| mz < window.start());
            let hi = match_index.partition_point(|&(mz, _)| mz <= window.end());

            let best = match_index[lo..hi]
                .iter()
                .filter(|&&(_, idx)| !self.active[idx].extended_this_scan)
                .min_by(|&&(mz_a, idx_a), &&(mz_b, idx_b)| {
                    let dist_a = (mz_a - scan_point.mz).abs();
                    let dist_b = (mz_b - scan_point.mz).abs();
                    dist_a
                        .total_cmp(&dist_b)
                        .then_with(|| self.active[idx_a].id.cmp(&self.active[idx_b].id))
                })
                .map(|&(_, idx)| idx);

            let point = ChromatogramPoint {
                rt_seconds: scan.rt_seconds,
                mz: scan_point.mz,
                intensity: scan_point.intensity,
            };
            match best {
                Some(idx) => self.active[idx].extend(point),
                None if point.intensity > self.noise_level => {
                    let id = self.next_trace_id;
                    self.next_trace_id += 1;
                    self.active.push(Trace::start(id, point));
                }
                None => {}
            }
        }

        let (kept, done): (Vec<Trace>, Vec<Trace>) = self
            .active
            .drain(..)
            .partition(|trace| trace.extended_this_scan);
        self.active = kept;
        self.closed.extend(done);
    }

    /// Close every remaining active trace and drain the full candidate list.
    pub fn finish(&mut self) -> Vec<Trace> {
        self.closed.append(&mut self.active);
        std::mem::take(&mut self.closed)
    }
}
