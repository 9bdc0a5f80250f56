use crate::models::scan::Scan;
use serde::{
    Deserialize,
    Serialize,
};

/// Symmetric-ish m/z matching window.
///
/// Convention: tolerances are defined in terms of positive magnitudes. A
/// tolerance of `(1.0, 1.0)` on an m/z of 10 means the window `(9, 11)`,
/// not `(-1, 1)` around zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MzTolerance {
    #[serde(rename = "da")]
    Absolute((f64, f64)),
    #[serde(rename = "ppm")]
    Ppm((f64, f64)),
}

impl MzTolerance {
    /// Calculate the closed m/z window `[mz - low, mz + high]` around a value.
    ///
    /// # Example
    ///
    /// ```
    /// use chromabuild::MzTolerance;
    ///
    /// let tol = MzTolerance::Ppm((20.0, 20.0));
    /// let range = tol.mz_range(500.0);
    /// assert!((range.start() - 499.99).abs() < 0.001);
    /// assert!((range.end() - 500.01).abs() < 0.001);
    /// ```
    pub fn mz_range(&self, mz: f64) -> MzRange {
        match self {
            MzTolerance::Absolute((low, high)) => MzRange::new(mz - low, mz + high),
            MzTolerance::Ppm((low, high)) => {
                let low = mz * low / 1e6;
                let high = mz * high / 1e6;
                MzRange::new(mz - low, mz + high)
            }
        }
    }
}

/// Closed m/z interval, start <= end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MzRange(f64, f64);

impl MzRange {
    pub fn new(start: f64, end: f64) -> Self {
        assert!(
            start <= end,
            "Expected an ordered m/z range, got ({}, {})",
            start,
            end
        );
        Self(start, end)
    }

    pub fn start(&self) -> f64 {
        self.0
    }

    pub fn end(&self) -> f64 {
        self.1
    }

    pub fn contains(&self, mz: f64) -> bool {
        self.0 <= mz && mz <= self.1
    }
}

/// Resolves the m/z matching window to use for a given scan.
///
/// Called once per scan. Implementations are expected to be pure; returning
/// a different window per scan is legitimate (calibration-drift
/// compensation).
pub trait MzToleranceProvider {
    fn mz_tolerance(&self, scan: &Scan) -> MzTolerance;
}

/// A bare tolerance acts as its own constant provider.
impl MzToleranceProvider for MzTolerance {
    fn mz_tolerance(&self, _scan: &Scan) -> MzTolerance {
        self.clone()
    }
}
