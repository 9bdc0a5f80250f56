use serde::{
    Deserialize,
    Serialize,
};

/// A single m/z + intensity measurement within a scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanPoint {
    pub mz: f64,
    pub intensity: f32,
}

impl ScanPoint {
    pub fn new(mz: f64, intensity: f32) -> Self {
        Self { mz, intensity }
    }
}

/// One spectral acquisition: an ordinal scan number, an optional retention
/// time and a point list ascending by m/z.
///
/// The retention time is optional because some acquisitions carry no
/// chromatography information; such scans still take part in trace matching
/// but are skipped by the retention-time order validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub scan_number: usize,
    pub rt_seconds: Option<f32>,
    pub points: Vec<ScanPoint>,
}

impl Scan {
    /// Builds a scan, sorting the points ascending by m/z.
    pub fn new(scan_number: usize, rt_seconds: Option<f32>, points: Vec<ScanPoint>) -> Self {
        let mut scan = Self {
            scan_number,
            rt_seconds,
            points,
        };
        scan.sort_points_by_mz();
        scan
    }

    /// Restores the ascending-by-m/z point order after deserialization or
    /// direct field manipulation.
    pub fn sort_points_by_mz(&mut self) {
        self.points
            .sort_unstable_by(|a, b| a.mz.total_cmp(&b.mz));
    }
}
