pub mod chromatogram;
pub mod scan;
pub mod tolerance;

pub use chromatogram::{Chromatogram, ChromatogramPoint};
pub use scan::{Scan, ScanPoint};
pub use tolerance::{MzRange, MzTolerance, MzToleranceProvider};
