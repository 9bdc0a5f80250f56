use std::fmt::Display;

#[derive(Debug)]
pub enum ChromabuildError {
    EmptyInput,
    UnorderedScans { scan_number: usize },
    Other(String),
}

impl Display for ChromabuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => {
                write!(f, "No scans provided for chromatogram building")
            }
            Self::UnorderedScans { scan_number } => {
                write!(
                    f,
                    "Retention time of scan #{} is smaller than the retention time of the \
                     previous scan. Please make sure you only use scans with non-decreasing \
                     retention times.",
                    scan_number
                )
            }
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ChromabuildError {}

impl ChromabuildError {
    pub fn custom(msg: impl Display) -> Self {
        Self::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChromabuildError>;
