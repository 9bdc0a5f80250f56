use chromabuild::ChromabuildError;
use std::path::PathBuf;

#[derive(Debug)]
pub enum CliError {
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },
    Json(serde_json::Error),
    Build(ChromabuildError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { source, path } => match path {
                Some(path) => write!(f, "I/O error on {}: {}", path.display(), source),
                None => write!(f, "I/O error: {}", source),
            },
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::Build(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<ChromabuildError> for CliError {
    fn from(e: ChromabuildError) -> Self {
        Self::Build(e)
    }
}
