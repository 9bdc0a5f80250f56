use chromabuild::{
    BuilderParams,
    MzTolerance,
};
use clap::{
    ArgGroup,
    Parser,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("tolerance").required(true).args(["tolerance_da", "tolerance_ppm"])))]
pub struct Args {
    /// The path to the json file with the input scans.
    #[arg(short, long)]
    pub scans_path: PathBuf,

    /// The path to write the accepted chromatograms to.
    #[arg(short, long)]
    pub output_path: PathBuf,

    /// Display name of the data source, defaults to the scan file name.
    #[arg(long)]
    pub source_name: Option<String>,

    /// Minimum intensity for a point to seed a new trace.
    #[arg(long, default_value_t = 0.0)]
    pub noise_level: f32,

    /// Minimum trace height for a chromatogram to be accepted.
    #[arg(long, default_value_t = 0.0)]
    pub min_height: f32,

    /// Minimum retention-time span in seconds for a chromatogram to be
    /// accepted.
    #[arg(long, default_value_t = 0.0)]
    pub min_span: f32,

    /// Symmetric m/z matching tolerance in daltons.
    #[arg(long)]
    pub tolerance_da: Option<f64>,

    /// Symmetric m/z matching tolerance in parts per million.
    #[arg(long)]
    pub tolerance_ppm: Option<f64>,
}

impl Args {
    pub fn tolerance(&self) -> MzTolerance {
        match (self.tolerance_da, self.tolerance_ppm) {
            (Some(da), _) => MzTolerance::Absolute((da, da)),
            (_, Some(ppm)) => MzTolerance::Ppm((ppm, ppm)),
            _ => unreachable!("clap enforces the tolerance group"),
        }
    }

    pub fn params(&self) -> BuilderParams {
        BuilderParams {
            noise_level: self.noise_level,
            min_span_seconds: self.min_span,
            min_height: self.min_height,
        }
    }

    pub fn source_name(&self) -> String {
        match &self.source_name {
            Some(name) => name.clone(),
            None => self
                .scans_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unnamed".to_string()),
        }
    }
}
