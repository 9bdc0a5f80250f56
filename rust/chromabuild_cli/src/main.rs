mod cli;
mod errors;

use chromabuild::{
    ChromatogramBuilder,
    InMemoryPointStore,
    Scan,
};
use clap::Parser;
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use std::fs::File;
use std::io::BufReader;
use std::time::Duration;
use tracing::info;
use tracing::subscriber::set_global_default;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;

use crate::cli::Args;
use crate::errors::CliError;

fn main() -> Result<(), CliError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE));
    set_global_default(subscriber).expect("Setting default subscriber failed");

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<(), CliError> {
    let file = File::open(&args.scans_path).map_err(|source| CliError::Io {
        source,
        path: Some(args.scans_path.clone()),
    })?;
    let mut scans: Vec<Scan> = serde_json::from_reader(BufReader::new(file))?;
    // The engine assumes ascending-by-m/z points; input files make no such
    // promise.
    for scan in scans.iter_mut() {
        scan.sort_points_by_mz();
    }
    info!(
        "Read {} scans from {}",
        scans.len(),
        args.scans_path.display()
    );

    let num_scans = scans.len();
    let mut builder = ChromatogramBuilder::new(
        args.source_name(),
        scans,
        args.params(),
        args.tolerance(),
        InMemoryPointStore::new(),
    );
    let handle = builder.handle();

    let outcome = std::thread::scope(|scope| {
        let worker = scope.spawn(|| builder.execute());

        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap();
        let bar = ProgressBar::new(num_scans as u64);
        bar.set_style(style);
        while !worker.is_finished() {
            if let Some(fraction) = handle.finished_fraction() {
                bar.set_position((fraction * num_scans as f32).round() as u64);
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        bar.finish_and_clear();
        worker.join().expect("builder thread panicked")
    })?;

    match outcome {
        Some(chromatograms) => {
            let out = File::create(&args.output_path).map_err(|source| CliError::Io {
                source,
                path: Some(args.output_path.clone()),
            })?;
            serde_json::to_writer_pretty(out, &chromatograms)?;
            info!(
                "Wrote {} chromatograms to {}",
                chromatograms.len(),
                args.output_path.display()
            );
        }
        None => info!("Run canceled, no output written"),
    }
    Ok(())
}
