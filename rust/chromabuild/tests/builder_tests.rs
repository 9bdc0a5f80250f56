use chromabuild::{
    BuilderParams,
    ChromabuildError,
    ChromatogramBuilder,
    InMemoryPointStore,
    MzTolerance,
    MzToleranceProvider,
    Scan,
    ScanPoint,
};

fn scan(number: usize, rt: Option<f32>, points: Vec<(f64, f32)>) -> Scan {
    Scan::new(
        number,
        rt,
        points
            .into_iter()
            .map(|(mz, intensity)| ScanPoint::new(mz, intensity))
            .collect(),
    )
}

fn params(noise_level: f32, min_span_seconds: f32, min_height: f32) -> BuilderParams {
    BuilderParams {
        noise_level,
        min_span_seconds,
        min_height,
    }
}

fn build(
    scans: Vec<Scan>,
    params: BuilderParams,
) -> ChromatogramBuilder<MzTolerance, InMemoryPointStore> {
    ChromatogramBuilder::new(
        "test_run",
        scans,
        params,
        MzTolerance::Absolute((0.01, 0.01)),
        InMemoryPointStore::new(),
    )
}

#[test]
fn test_empty_input_fails() {
    let mut builder = build(vec![], params(0.0, 0.0, 0.0));
    match builder.execute() {
        Err(ChromabuildError::EmptyInput) => {}
        other => panic!("Expected EmptyInput, got {:?}", other),
    }
}

#[test]
fn test_unordered_scans_fail_naming_the_offender() {
    let scans = vec![
        scan(1, Some(0.0), vec![(100.0, 50.0)]),
        scan(2, Some(2.0), vec![(100.0, 50.0)]),
        scan(3, Some(1.0), vec![(100.0, 50.0)]),
    ];
    let mut builder = build(scans, params(0.0, 0.0, 0.0));
    match builder.execute() {
        Err(ChromabuildError::UnorderedScans { scan_number }) => {
            assert_eq!(scan_number, 3);
        }
        other => panic!("Expected UnorderedScans, got {:?}", other),
    }
    // Fatal before any trace state: no partial result is visible.
    assert!(builder.result().is_none());
}

#[test]
fn test_unordered_check_skips_untimed_scans() {
    // The untimed scan sits between two decreasing retention times; the
    // decrease is still detected across it.
    let scans = vec![
        scan(1, Some(2.0), vec![(100.0, 50.0)]),
        scan(2, None, vec![(100.0, 50.0)]),
        scan(3, Some(1.0), vec![(100.0, 50.0)]),
    ];
    let mut builder = build(scans, params(0.0, 0.0, 0.0));
    match builder.execute() {
        Err(ChromabuildError::UnorderedScans { scan_number }) => {
            assert_eq!(scan_number, 3);
        }
        other => panic!("Expected UnorderedScans, got {:?}", other),
    }
}

#[test]
fn test_continuity_over_all_scans() {
    let n = 20;
    let scans: Vec<Scan> = (0..n)
        .map(|i| {
            scan(
                i + 1,
                Some(i as f32),
                vec![(100.0, 40.0 + (i % 5) as f32)],
            )
        })
        .collect();
    let mut builder = build(scans, params(10.0, 0.0, 0.0));
    let result = builder.execute().unwrap().unwrap();

    assert_eq!(result.len(), 1);
    let chrom = &result[0];
    assert_eq!(chrom.num_points(), n);
    assert_eq!(chrom.height(), 44.0);
    assert_eq!(chrom.span_seconds(), (n - 1) as f32);
    assert_eq!(chrom.source(), "test_run");
}

#[test]
fn test_gap_produces_two_disjoint_chromatograms() {
    let scans = vec![
        scan(1, Some(0.0), vec![(100.0, 50.0)]),
        scan(2, Some(1.0), vec![(100.0, 50.0)]),
        scan(3, Some(2.0), vec![]),
        scan(4, Some(3.0), vec![(100.0, 50.0)]),
        scan(5, Some(4.0), vec![(100.0, 50.0)]),
    ];
    let mut builder = build(scans, params(10.0, 0.0, 0.0));
    let result = builder.execute().unwrap().unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|c| c.num_points() == 2));
    let mut rts: Vec<f32> = result
        .iter()
        .flat_map(|c| c.points().iter().filter_map(|p| p.rt_seconds))
        .collect();
    rts.sort_by(f32::total_cmp);
    // No point is shared between the two chromatograms.
    assert_eq!(rts, vec![0.0, 1.0, 3.0, 4.0]);
}

#[test]
fn test_height_threshold_filters() {
    // Large span, insufficient height.
    let scans: Vec<Scan> = (0..10)
        .map(|i| scan(i + 1, Some(i as f32), vec![(100.0, 50.0)]))
        .collect();
    let mut builder = build(scans, params(10.0, 0.0, 70.0));
    let result = builder.execute().unwrap().unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_span_threshold_filters() {
    // Sufficient height, insufficient span.
    let scans = vec![
        scan(1, Some(0.0), vec![(100.0, 90.0)]),
        scan(2, Some(0.5), vec![(100.0, 95.0)]),
    ];
    let mut builder = build(scans, params(10.0, 2.0, 70.0));
    let result = builder.execute().unwrap().unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_thresholds_are_closed_comparisons() {
    let scans = vec![
        scan(1, Some(0.0), vec![(100.0, 70.0)]),
        scan(2, Some(2.0), vec![(100.0, 70.0)]),
    ];
    // Height and span land exactly on the thresholds.
    let mut builder = build(scans, params(10.0, 2.0, 70.0));
    let result = builder.execute().unwrap().unwrap();
    assert_eq!(result.len(), 1);
}

#[test]
fn test_noise_never_seeds() {
    let scans: Vec<Scan> = (0..5)
        .map(|i| scan(i + 1, Some(i as f32), vec![(100.0, 50.0)]))
        .collect();
    let mut builder = build(scans, params(90.0, 0.0, 0.0));
    let result = builder.execute().unwrap().unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_reference_scenario() {
    // Three scans at RT 0/1/2, one point at m/z 100.0 each, intensities
    // 50/80/60, +-0.01 Da, noise 10, min height 70, min span 0.
    let scans = vec![
        scan(1, Some(0.0), vec![(100.0, 50.0)]),
        scan(2, Some(1.0), vec![(100.0, 80.0)]),
        scan(3, Some(2.0), vec![(100.0, 60.0)]),
    ];
    let mut builder = build(scans.clone(), params(10.0, 0.0, 70.0));
    let result = builder.execute().unwrap().unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].height(), 80.0);
    assert_eq!(result[0].span_seconds(), 2.0);

    // Same input with the noise level above every intensity: no trace ever
    // starts.
    let mut builder = build(scans, params(90.0, 0.0, 70.0));
    let result = builder.execute().unwrap().unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_accepted_points_written_to_store_once() {
    let scans = vec![
        scan(1, Some(0.0), vec![(100.0, 50.0), (200.0, 30.0)]),
        scan(2, Some(1.0), vec![(100.0, 60.0), (200.0, 35.0)]),
    ];
    let mut builder = build(scans, params(10.0, 0.0, 40.0));
    let result = builder.execute().unwrap().unwrap();

    // Only the m/z 100 trace passes the height filter; only its points are
    // in the store.
    assert_eq!(result.len(), 1);
    assert_eq!(builder.store().len(), 1);
    let stored = builder.store().retrieve(result[0].store_handle()).unwrap();
    assert_eq!(stored, result[0].points());
}

#[test]
fn test_cancellation_before_execute_yields_no_result() {
    let scans: Vec<Scan> = (0..10)
        .map(|i| scan(i + 1, Some(i as f32), vec![(100.0, 50.0)]))
        .collect();
    let mut builder = build(scans, params(10.0, 0.0, 0.0));
    builder.cancel();

    let outcome = builder.execute().unwrap();
    assert!(outcome.is_none());
    assert!(builder.result().is_none());
    assert!(builder.finished_fraction().unwrap() < 1.0);
}

#[test]
fn test_cancellation_mid_run_observed_at_scan_boundary() {
    use std::sync::{
        Arc,
        OnceLock,
    };

    // A tolerance provider that trips the shared cancellation flag while
    // resolving scan #5; the builder observes it at the next boundary.
    struct CancelAt {
        scan_number: usize,
        handle: Arc<OnceLock<chromabuild::ProgressHandle>>,
    }

    impl MzToleranceProvider for CancelAt {
        fn mz_tolerance(&self, scan: &Scan) -> MzTolerance {
            if scan.scan_number == self.scan_number {
                self.handle
                    .get()
                    .expect("handle set before execute")
                    .cancel();
            }
            MzTolerance::Absolute((0.01, 0.01))
        }
    }

    let slot = Arc::new(OnceLock::new());
    let provider = CancelAt {
        scan_number: 5,
        handle: slot.clone(),
    };
    let scans: Vec<Scan> = (0..10)
        .map(|i| scan(i + 1, Some(i as f32), vec![(100.0, 50.0)]))
        .collect();
    let mut builder = ChromatogramBuilder::new(
        "test_run",
        scans,
        params(10.0, 0.0, 0.0),
        provider,
        InMemoryPointStore::new(),
    );
    slot.set(builder.handle()).unwrap();

    let outcome = builder.execute().unwrap();
    assert!(outcome.is_none());
    assert_eq!(builder.finished_fraction(), Some(0.5));
}

#[test]
fn test_cancellation_from_another_thread() {
    // A run that was canceled from outside before it started reports no
    // result through the same shared handle contract.
    let scans: Vec<Scan> = (0..100)
        .map(|i| scan(i + 1, Some(i as f32), vec![(100.0, 50.0)]))
        .collect();
    let mut builder = build(scans, params(10.0, 0.0, 0.0));
    let handle = builder.handle();

    std::thread::spawn(move || handle.cancel())
        .join()
        .expect("cancel thread panicked");

    assert!(builder.execute().unwrap().is_none());
}

#[test]
fn test_canceled_empty_and_nonempty_outcomes_are_distinct() {
    // Successful run with everything filtered out: Some(empty).
    let scans = vec![scan(1, Some(0.0), vec![(100.0, 50.0)])];
    let mut builder = build(scans, params(10.0, 0.0, 1000.0));
    assert_eq!(builder.execute().unwrap().map(|r| r.len()), Some(0));

    // Canceled run: None.
    let scans = vec![scan(1, Some(0.0), vec![(100.0, 50.0)])];
    let mut builder = build(scans, params(10.0, 0.0, 1000.0));
    builder.cancel();
    assert_eq!(builder.execute().unwrap().map(|r| r.len()), None);
}

#[test]
fn test_per_scan_tolerance_resolution() {
    // A provider that narrows the window for the second scan, splitting what
    // a constant window would keep as one trace.
    struct NarrowLate;

    impl MzToleranceProvider for NarrowLate {
        fn mz_tolerance(&self, scan: &Scan) -> MzTolerance {
            if scan.scan_number >= 2 {
                MzTolerance::Absolute((0.001, 0.001))
            } else {
                MzTolerance::Absolute((0.01, 0.01))
            }
        }
    }

    let scans = vec![
        scan(1, Some(0.0), vec![(100.000, 50.0)]),
        scan(2, Some(1.0), vec![(100.005, 50.0)]),
    ];
    let mut builder = ChromatogramBuilder::new(
        "test_run",
        scans,
        params(10.0, 0.0, 0.0),
        NarrowLate,
        InMemoryPointStore::new(),
    );
    let result = builder.execute().unwrap().unwrap();
    // 100.005 is outside the narrowed window of scan 2: two traces.
    assert_eq!(result.len(), 2);
}
