mod common;

use std::io::Write;

use common::{accrue, record, statuses_for, train};
use orders_core::{CompletionStatus, Position, Tick};
use runtime::{RuntimeConfig, RuntimeError, Simulation};

#[test]
fn loads_settings_from_ron_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"(
            tick_size: 10,
            log_filter: "orders=debug",
            dispatch: (compaction_min_free: 8, max_begin_failures: Some(2)),
            handlers: (train_steps: 2, accrual_rate: 5, accrual_quota: 15),
        )"#
    )
    .unwrap();

    let config = RuntimeConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.tick_size, 10);
    assert_eq!(config.log_filter, "orders=debug");
    assert_eq!(config.dispatch.compaction_min_free, 8);
    assert_eq!(config.dispatch.max_begin_failures, Some(2));
    assert_eq!(config.handlers.train_steps, 2);

    let mut simulation = Simulation::with_default_handlers(config);
    let log = record(&mut simulation);
    let barracks = simulation.spawn(Position::ORIGIN).unwrap();
    let training = simulation.enqueue(barracks, train(&simulation)).unwrap();
    let income = simulation.enqueue(barracks, accrue(&simulation)).unwrap();

    simulation.step();
    assert_eq!(simulation.now(), Tick(10));
    simulation.run(2);
    assert_eq!(statuses_for(&log, training), vec![CompletionStatus::Completed]);

    simulation.run(3);
    assert_eq!(statuses_for(&log, income), vec![CompletionStatus::Completed]);
    assert_eq!(simulation.ledger().balance(barracks), 15);
}

#[test]
fn missing_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.ron");

    match RuntimeConfig::load_from_file(&path) {
        Err(RuntimeError::ConfigIo { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn malformed_file_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "(tick_size: -1)").unwrap();

    let error = RuntimeConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(error, RuntimeError::ConfigParse(_)));
}
