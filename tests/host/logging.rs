//! Logger installation
//!
//! The logger is process global, so these tests run serially.

use modhost::core::logging::{init_logging, is_initialised, reconfigure_logging};
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn test_logger_installs_once_and_reconfigures() {
    let dir = TempDir::new().unwrap();
    let log_file = dir.path().join("modhost.log");

    if !is_initialised() {
        init_logging(
            Some("debug"),
            Some("json"),
            log_file.to_str(),
            false,
        )
        .unwrap();
    }
    assert!(is_initialised());

    log::info!("integration test message");
    assert!(reconfigure_logging(Some("warn")).is_ok());
    assert!(reconfigure_logging(Some("debug")).is_ok());

    // log accepts a single logger per process
    assert!(init_logging(Some("info"), None, None, false).is_err());
}
