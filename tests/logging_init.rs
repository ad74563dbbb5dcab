//! Installs the global subscriber, so it lives in its own test binary.

use midpoint_pi::logging::{init_logging, log_error};
use midpoint_pi::LogFormat;
use tracing::Level;

#[test]
fn test_init_logging_is_idempotent() {
    std::env::remove_var("PI_LOG");
    std::env::remove_var("RUST_LOG");

    init_logging("debug", LogFormat::Pretty);
    assert!(tracing::enabled!(Level::DEBUG));
    assert!(!tracing::enabled!(Level::TRACE));

    // The first subscriber stays in place
    init_logging("trace", LogFormat::Json);
    assert!(!tracing::enabled!(Level::TRACE));

    log_error("tests", "init", "not a real failure", Some("idempotency"));
}
