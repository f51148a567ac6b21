//! Shared setup for the suite binaries.

use esperar::{EsperarResult, Session, SessionConfig};

/// Install the tracing subscriber for this test binary.
///
/// Repeat calls are no-ops so every test can invoke it first.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Open a maximized session against the WebDriver server named by the
/// `ESPERAR_*` environment. Used by the live suites only.
pub fn live_session() -> EsperarResult<Session> {
    let config = SessionConfig::from_env()?;
    let session = Session::open(&config)?;
    session.maximize_window()?;
    Ok(session)
}
