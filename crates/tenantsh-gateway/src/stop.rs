//! Process-shutdown teardown of every in-flight session.
//!
//! Grounded in `skynet-gateway`'s `/stop` emergency-stop routine: cancel
//! every tracked token and let each session's own task observe cancellation
//! and tear itself down, rather than reaching into session internals here.

use tracing::info;

use crate::app::AppState;

pub fn shutdown_all_sessions(app: &AppState) {
    let cancelled = app.sessions.cancel_all();
    info!(cancelled, "shutdown: cancelled all in-flight sessions");
}
