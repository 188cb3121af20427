//! Driving a capture session from a flow.

use crate::capture::{CaptureError, CaptureSession, StillImage};
use std::future::Future;

/// Activates `session`, waits for `trigger`, then captures.
///
/// `trigger` resolves to `true` to take the picture or `false` to cancel.
/// The camera is released on every outcome: captured, cancelled, or
/// failed. If this future is dropped while waiting, the session's own
/// teardown releases the device.
pub async fn capture_when<F>(
    session: &mut CaptureSession,
    trigger: F,
) -> Result<Option<StillImage>, CaptureError>
where
    F: Future<Output = bool>,
{
    session.activate()?;

    if !trigger.await {
        tracing::info!(session = session.id(), "Capture cancelled");
        session.release();
        return Ok(None);
    }

    match session.capture() {
        Ok(still) => Ok(Some(still)),
        Err(e) => {
            session.release();
            Err(e)
        }
    }
}
