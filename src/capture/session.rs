//! Single-shot capture session.
//!
//! A session acquires the camera, binds the live stream to a preview
//! target, and turns exactly one frame into a [`StillImage`]. The device
//! stream lives inside the `Active` state, so the handle exists if and only
//! if the session is active. Dropping a session releases it.

use super::{
    CaptureConfig, CaptureError, PreviewBinding, PreviewTarget, StillImage, VideoSource,
    VideoStream,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Observable lifecycle state of a [`CaptureSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, no device held.
    Idle,
    /// Device held and bound to the preview target.
    Active,
    /// Device freed. Terminal.
    Released,
}

enum Stage {
    Idle,
    Active(Box<dyn VideoStream>),
    Released,
}

/// Mediates one camera activation and at most one still capture.
pub struct CaptureSession {
    id: u64,
    config: CaptureConfig,
    source: Arc<dyn VideoSource>,
    target: Arc<PreviewTarget>,
    stage: Stage,
}

impl CaptureSession {
    /// Creates an idle session that will draw from `source` and preview on
    /// `target`.
    pub fn new(
        config: CaptureConfig,
        source: Arc<dyn VideoSource>,
        target: Arc<PreviewTarget>,
    ) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            config,
            source,
            target,
            stage: Stage::Idle,
        }
    }

    /// Unique id of this session.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        match self.stage {
            Stage::Idle => SessionState::Idle,
            Stage::Active(_) => SessionState::Active,
            Stage::Released => SessionState::Released,
        }
    }

    /// Whether the session currently holds the camera.
    pub fn is_active(&self) -> bool {
        matches!(self.stage, Stage::Active(_))
    }

    /// Acquires the camera and binds the live stream to the preview target.
    ///
    /// On [`CaptureError::DeviceUnavailable`] the session stays idle and may
    /// be activated again. No retry is attempted here.
    pub fn activate(&mut self) -> Result<(), CaptureError> {
        match self.stage {
            Stage::Idle => {}
            Stage::Active(_) => return Err(CaptureError::InvalidState("session already active")),
            Stage::Released => return Err(CaptureError::InvalidState("session already released")),
        }
        if self.target.is_live() {
            return Err(CaptureError::InvalidState("preview target already in use"));
        }

        let mut stream = match self.source.acquire(&self.config) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(session = self.id, error = %e, "Camera activation failed");
                return Err(e);
            }
        };

        let (width, height) = stream.natural_size();
        let bound = self.target.bind(PreviewBinding {
            session_id: self.id,
            width,
            height,
        });
        if !bound {
            // Lost a race for the target; give the device straight back.
            stream.stop();
            return Err(CaptureError::InvalidState("preview target already in use"));
        }

        tracing::info!(session = self.id, width, height, "Camera activated");
        self.stage = Stage::Active(stream);
        Ok(())
    }

    /// Captures one still image and releases the camera.
    ///
    /// If the frame cannot be read or encoded the session stays active.
    pub fn capture(&mut self) -> Result<StillImage, CaptureError> {
        let stream = match &mut self.stage {
            Stage::Active(stream) => stream,
            Stage::Idle => return Err(CaptureError::InvalidState("session not activated")),
            Stage::Released => return Err(CaptureError::InvalidState("session already released")),
        };

        let frame = stream.read_frame()?;
        let still = StillImage::encode(&frame, self.config.jpeg_quality)?;

        self.release();
        tracing::info!(
            session = self.id,
            width = still.width(),
            height = still.height(),
            "Still image captured"
        );
        Ok(still)
    }

    /// Stops the device and moves to `Released`. Idempotent; a no-op unless
    /// the session is active.
    pub fn release(&mut self) {
        if !self.is_active() {
            return;
        }
        if let Stage::Active(mut stream) = std::mem::replace(&mut self.stage, Stage::Released) {
            stream.stop();
            self.target.unbind(self.id);
            tracing::info!(session = self.id, "Camera released");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if self.is_active() {
            tracing::debug!(session = self.id, "Releasing camera on teardown");
        }
        self.release();
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}
