//! Video device abstraction.
//!
//! A [`VideoSource`] hands out live [`VideoStream`]s. The capture session
//! only ever talks to these traits, so a real camera and the synthetic
//! [`MockSource`] are interchangeable.

use super::{CaptureConfig, Frame, RGB_CHANNELS};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while acquiring or using a camera.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Permission was denied or no matching device exists.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    /// The requested operation is not valid in the session's current state.
    #[error("invalid capture state: {0}")]
    InvalidState(&'static str),
    /// Reading or encoding the still frame failed.
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
}

/// A source of live video streams (a camera, or a fake of one).
pub trait VideoSource {
    /// Requests a stream matching `config`.
    ///
    /// Fails with [`CaptureError::DeviceUnavailable`] when permission is
    /// denied or no device matches.
    fn acquire(&self, config: &CaptureConfig) -> Result<Box<dyn VideoStream>, CaptureError>;
}

/// A live, exclusively held device stream.
pub trait VideoStream {
    /// Natural (width, height) of the frames this stream produces.
    fn natural_size(&self) -> (u32, u32);

    /// Reads the current frame as packed RGB8.
    fn read_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Stops every underlying track and frees the device.
    fn stop(&mut self);
}

/// Counters shared between a [`MockSource`] and the streams it hands out.
#[derive(Debug, Default)]
pub struct MockCounters {
    acquired: AtomicUsize,
    stopped: AtomicUsize,
    frames: AtomicU64,
}

impl MockCounters {
    /// Number of successful acquisitions.
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Number of streams that have been stopped.
    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Streams acquired and not yet stopped.
    pub fn open_streams(&self) -> usize {
        self.acquired().saturating_sub(self.stopped())
    }

    /// Total frames read across all streams.
    pub fn frames_read(&self) -> u64 {
        self.frames.load(Ordering::SeqCst)
    }
}

/// Synthetic camera used by tests and the CLI demo mode.
///
/// Produces a deterministic gradient pattern. Can be configured to deny
/// access, simulating a refused permission prompt or a missing device.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    deny: bool,
    fail_frames: bool,
    counters: Arc<MockCounters>,
}

impl MockSource {
    /// A working synthetic camera.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every acquisition is refused.
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    /// A source whose streams open but fail on every frame read.
    pub fn broken_frames() -> Self {
        Self {
            fail_frames: true,
            ..Self::default()
        }
    }

    /// Shared acquisition counters, for leak checks.
    pub fn counters(&self) -> Arc<MockCounters> {
        Arc::clone(&self.counters)
    }
}

impl VideoSource for MockSource {
    fn acquire(&self, config: &CaptureConfig) -> Result<Box<dyn VideoStream>, CaptureError> {
        if self.deny {
            tracing::debug!("MockSource refusing acquisition");
            return Err(CaptureError::DeviceUnavailable(
                "permission denied".to_string(),
            ));
        }
        config
            .validate()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            width = config.width,
            height = config.height,
            "MockSource stream opened"
        );

        Ok(Box::new(MockStream {
            width: config.width,
            height: config.height,
            fail_frames: self.fail_frames,
            sequence: 0,
            stopped: false,
            counters: Arc::clone(&self.counters),
        }))
    }
}

#[derive(Debug)]
struct MockStream {
    width: u32,
    height: u32,
    fail_frames: bool,
    sequence: u64,
    stopped: bool,
    counters: Arc<MockCounters>,
}

impl VideoStream for MockStream {
    fn natural_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        if self.stopped {
            return Err(CaptureError::CaptureFailed("stream stopped".to_string()));
        }
        if self.fail_frames {
            return Err(CaptureError::CaptureFailed("no frame available".to_string()));
        }

        let (w, h) = (self.width as usize, self.height as usize);
        let mut pixels = Vec::with_capacity(w * h * RGB_CHANNELS);
        for y in 0..h {
            for x in 0..w {
                pixels.push((x * 255 / w.max(1)) as u8);
                pixels.push((y * 255 / h.max(1)) as u8);
                pixels.push(((x + y + self.sequence as usize) % 256) as u8);
            }
        }

        self.sequence += 1;
        self.counters.frames.fetch_add(1, Ordering::SeqCst);
        Ok(Frame::new(pixels, self.width, self.height, self.sequence))
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.counters.stopped.fetch_add(1, Ordering::SeqCst);
            tracing::info!("MockSource stream stopped");
        }
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        // An unstopped drop is a leak in a real device; surface it loudly.
        if !self.stopped {
            tracing::warn!("MockSource stream dropped without stop");
        }
    }
}
