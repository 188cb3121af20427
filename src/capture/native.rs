//! Native camera backend built on `nokhwa`.

use super::{CaptureConfig, CaptureError, Facing, Frame, VideoSource, VideoStream};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};

/// Opens the platform camera through `nokhwa`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NokhwaSource;

impl NokhwaSource {
    /// A source for the platform's default camera backend.
    pub fn new() -> Self {
        Self
    }

    /// Picks a device index for the requested facing.
    ///
    /// Platforms do not report orientation directly, so rear cameras are
    /// recognised by name and everything else falls back to `device_id`.
    fn resolve_index(config: &CaptureConfig) -> CameraIndex {
        let fallback = CameraIndex::Index(config.device_id);
        let devices = match nokhwa::query(ApiBackend::Auto) {
            Ok(devices) => devices,
            Err(e) => {
                tracing::debug!(error = %e, "Camera query failed, using configured index");
                return fallback;
            }
        };

        let wants_rear = config.facing == Facing::Environment;
        devices
            .iter()
            .find(|info| {
                let name = info.human_name().to_lowercase();
                let rear = name.contains("back") || name.contains("rear");
                rear == wants_rear
            })
            .map(|info| info.index().clone())
            .unwrap_or(fallback)
    }
}

impl VideoSource for NokhwaSource {
    fn acquire(&self, config: &CaptureConfig) -> Result<Box<dyn VideoStream>, CaptureError> {
        let index = Self::resolve_index(config);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(config.width, config.height),
                FrameFormat::MJPEG,
                config.fps,
            ),
        ));

        let mut camera = nokhwa::Camera::new(index, requested)
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        let resolution = camera.resolution();
        tracing::info!(
            device = %camera.info().human_name(),
            width = resolution.width(),
            height = resolution.height(),
            "Camera stream opened"
        );

        Ok(Box::new(NokhwaStream {
            camera,
            sequence: 0,
            open: true,
        }))
    }
}

struct NokhwaStream {
    camera: nokhwa::Camera,
    sequence: u64,
    open: bool,
}

impl VideoStream for NokhwaStream {
    fn natural_size(&self) -> (u32, u32) {
        let resolution = self.camera.resolution();
        (resolution.width(), resolution.height())
    }

    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        self.sequence += 1;
        Ok(Frame::new(decoded.into_raw(), width, height, self.sequence))
    }

    fn stop(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = self.camera.stop_stream() {
            tracing::warn!(error = %e, "Failed to stop camera stream");
        }
    }
}

impl Drop for NokhwaStream {
    fn drop(&mut self) {
        self.stop();
    }
}
