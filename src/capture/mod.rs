//! Camera input and still-image capture.
//!
//! This module owns the camera resource: acquiring a device stream,
//! binding it to a preview target, extracting a single still frame and
//! releasing the device on every exit path.

mod config;
mod device;
mod frame;
#[cfg(feature = "camera")]
mod native;
mod preview;
mod session;
mod still;

pub use config::{CaptureConfig, ConfigError, Facing};
pub use device::{CaptureError, MockCounters, MockSource, VideoSource, VideoStream};
pub use frame::{Frame, RGB_CHANNELS};
#[cfg(feature = "camera")]
pub use native::NokhwaSource;
pub use preview::{PreviewBinding, PreviewTarget};
pub use session::{CaptureSession, SessionState};
pub use still::{StillImage, JPEG_DATA_URI_PREFIX};
