//! Screen-level flows: signup, login, attendance and the dashboard.
//!
//! Each flow is a short pipeline. Obtain a still image if needed, make one
//! client call, then update the session store (login) or local state
//! (attendance). A failed call never touches the session store; the
//! server's detail message is surfaced, or a per-operation fallback.

mod attendance;
mod auth;
mod capture;

pub use attendance::{AttendanceFlow, AttendanceSummary, Dashboard};
pub use auth::{AuthFlow, SignupForm, MIN_PASSWORD_LEN};
pub use capture::capture_when;

use crate::capture::CaptureError;
use crate::client::RequestFailure;
use thiserror::Error;

/// User-facing fallback messages, used when the server sends no detail.
pub mod messages {
    /// Signup was rejected.
    pub const SIGNUP_FAILED: &str = "An error occurred during signup";
    /// Password login was rejected.
    pub const LOGIN_FAILED: &str = "Invalid credentials";
    /// Face login was rejected.
    pub const FACE_LOGIN_FAILED: &str = "Face not recognized";
    /// Marking attendance was rejected.
    pub const ATTENDANCE_FAILED: &str = "Face not recognized or already marked";
    /// The attendance list could not be loaded.
    pub const LIST_FAILED: &str = "Failed to load attendance records";
    /// Signup was attempted without a face image.
    pub const FACE_REQUIRED: &str = "Please capture your face image to complete signup";
}

/// Why a flow did not complete.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The camera could not produce a still image.
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// The service rejected the call; `message` is what to show the user.
    #[error("{message}")]
    Rejected {
        /// Server detail or the operation's fallback.
        message: String,
        /// The failure as reported by the client.
        failure: RequestFailure,
    },
    /// Input failed client-side checks; nothing was sent.
    #[error("{0}")]
    Invalid(String),
}

impl FlowError {
    fn rejected(failure: RequestFailure, fallback: &str) -> Self {
        Self::Rejected {
            message: failure.message_or(fallback).to_string(),
            failure,
        }
    }

    /// The text to show the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Capture(CaptureError::DeviceUnavailable(_)) => {
                "Unable to access camera. Please ensure camera permissions are granted.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// The underlying request failure, if the service was reached.
    pub fn request_failure(&self) -> Option<&RequestFailure> {
        match self {
            Self::Rejected { failure, .. } => Some(failure),
            _ => None,
        }
    }
}
