//! Face Attendance Client Library
//!
//! Client side of a face-recognition attendance service. Users sign up
//! and sign in by capturing a face photo, then mark attendance the same
//! way; a dashboard lists historical records.
//!
//! # Architecture
//!
//! ```text
//! capture ──┐
//!           ├──> flows (signup, login, attendance, dashboard)
//! client ───┘
//!    │
//!    └── session (credential store, read before every request)
//! ```
//!
//! # Design Principles
//!
//! - **Single-shot capture**: a capture session yields at most one still
//!   image and frees the camera the moment it does
//! - **Release on every path**: capture, cancel, error and drop all stop
//!   the device
//! - **One failure shape**: every remote error is a [`RequestFailure`]
//! - **No hidden retries**: each call is one round trip
//!
//! # Example
//!
//! ```no_run
//! use face_attendance::{
//!     capture::{CaptureConfig, CaptureSession, MockSource, PreviewTarget},
//!     client::ApiClient,
//!     config::ApiConfig,
//!     flows::AttendanceFlow,
//!     session::SessionStore,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SessionStore::in_memory());
//! let client = ApiClient::new(&ApiConfig::default(), Arc::clone(&store))?;
//!
//! let mut session = CaptureSession::new(
//!     CaptureConfig::default(),
//!     Arc::new(MockSource::new()),
//!     Arc::new(PreviewTarget::new()),
//! );
//! session.activate()?;
//! let face = session.capture()?;
//!
//! let mut attendance = AttendanceFlow::new(client);
//! attendance.mark(&face).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod client;
pub mod config;
pub mod flows;
pub mod session;

// Re-export commonly used types at crate root
pub use capture::{CaptureConfig, CaptureError, CaptureSession, PreviewTarget, StillImage};
pub use client::{ApiClient, AttendanceRecord, RequestFailure};
pub use config::FileConfig;
pub use flows::{AttendanceFlow, AuthFlow, Dashboard, FlowError};
pub use session::{Credential, SessionStore, UserIdentity};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
