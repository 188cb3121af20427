//! Authenticated access to the remote attendance service.
//!
//! [`ApiClient`] attaches the session's bearer token to every request and
//! collapses every failure into a [`RequestFailure`].

mod api;
mod error;
mod models;

pub use api::ApiClient;
pub use error::RequestFailure;
pub use models::{AttendanceRecord, LoginResponse};
pub use reqwest::Method;
