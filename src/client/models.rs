//! Wire types for the attendance service.

use crate::session::{string_or_number, UserIdentity};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    /// Display name.
    pub name: &'a str,
    /// Login email.
    pub email: &'a str,
    /// Plain-text password.
    pub password: &'a str,
    /// JPEG data URI of the user's face.
    pub face_image: &'a str,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Login email.
    pub email: &'a str,
    /// Plain-text password.
    pub password: &'a str,
}

/// Body of the face-only endpoints (`/auth/login-face`, `/attendance/mark`).
#[derive(Debug, Clone, Serialize)]
pub struct FaceImageRequest<'a> {
    /// JPEG data URI of the face to match.
    pub face_image: &'a str,
}

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for later requests.
    pub access_token: String,
    /// Usually `bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
    /// The signed-in user.
    pub user: UserIdentity,
}

/// One attendance entry as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Record id. Numeric ids are kept in their decimal form.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Name of the user who was marked.
    pub user_name: String,
    /// Server-assigned timestamp, kept verbatim.
    pub timestamp: String,
}

impl AttendanceRecord {
    /// Parses the timestamp. Offset-less timestamps are taken as UTC.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&self.timestamp, fmt).ok())
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    /// Local calendar date for display.
    pub fn local_date(&self) -> Option<NaiveDate> {
        self.recorded_at().map(|t| t.with_timezone(&Local).date_naive())
    }

    /// Local wall-clock time for display.
    pub fn local_time(&self) -> Option<NaiveTime> {
        self.recorded_at().map(|t| t.with_timezone(&Local).time())
    }
}
