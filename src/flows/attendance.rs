//! Marking attendance and listing records.

use super::{messages, FlowError};
use crate::capture::StillImage;
use crate::client::{ApiClient, AttendanceRecord};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::collections::HashSet;

/// The attendance screen: one successful mark flips it to done.
#[derive(Debug, Clone)]
pub struct AttendanceFlow {
    client: ApiClient,
    marked_at: Option<DateTime<Local>>,
}

impl AttendanceFlow {
    /// A flow that has not marked yet.
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            marked_at: None,
        }
    }

    /// Sends `face_image` to be matched and recorded.
    ///
    /// The server decides duplicates ("already marked today"); this flow
    /// only remembers its own success.
    pub async fn mark(&mut self, face_image: &StillImage) -> Result<Value, FlowError> {
        let confirmation = self
            .client
            .mark_attendance(face_image)
            .await
            .map_err(|f| FlowError::rejected(f, messages::ATTENDANCE_FAILED))?;

        let now = Local::now();
        tracing::info!(at = %now.format("%H:%M:%S"), "Attendance marked");
        self.marked_at = Some(now);
        Ok(confirmation)
    }

    /// Whether this flow has marked successfully.
    pub fn is_marked(&self) -> bool {
        self.marked_at.is_some()
    }

    /// Local time of the successful mark.
    pub fn marked_at(&self) -> Option<DateTime<Local>> {
        self.marked_at
    }
}

/// Records loaded for the dashboard, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceSummary {
    /// Records as returned by the service.
    pub records: Vec<AttendanceRecord>,
}

impl AttendanceSummary {
    /// Number of records.
    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// Number of distinct user names among the records.
    pub fn unique_users(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.user_name.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The dashboard screen.
#[derive(Debug, Clone)]
pub struct Dashboard {
    client: ApiClient,
}

impl Dashboard {
    /// A dashboard reading through `client`.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetches all attendance records.
    pub async fn load(&self) -> Result<AttendanceSummary, FlowError> {
        let records = self
            .client
            .list_attendance()
            .await
            .map_err(|f| FlowError::rejected(f, messages::LIST_FAILED))?;
        tracing::debug!(count = records.len(), "Attendance records loaded");
        Ok(AttendanceSummary { records })
    }

    /// Signs out from the dashboard.
    pub fn logout(&self) {
        self.client.session().clear();
    }
}
