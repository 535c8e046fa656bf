//! Complaints.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{CampusApi, QueryOptions};
use crate::ids::{ComplaintId, UserId};
use crate::params::Call;
use crate::registry::Operation;
use crate::ApiError;

/// Where a complaint is in its handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ComplaintStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::InProgress => "in-progress",
            ComplaintStatus::Resolved => "resolved",
            ComplaintStatus::Rejected => "rejected",
        }
    }

    /// Whether the complaint needs no further action.
    pub fn is_closed(&self) -> bool {
        matches!(self, ComplaintStatus::Resolved | ComplaintStatus::Rejected)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    #[serde(alias = "_id")]
    pub id: ComplaintId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: ComplaintStatus,
    #[serde(default)]
    pub created_by: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Complaint operations.
pub struct Complaints<'a> {
    api: &'a CampusApi,
}

impl<'a> Complaints<'a> {
    pub(crate) fn new(api: &'a CampusApi) -> Self {
        Self { api }
    }

    /// Every complaint. Admin only.
    pub async fn list_all(&self) -> Result<Vec<Complaint>, ApiError> {
        self.api
            .execute_as(Call::new(Operation::GetAllComplaints), QueryOptions::default())
            .await
    }

    /// Complaints filed by the signed-in user.
    pub async fn mine(&self) -> Result<Vec<Complaint>, ApiError> {
        self.api
            .execute_as(Call::new(Operation::GetMyComplaints), QueryOptions::default())
            .await
    }

    /// One complaint by ID.
    pub async fn get(&self, id: &ComplaintId) -> Result<Complaint, ApiError> {
        self.api
            .execute_as(Call::new(Operation::GetComplaintById).id(id), QueryOptions::default())
            .await
    }

    /// File a complaint as the signed-in user.
    pub async fn create(&self, complaint: &NewComplaint) -> Result<Complaint, ApiError> {
        let call = Call::new(Operation::CreateComplaint).json(complaint)?;
        self.api.execute_as(call, QueryOptions::default()).await
    }

    /// Move a complaint to `status`. Admin only.
    pub async fn set_status(
        &self,
        id: &ComplaintId,
        status: ComplaintStatus,
    ) -> Result<Complaint, ApiError> {
        let call = Call::new(Operation::UpdateComplaintStatus)
            .id(id)
            .json(&json!({ "status": status }))?;
        self.api.execute_as(call, QueryOptions::default()).await
    }

    pub async fn delete(&self, id: &ComplaintId) -> Result<(), ApiError> {
        self.api
            .execute(Call::new(Operation::DeleteComplaint).id(id), QueryOptions::default())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(ComplaintStatus::InProgress).unwrap(),
            json!("in-progress")
        );
        let status: ComplaintStatus = serde_json::from_value(json!("resolved")).unwrap();
        assert!(status.is_closed());
        assert_eq!(ComplaintStatus::InProgress.to_string(), "in-progress");
    }

    #[test]
    fn test_complaint_defaults() {
        let c: Complaint = serde_json::from_value(json!({"_id": "c1", "title": "Broken fan"})).unwrap();
        assert_eq!(c.status, ComplaintStatus::Pending);
        assert!(c.category.is_none());
    }

    #[test]
    fn test_new_complaint_omits_missing_category() {
        let body = serde_json::to_value(NewComplaint {
            title: "Wifi".into(),
            description: "Drops every hour".into(),
            category: None,
        })
        .unwrap();
        assert_eq!(body, json!({"title": "Wifi", "description": "Drops every hour"}));
    }
}
