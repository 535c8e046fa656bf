//! Complaint notifications for the signed-in user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{CampusApi, QueryOptions};
use crate::ids::{ComplaintId, NotificationId};
use crate::params::Call;
use crate::registry::Operation;
use crate::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: NotificationId,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub complaint_id: Option<ComplaintId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Count of unread notifications in `items`.
pub fn unread_count(items: &[Notification]) -> usize {
    items.iter().filter(|n| !n.is_read).count()
}

/// Notification operations.
pub struct Notifications<'a> {
    api: &'a CampusApi,
}

impl<'a> Notifications<'a> {
    pub(crate) fn new(api: &'a CampusApi) -> Self {
        Self { api }
    }

    /// Notifications for the signed-in user.
    pub async fn list(&self) -> Result<Vec<Notification>, ApiError> {
        self.api
            .execute_as(
                Call::new(Operation::GetComplaintNotifications),
                QueryOptions::default(),
            )
            .await
    }

    /// Mark one notification as read.
    pub async fn mark_read(&self, id: &NotificationId) -> Result<(), ApiError> {
        let call = Call::new(Operation::MarkNotificationAsRead)
            .json(&json!({ "notificationId": id }))?;
        self.api.execute(call, QueryOptions::default()).await?;
        Ok(())
    }

    /// Mark every notification as read.
    pub async fn mark_all_read(&self) -> Result<(), ApiError> {
        self.api
            .execute(
                Call::new(Operation::MarkAllNotificationsAsRead),
                QueryOptions::default(),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_count() {
        let items: Vec<Notification> = serde_json::from_value(json!([
            {"_id": "n1", "message": "Complaint resolved", "isRead": true},
            {"_id": "n2", "message": "Complaint in progress"},
            {"_id": "n3", "message": "New reply", "complaintId": "c4"}
        ]))
        .unwrap();
        assert_eq!(unread_count(&items), 2);
        assert_eq!(items[2].complaint_id.as_ref().map(|c| c.as_str()), Some("c4"));
    }
}
