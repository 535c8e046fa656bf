//! Lost-and-found board.

use campus_transport::{MultipartForm, Upload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{CampusApi, QueryOptions};
use crate::ids::{LostItemId, UserId};
use crate::params::Call;
use crate::registry::Operation;
use crate::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LostItem {
    #[serde(alias = "_id")]
    pub id: LostItemId,
    pub item_name: String,
    #[serde(default)]
    pub description: String,
    /// Where the item was lost or found.
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub contact_info: Option<String>,
    /// Image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Whether the owner has it back.
    #[serde(default)]
    pub is_claimed: bool,
    #[serde(default)]
    pub reported_by: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Report for a lost or found item. Sent as multipart.
#[derive(Debug, Clone)]
pub struct NewLostItem {
    pub item_name: String,
    pub description: String,
    pub location: String,
    pub contact_info: Option<String>,
    pub image: Option<Upload>,
}

impl NewLostItem {
    pub fn to_form(&self) -> MultipartForm {
        MultipartForm::new()
            .text("itemName", &self.item_name)
            .text("description", &self.description)
            .text("location", &self.location)
            .text_opt("contactInfo", self.contact_info.clone())
            .file_opt("image", self.image.clone())
    }
}

/// Partial update; sent as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LostItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_claimed: Option<bool>,
}

/// Lost-and-found operations.
pub struct LostFound<'a> {
    api: &'a CampusApi,
}

impl<'a> LostFound<'a> {
    pub(crate) fn new(api: &'a CampusApi) -> Self {
        Self { api }
    }

    /// All reported items.
    pub async fn list(&self) -> Result<Vec<LostItem>, ApiError> {
        self.api
            .execute_as(Call::new(Operation::GetAllLostItems), QueryOptions::default())
            .await
    }

    /// One item by ID.
    pub async fn get(&self, id: &LostItemId) -> Result<LostItem, ApiError> {
        self.api
            .execute_as(Call::new(Operation::GetLostItemById).id(id), QueryOptions::default())
            .await
    }

    /// Report a lost or found item.
    pub async fn report(&self, item: &NewLostItem) -> Result<LostItem, ApiError> {
        let call = Call::new(Operation::ReportLostItem).multipart(item.to_form());
        self.api.execute_as(call, QueryOptions::default()).await
    }

    /// Edit a report.
    pub async fn update(&self, id: &LostItemId, update: &LostItemUpdate) -> Result<LostItem, ApiError> {
        let call = Call::new(Operation::UpdateLostItem).id(id).json(update)?;
        self.api.execute_as(call, QueryOptions::default()).await
    }

    /// Mark an item as returned to its owner.
    pub async fn mark_claimed(&self, id: &LostItemId) -> Result<LostItem, ApiError> {
        self.update(
            id,
            &LostItemUpdate {
                is_claimed: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete(&self, id: &LostItemId) -> Result<(), ApiError> {
        self.api
            .execute(Call::new(Operation::DeleteLostItem).id(id), QueryOptions::default())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lost_item_from_backend_json() {
        let item: LostItem = serde_json::from_value(json!({
            "_id": "l1",
            "itemName": "Blue umbrella",
            "location": "Library",
            "isClaimed": true
        }))
        .unwrap();
        assert_eq!(item.item_name, "Blue umbrella");
        assert!(item.is_claimed);
        assert!(item.contact_info.is_none());
    }

    #[test]
    fn test_report_form_fields() {
        let form = NewLostItem {
            item_name: "Keys".into(),
            description: "Three keys on a red ring".into(),
            location: "Gym".into(),
            contact_info: None,
            image: None,
        }
        .to_form();
        assert_eq!(form.names(), vec!["itemName", "description", "location"]);
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = LostItemUpdate {
            is_claimed: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"isClaimed": true}));
    }
}
