//! Campus events and reactions.

use campus_transport::{MultipartForm, Upload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{CampusApi, QueryOptions};
use crate::ids::{EventId, UserId};
use crate::params::Call;
use crate::registry::Operation;
use crate::ApiError;

/// An event as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Event date as sent by the organizer.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    /// Image URL.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Number of reactions of `kind`.
    pub fn reaction_count(&self, kind: &str) -> usize {
        self.reactions.iter().filter(|r| r.kind == kind).count()
    }
}

/// One user's reaction to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(alias = "userId")]
    pub user: UserId,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Input for creating an event. Sent as multipart.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: String,
    pub location: String,
    pub image: Option<Upload>,
}

impl NewEvent {
    pub fn to_form(&self) -> MultipartForm {
        MultipartForm::new()
            .text("title", &self.title)
            .text("description", &self.description)
            .text("date", &self.date)
            .text("location", &self.location)
            .file_opt("image", self.image.clone())
    }
}

/// Partial update of an event. Unset fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub image: Option<Upload>,
}

impl EventUpdate {
    pub fn to_form(&self) -> MultipartForm {
        MultipartForm::new()
            .text_opt("title", self.title.clone())
            .text_opt("description", self.description.clone())
            .text_opt("date", self.date.clone())
            .text_opt("location", self.location.clone())
            .file_opt("image", self.image.clone())
    }
}

/// Event operations.
pub struct Events<'a> {
    api: &'a CampusApi,
}

impl<'a> Events<'a> {
    pub(crate) fn new(api: &'a CampusApi) -> Self {
        Self { api }
    }

    /// All events, served from cache when fresh.
    pub async fn list(&self) -> Result<Vec<Event>, ApiError> {
        self.list_with(QueryOptions::default()).await
    }

    /// All events with explicit query options.
    pub async fn list_with(&self, options: QueryOptions) -> Result<Vec<Event>, ApiError> {
        self.api
            .execute_as(Call::new(Operation::GetAllEvents), options)
            .await
    }

    /// One event by ID.
    pub async fn get(&self, id: &EventId) -> Result<Event, ApiError> {
        self.api
            .execute_as(Call::new(Operation::GetEventById).id(id), QueryOptions::default())
            .await
    }

    /// Publish an event; the image is sent as multipart.
    pub async fn create(&self, event: &NewEvent) -> Result<Event, ApiError> {
        let call = Call::new(Operation::CreateEvent).multipart(event.to_form());
        self.api.execute_as(call, QueryOptions::default()).await
    }

    /// Edit an event. Unset fields are left unchanged.
    pub async fn update(&self, id: &EventId, update: &EventUpdate) -> Result<Event, ApiError> {
        let call = Call::new(Operation::UpdateEvent)
            .id(id)
            .multipart(update.to_form());
        self.api.execute_as(call, QueryOptions::default()).await
    }

    /// Delete an event.
    pub async fn delete(&self, id: &EventId) -> Result<(), ApiError> {
        self.api
            .execute(Call::new(Operation::DeleteEvent).id(id), QueryOptions::default())
            .await?;
        Ok(())
    }

    /// Add a reaction, or change the caller's existing one.
    pub async fn react(&self, id: &EventId, kind: &str) -> Result<(), ApiError> {
        let call = Call::new(Operation::AddOrUpdateReaction)
            .id(id)
            .json(&json!({ "type": kind }))?;
        self.api.execute(call, QueryOptions::default()).await?;
        Ok(())
    }

    /// Remove the caller's reaction.
    pub async fn unreact(&self, id: &EventId) -> Result<(), ApiError> {
        self.api
            .execute(Call::new(Operation::DeleteReaction).id(id), QueryOptions::default())
            .await?;
        Ok(())
    }
}
