//! Placement drives and student registrations.

use campus_transport::{MultipartForm, Upload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{CampusApi, QueryOptions};
use crate::ids::{PlacementId, UserId};
use crate::params::Call;
use crate::registry::Operation;
use crate::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    #[serde(alias = "_id")]
    pub id: PlacementId,
    pub company_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
    /// Offered package, as written by the placement office.
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub eligibility: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Whether the signed-in student has registered.
    #[serde(default)]
    pub is_registered: bool,
}

impl Placement {
    /// Whether registration is still open at `now`.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline.map_or(true, |d| now <= d)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlacement {
    pub company_name: String,
    pub role: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

/// A student's application to a placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(alias = "student")]
    pub student_id: UserId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Resume URL.
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub status: RegistrationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Applied,
    Shortlisted,
    Selected,
    Rejected,
}

/// Placement operations.
pub struct Placements<'a> {
    api: &'a CampusApi,
}

impl<'a> Placements<'a> {
    pub(crate) fn new(api: &'a CampusApi) -> Self {
        Self { api }
    }

    /// Placements visible to the signed-in student.
    pub async fn list(&self) -> Result<Vec<Placement>, ApiError> {
        self.api
            .execute_as(
                Call::new(Operation::GetAllPlacementsForStudent),
                QueryOptions::default(),
            )
            .await
    }

    /// One placement by ID.
    pub async fn get(&self, id: &PlacementId) -> Result<Placement, ApiError> {
        self.api
            .execute_as(Call::new(Operation::GetPlacementById).id(id), QueryOptions::default())
            .await
    }

    /// Open a placement drive. Faculty and admin only.
    pub async fn create(&self, placement: &NewPlacement) -> Result<Placement, ApiError> {
        let call = Call::new(Operation::CreatePlacement).json(placement)?;
        self.api.execute_as(call, QueryOptions::default()).await
    }

    /// Apply to a placement with a resume.
    pub async fn register(&self, id: &PlacementId, resume: Upload) -> Result<(), ApiError> {
        let call = Call::new(Operation::RegisterForPlacement)
            .id(id)
            .multipart(MultipartForm::new().file("resume", resume));
        self.api.execute(call, QueryOptions::default()).await?;
        Ok(())
    }

    /// Students registered for a placement.
    pub async fn registrations(&self, id: &PlacementId) -> Result<Vec<Registration>, ApiError> {
        self.api
            .execute_as(
                Call::new(Operation::GetPlacementRegistrations).id(id),
                QueryOptions::default(),
            )
            .await
    }

    /// Set a registered student's status.
    pub async fn set_student_status(
        &self,
        id: &PlacementId,
        student: &UserId,
        status: RegistrationStatus,
    ) -> Result<(), ApiError> {
        let call = Call::new(Operation::UpdateStudentStatus)
            .id(id)
            .param("studentId", student)
            .json(&json!({ "status": status }))?;
        self.api.execute(call, QueryOptions::default()).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &PlacementId) -> Result<(), ApiError> {
        self.api
            .execute(Call::new(Operation::DeletePlacement).id(id), QueryOptions::default())
            .await?;
        Ok(())
    }
}
