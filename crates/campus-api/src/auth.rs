//! Sign-in, registration and account operations.

use campus_session::{AccessToken, Identity};
use campus_transport::{MultipartForm, Upload};
use serde::Serialize;

use crate::api::{CampusApi, QueryOptions};
use crate::params::Call;
use crate::registry::Operation;
use crate::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// New account. Sent as multipart so an avatar can be attached.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub avatar: Option<Upload>,
    /// Secret required to create an admin account.
    pub admin_secret: Option<String>,
}

impl RegisterRequest {
    /// Multipart body for `register`.
    pub fn to_form(&self) -> MultipartForm {
        MultipartForm::new()
            .text("username", &self.username)
            .text("email", &self.email)
            .text("fullName", &self.full_name)
            .text("password", &self.password)
            .text_opt("adminSecretKey", self.admin_secret.clone())
            .file_opt("avatar", self.avatar.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub old_password: String,
    pub new_password: String,
}

/// Authentication operations.
pub struct Auth<'a> {
    api: &'a CampusApi,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(api: &'a CampusApi) -> Self {
        Self { api }
    }

    /// Sign in. Stores the returned credentials in the session and
    /// invalidates every user-scoped read.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<Identity>, ApiError> {
        let call = Call::new(Operation::Login).json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        self.api.execute(call, QueryOptions::default()).await?;
        Ok(self.api.session().current().user)
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Identity, ApiError> {
        let call = Call::new(Operation::Register).multipart(request.to_form());
        self.api.execute_as(call, QueryOptions::default()).await
    }

    /// Sign out. The local session and user-scoped cache entries are
    /// dropped even when the server call fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.api
            .execute(Call::new(Operation::Logout), QueryOptions::default())
            .await?;
        Ok(())
    }

    /// Refresh the access token, joining a refresh already in flight.
    pub async fn refresh(&self) -> Result<AccessToken, ApiError> {
        Ok(self.api.client().refresh().await?)
    }

    /// Change the signed-in user's password.
    pub async fn change_password(&self, old: &str, new: &str) -> Result<(), ApiError> {
        let call = Call::new(Operation::ChangePassword).json(&ChangePassword {
            old_password: old.to_string(),
            new_password: new.to_string(),
        })?;
        self.api.execute(call, QueryOptions::default()).await?;
        Ok(())
    }

    /// The signed-in user as the backend sees it.
    pub async fn current_user(&self) -> Result<Identity, ApiError> {
        self.api
            .execute_as(Call::new(Operation::GetCurrentUser), QueryOptions::default())
            .await
    }
}
