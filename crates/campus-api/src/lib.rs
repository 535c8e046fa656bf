//! Typed access to the campus services backend.
//!
//! This crate ties the data-access layer together:
//!
//! - **Registry**: one [`EndpointSpec`] per [`Operation`], naming the path,
//!   body shape, auth mode and the cache tags it provides or invalidates
//! - **Executor**: [`CampusApi`] runs any [`Call`], serving queries from the
//!   tag-indexed cache and invalidating tags after successful mutations
//! - **Resources**: typed wrappers for auth, events, complaints,
//!   lost-and-found, placements and notifications
//! - **Config**: [`CampusConfig`] loaded from TOML or JSON
//!
//! # Example
//!
//! ```rust,ignore
//! use campus_api::prelude::*;
//!
//! let api = CampusApi::from_config(&CampusConfig::resolve(None)?)?;
//! api.auth().login("ana", "secret").await?;
//!
//! let events = api.events().list().await?;          // network
//! let again = api.events().list().await?;           // cache hit
//!
//! api.events().delete(&events[0].id).await?;        // invalidates Events
//! let fresh = api.events().list().await?;           // network again
//! ```

pub mod api;
pub mod auth;
pub mod complaints;
pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod lost_found;
pub mod notifications;
pub mod params;
pub mod placements;
pub mod registry;

pub use api::{CampusApi, QueryOptions, ResponseCache, Watch};
pub use config::CampusConfig;
pub use error::ApiError;
pub use ids::*;
pub use params::{Call, Params};
pub use registry::{EndpointKind, EndpointSpec, Operation, SessionEffect, TagTemplate, ENDPOINTS};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::api::{CampusApi, QueryOptions};
    pub use crate::config::CampusConfig;
    pub use crate::error::ApiError;
    pub use crate::ids::*;
    pub use crate::params::{Call, Params};
    pub use crate::registry::Operation;

    pub use crate::auth::{ChangePassword, RegisterRequest};
    pub use crate::complaints::{Complaint, ComplaintStatus, NewComplaint};
    pub use crate::events::{Event, EventUpdate, NewEvent, Reaction};
    pub use crate::lost_found::{LostItem, LostItemUpdate, NewLostItem};
    pub use crate::notifications::Notification;
    pub use crate::placements::{NewPlacement, Placement, Registration, RegistrationStatus};

    pub use campus_transport::Upload;
}
