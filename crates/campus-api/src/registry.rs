//! Endpoint registry.
//!
//! Every backend operation is one row of [`ENDPOINTS`]: method, path
//! template, body shape, auth mode, and the tags it provides (queries) or
//! invalidates (mutations). [`crate::CampusApi`] is a generic executor over
//! this table.

use std::fmt;
use std::str::FromStr;

use campus_cache::Tag;
use campus_transport::{AuthMode, Method};

use crate::params::Params;
use crate::ApiError;

/// Tag kinds.
pub mod kinds {
    pub const USER: &str = "User";
    pub const EVENTS: &str = "Events";
    pub const COMPLAINTS: &str = "Complaints";
    pub const LOST_FOUND: &str = "LostFound";
    pub const PLACEMENTS: &str = "Placements";
    pub const REGISTRATIONS: &str = "Registrations";
    pub const NOTIFICATIONS: &str = "Notifications";
}

/// Kinds whose data belongs to the signed-in user. Cleared on logout and
/// invalidated on login.
pub const USER_SCOPED_KINDS: [&str; 5] = [
    kinds::USER,
    kinds::NOTIFICATIONS,
    kinds::COMPLAINTS,
    kinds::PLACEMENTS,
    kinds::REGISTRATIONS,
];

/// Collection tags for every user-scoped kind.
pub fn user_scoped_tags() -> Vec<Tag> {
    USER_SCOPED_KINDS.iter().map(|k| Tag::collection(*k)).collect()
}

/// Tag with an optional id taken from a call parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTemplate {
    /// `{kind}`.
    Collection(&'static str),
    /// `{kind, id}` where the id is the named parameter.
    Item(&'static str, &'static str),
}

impl TagTemplate {
    /// Fill in the template from `params`.
    pub fn render(&self, operation: Operation, params: &Params) -> Result<Tag, ApiError> {
        match *self {
            TagTemplate::Collection(kind) => Ok(Tag::collection(kind)),
            TagTemplate::Item(kind, param) => {
                let id = params.get(param).ok_or(ApiError::MissingParam {
                    operation: operation.name(),
                    param,
                })?;
                Ok(Tag::item(kind, id))
            }
        }
    }
}

/// Whether an endpoint reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Cached read providing these tags.
    Query { provides: &'static [TagTemplate] },
    /// Write invalidating these tags on success.
    Mutation { invalidates: &'static [TagTemplate] },
}

/// What a successful call does to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionEffect {
    #[default]
    None,
    /// The response carries new credentials.
    SetCredentials,
    /// The session ends. Applied whether or not the call succeeds.
    Clear,
}

/// One row of the endpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSpec {
    pub operation: Operation,
    pub method: Method,
    /// Path relative to the base URL, with `{param}` placeholders.
    pub path: &'static str,
    pub multipart: bool,
    pub auth: AuthMode,
    pub kind: EndpointKind,
    pub session: SessionEffect,
}

impl EndpointSpec {
    /// Operation name.
    pub fn name(&self) -> &'static str {
        self.operation.name()
    }

    /// Whether results are cached.
    pub fn is_query(&self) -> bool {
        matches!(self.kind, EndpointKind::Query { .. })
    }

    /// Substitute `{param}` placeholders in the path.
    ///
    /// Each value is percent-encoded as a single path segment. Empty values
    /// and the dot segments `.` and `..` are rejected.
    pub fn render_path(&self, params: &Params) -> Result<String, ApiError> {
        let mut out = String::with_capacity(self.path.len());
        let mut rest: &'static str = self.path;
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            let name = &rest[start + 1..start + len];
            let value = params.get(name).ok_or(ApiError::MissingParam {
                operation: self.name(),
                param: name,
            })?;
            if matches!(value, "" | "." | "..") {
                return Err(ApiError::InvalidInput {
                    operation: self.name(),
                    reason: format!("`{}` is not a valid value for `{}`", value, name),
                });
            }
            out.push_str(&rest[..start]);
            out.push_str(&urlencoding::encode(value));
            rest = &rest[start + len + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Tags a query provides.
    pub fn provided_tags(&self, params: &Params) -> Result<Vec<Tag>, ApiError> {
        match self.kind {
            EndpointKind::Query { provides } => self.render_tags(provides, params),
            EndpointKind::Mutation { .. } => Ok(Vec::new()),
        }
    }

    /// Tags a mutation invalidates.
    pub fn invalidated_tags(&self, params: &Params) -> Result<Vec<Tag>, ApiError> {
        match self.kind {
            EndpointKind::Mutation { invalidates } => self.render_tags(invalidates, params),
            EndpointKind::Query { .. } => Ok(Vec::new()),
        }
    }

    fn render_tags(&self, templates: &[TagTemplate], params: &Params) -> Result<Vec<Tag>, ApiError> {
        templates
            .iter()
            .map(|t| t.render(self.operation, params))
            .collect()
    }
}

macro_rules! operations {
    ($($variant:ident => $name:literal,)*) => {
        /// A backend operation.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Operation {
            $($variant,)*
        }

        impl Operation {
            /// Every operation, in table order.
            pub const ALL: &'static [Operation] = &[$(Operation::$variant,)*];

            /// Operation name used in cache keys and logs.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Operation::$variant => $name,)*
                }
            }
        }

        impl FromStr for Operation {
            type Err = ApiError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Operation::$variant),)*
                    other => Err(ApiError::InvalidInput {
                        operation: "lookup",
                        reason: format!("unknown operation `{}`", other),
                    }),
                }
            }
        }
    };
}

operations! {
    Login => "login",
    Register => "register",
    Logout => "logout",
    RefreshToken => "refreshToken",
    ChangePassword => "changePassword",
    GetCurrentUser => "getCurrentUser",
    GetAllEvents => "getAllEvents",
    GetEventById => "getEventById",
    CreateEvent => "createEvent",
    UpdateEvent => "updateEvent",
    DeleteEvent => "deleteEvent",
    AddOrUpdateReaction => "addOrUpdateReaction",
    DeleteReaction => "deleteReaction",
    GetAllComplaints => "getAllComplaints",
    GetMyComplaints => "getMyComplaints",
    GetComplaintById => "getComplaintById",
    CreateComplaint => "createComplaint",
    UpdateComplaintStatus => "updateComplaintStatus",
    DeleteComplaint => "deleteComplaint",
    GetAllLostItems => "getAllLostItems",
    GetLostItemById => "getLostItemById",
    ReportLostItem => "reportLostItem",
    UpdateLostItem => "updateLostItem",
    DeleteLostItem => "deleteLostItem",
    CreatePlacement => "createPlacement",
    GetAllPlacementsForStudent => "getAllPlacementsForStudent",
    GetPlacementById => "getPlacementById",
    RegisterForPlacement => "registerForPlacement",
    GetPlacementRegistrations => "getPlacementRegistrations",
    UpdateStudentStatus => "updateStudentStatus",
    DeletePlacement => "deletePlacement",
    GetComplaintNotifications => "getComplaintNotifications",
    MarkNotificationAsRead => "markNotificationAsRead",
    MarkAllNotificationsAsRead => "markAllNotificationsAsRead",
}

impl Operation {
    /// This operation's row in [`ENDPOINTS`].
    pub fn spec(&self) -> &'static EndpointSpec {
        &ENDPOINTS[*self as usize]
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use self::kinds::*;
use self::TagTemplate::{Collection, Item};

const fn query(operation: Operation, path: &'static str, provides: &'static [TagTemplate]) -> EndpointSpec {
    EndpointSpec {
        operation,
        method: Method::Get,
        path,
        multipart: false,
        auth: AuthMode::Bearer,
        kind: EndpointKind::Query { provides },
        session: SessionEffect::None,
    }
}

const fn mutation(
    operation: Operation,
    method: Method,
    path: &'static str,
    invalidates: &'static [TagTemplate],
) -> EndpointSpec {
    EndpointSpec {
        operation,
        method,
        path,
        multipart: false,
        auth: AuthMode::Bearer,
        kind: EndpointKind::Mutation { invalidates },
        session: SessionEffect::None,
    }
}

const fn with_multipart(mut spec: EndpointSpec) -> EndpointSpec {
    spec.multipart = true;
    spec
}

const fn anonymous(mut spec: EndpointSpec) -> EndpointSpec {
    spec.auth = AuthMode::Anonymous;
    spec
}

const fn with_session(mut spec: EndpointSpec, session: SessionEffect) -> EndpointSpec {
    spec.session = session;
    spec
}

/// The endpoint table, indexed by `Operation as usize`.
pub static ENDPOINTS: [EndpointSpec; 34] = [
    // Auth
    with_session(
        anonymous(mutation(Operation::Login, Method::Post, "/login", &[])),
        SessionEffect::SetCredentials,
    ),
    with_multipart(anonymous(mutation(Operation::Register, Method::Post, "/register", &[]))),
    with_session(
        mutation(Operation::Logout, Method::Post, "/logout", &[]),
        SessionEffect::Clear,
    ),
    with_session(
        anonymous(mutation(Operation::RefreshToken, Method::Post, "/refresh-token", &[])),
        SessionEffect::SetCredentials,
    ),
    mutation(Operation::ChangePassword, Method::Post, "/change-password", &[]),
    query(Operation::GetCurrentUser, "/current-user", &[Collection(USER)]),
    // Events
    query(Operation::GetAllEvents, "/events/all", &[Collection(EVENTS)]),
    query(Operation::GetEventById, "/events/view/{id}", &[Item(EVENTS, "id")]),
    with_multipart(mutation(
        Operation::CreateEvent,
        Method::Post,
        "/events/create",
        &[Collection(EVENTS)],
    )),
    with_multipart(mutation(
        Operation::UpdateEvent,
        Method::Put,
        "/events/update/{id}",
        &[Item(EVENTS, "id"), Collection(EVENTS)],
    )),
    mutation(
        Operation::DeleteEvent,
        Method::Delete,
        "/events/delete/{id}",
        &[Item(EVENTS, "id"), Collection(EVENTS)],
    ),
    mutation(
        Operation::AddOrUpdateReaction,
        Method::Post,
        "/events/{id}/reactions",
        &[Item(EVENTS, "id"), Collection(EVENTS)],
    ),
    mutation(
        Operation::DeleteReaction,
        Method::Delete,
        "/events/{id}/reactions",
        &[Item(EVENTS, "id"), Collection(EVENTS)],
    ),
    // Complaints
    query(Operation::GetAllComplaints, "/complaints/all", &[Collection(COMPLAINTS)]),
    query(Operation::GetMyComplaints, "/complaints/my", &[Collection(COMPLAINTS)]),
    query(
        Operation::GetComplaintById,
        "/complaints/view/{id}",
        &[Item(COMPLAINTS, "id")],
    ),
    mutation(
        Operation::CreateComplaint,
        Method::Post,
        "/complaints/create",
        &[Collection(COMPLAINTS), Collection(NOTIFICATIONS)],
    ),
    mutation(
        Operation::UpdateComplaintStatus,
        Method::Put,
        "/complaints/update-status/{id}",
        &[Item(COMPLAINTS, "id"), Collection(COMPLAINTS), Collection(NOTIFICATIONS)],
    ),
    mutation(
        Operation::DeleteComplaint,
        Method::Delete,
        "/complaints/delete/{id}",
        &[Item(COMPLAINTS, "id"), Collection(COMPLAINTS)],
    ),
    // Lost and found
    query(Operation::GetAllLostItems, "/lost-found/all", &[Collection(LOST_FOUND)]),
    query(
        Operation::GetLostItemById,
        "/lost-found/view/{id}",
        &[Item(LOST_FOUND, "id")],
    ),
    with_multipart(mutation(
        Operation::ReportLostItem,
        Method::Post,
        "/lost-found/create",
        &[Collection(LOST_FOUND)],
    )),
    mutation(
        Operation::UpdateLostItem,
        Method::Put,
        "/lost-found/update/{id}",
        &[Item(LOST_FOUND, "id"), Collection(LOST_FOUND)],
    ),
    mutation(
        Operation::DeleteLostItem,
        Method::Delete,
        "/lost-found/delete/{id}",
        &[Item(LOST_FOUND, "id"), Collection(LOST_FOUND)],
    ),
    // Placements
    mutation(
        Operation::CreatePlacement,
        Method::Post,
        "/placements/create",
        &[Collection(PLACEMENTS)],
    ),
    query(
        Operation::GetAllPlacementsForStudent,
        "/placements/student",
        &[Collection(PLACEMENTS)],
    ),
    query(
        Operation::GetPlacementById,
        "/placements/{id}",
        &[Item(PLACEMENTS, "id")],
    ),
    with_multipart(mutation(
        Operation::RegisterForPlacement,
        Method::Post,
        "/placements/{id}/register",
        &[Item(PLACEMENTS, "id"), Collection(PLACEMENTS)],
    )),
    query(
        Operation::GetPlacementRegistrations,
        "/placements/{id}/registrations",
        &[Item(REGISTRATIONS, "id")],
    ),
    mutation(
        Operation::UpdateStudentStatus,
        Method::Put,
        "/placements/{id}/students/{studentId}/status",
        &[Item(REGISTRATIONS, "id"), Item(PLACEMENTS, "id")],
    ),
    mutation(
        Operation::DeletePlacement,
        Method::Delete,
        "/placements/{id}",
        &[Item(PLACEMENTS, "id"), Collection(PLACEMENTS)],
    ),
    // Notifications
    query(
        Operation::GetComplaintNotifications,
        "/notifications",
        &[Collection(NOTIFICATIONS)],
    ),
    mutation(
        Operation::MarkNotificationAsRead,
        Method::Post,
        "/mark-notification-read",
        &[Collection(NOTIFICATIONS)],
    ),
    mutation(
        Operation::MarkAllNotificationsAsRead,
        Method::Post,
        "/mark-all-notifications-read",
        &[Collection(NOTIFICATIONS)],
    ),
];
