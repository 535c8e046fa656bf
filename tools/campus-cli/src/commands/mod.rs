//! CLI command implementations.

pub mod auth;
pub mod complaints;
pub mod config;
pub mod events;
pub mod lost_found;
pub mod notifications;
pub mod placements;

use clap::{Args, Subcommand, ValueEnum};

/// Arguments for the events command.
#[derive(Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Subcommand)]
pub enum EventsCommand {
    /// List all events.
    List {
        /// Bypass cached data.
        #[arg(long)]
        fresh: bool,
    },
    /// Show details for an event.
    Show {
        /// Event ID.
        id: String,
    },
    /// React to an event.
    React {
        /// Event ID.
        id: String,
        /// Reaction type.
        #[arg(short, long, default_value = "like")]
        kind: String,
    },
    /// Remove your reaction from an event.
    Unreact {
        /// Event ID.
        id: String,
    },
    /// Delete an event.
    Delete {
        /// Event ID.
        id: String,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the complaints command.
#[derive(Args)]
pub struct ComplaintsArgs {
    #[command(subcommand)]
    pub command: ComplaintsCommand,
}

#[derive(Subcommand)]
pub enum ComplaintsCommand {
    /// List complaints.
    List {
        /// List every complaint (admin only).
        #[arg(long)]
        all: bool,
    },
    /// File a new complaint.
    New {
        /// Short title.
        #[arg(short, long)]
        title: String,
        /// Full description.
        #[arg(short, long)]
        description: String,
        /// Category.
        #[arg(long)]
        category: Option<String>,
    },
    /// Update a complaint's status (admin only).
    Status {
        /// Complaint ID.
        id: String,
        /// New status.
        #[arg(value_enum)]
        status: StatusArg,
    },
}

/// Complaint status as typed on the command line.
#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

/// Arguments for the lost-found command.
#[derive(Args)]
pub struct LostFoundArgs {
    #[command(subcommand)]
    pub command: LostFoundCommand,
}

#[derive(Subcommand)]
pub enum LostFoundCommand {
    /// List reported items.
    List {
        /// Include claimed items.
        #[arg(long)]
        all: bool,
    },
    /// Mark an item as claimed.
    Claim {
        /// Item ID.
        id: String,
    },
}

/// Arguments for the placements command.
#[derive(Args)]
pub struct PlacementsArgs {
    #[command(subcommand)]
    pub command: PlacementsCommand,
}

#[derive(Subcommand)]
pub enum PlacementsCommand {
    /// List placement drives.
    List,
    /// List the registrations for a placement (faculty and admin).
    Registrations {
        /// Placement ID.
        id: String,
    },
}

/// Arguments for the notifications command.
#[derive(Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Subcommand)]
pub enum NotificationsCommand {
    /// List notifications.
    List {
        /// Only unread notifications.
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification as read.
    Read {
        /// Notification ID.
        id: String,
    },
    /// Mark every notification as read.
    ReadAll,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Show where the configuration was loaded from.
    Path,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
