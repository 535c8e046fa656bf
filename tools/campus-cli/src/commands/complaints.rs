//! Complaint commands.

use anyhow::Result;
use campus_api::prelude::*;

use super::{ComplaintsArgs, ComplaintsCommand, StatusArg};
use crate::context::Context;
use crate::output::{format_date, status_badge};

/// Run the complaints command.
pub async fn run(args: ComplaintsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ComplaintsCommand::List { all } => list_complaints(all, ctx).await,
        ComplaintsCommand::New {
            title,
            description,
            category,
        } => {
            let complaint = NewComplaint {
                title,
                description,
                category,
            };
            file_complaint(&complaint, ctx).await
        }
        ComplaintsCommand::Status { id, status } => {
            set_status(ComplaintId::new(id), status.into(), ctx).await
        }
    }
}

impl From<StatusArg> for ComplaintStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => ComplaintStatus::Pending,
            StatusArg::InProgress => ComplaintStatus::InProgress,
            StatusArg::Resolved => ComplaintStatus::Resolved,
            StatusArg::Rejected => ComplaintStatus::Rejected,
        }
    }
}

async fn list_complaints(all: bool, ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;

    let spinner = ctx.output.spinner("Fetching complaints...");
    let complaints = if all {
        api.complaints().list_all().await
    } else {
        api.complaints().mine().await
    };
    spinner.finish_and_clear();
    let complaints = complaints?;

    if ctx.output.is_json() {
        ctx.output.json(&complaints);
        return Ok(());
    }

    let open = complaints.iter().filter(|c| !c.status.is_closed()).count();
    ctx.output
        .header(&format!("Complaints ({} open of {})", open, complaints.len()));
    if complaints.is_empty() {
        ctx.output.info("No complaints");
        return Ok(());
    }

    let widths = [24, 36, 12, 16];
    ctx.output
        .table_row(&["ID", "TITLE", "STATUS", "FILED"], &widths);
    for complaint in &complaints {
        ctx.output.table_row(
            &[
                complaint.id.as_str(),
                &complaint.title,
                complaint.status.as_str(),
                &format_date(complaint.created_at),
            ],
            &widths,
        );
    }
    Ok(())
}

async fn file_complaint(complaint: &NewComplaint, ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;
    let created = api.complaints().create(complaint).await?;

    if ctx.output.is_json() {
        ctx.output.json(&created);
    } else {
        ctx.output
            .success(&format!("Filed complaint {}", created.id));
    }
    Ok(())
}

async fn set_status(id: ComplaintId, status: ComplaintStatus, ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;
    let updated = api.complaints().set_status(&id, status).await?;

    if ctx.output.is_json() {
        ctx.output.json(&updated);
    } else {
        ctx.output.success(&format!(
            "Complaint {} is now {}",
            updated.id,
            status_badge(updated.status.as_str())
        ));
    }
    Ok(())
}
