//! Placement commands.

use anyhow::Result;
use campus_api::prelude::*;
use chrono::Utc;

use super::{PlacementsArgs, PlacementsCommand};
use crate::context::Context;
use crate::output::{format_date, status_badge};

/// Run the placements command.
pub async fn run(args: PlacementsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        PlacementsCommand::List => list_placements(ctx).await,
        PlacementsCommand::Registrations { id } => {
            list_registrations(PlacementId::new(id), ctx).await
        }
    }
}

async fn list_placements(ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;

    let spinner = ctx.output.spinner("Fetching placements...");
    let placements = api.placements().list().await;
    spinner.finish_and_clear();
    let placements = placements?;

    if ctx.output.is_json() {
        ctx.output.json(&placements);
        return Ok(());
    }

    ctx.output.header(&format!("Placements ({})", placements.len()));
    if placements.is_empty() {
        ctx.output.info("No placement drives");
        return Ok(());
    }

    let now = Utc::now();
    let widths = [24, 20, 20, 16, 10];
    ctx.output.table_row(
        &["ID", "COMPANY", "ROLE", "DEADLINE", "STATE"],
        &widths,
    );
    for placement in &placements {
        let state = if placement.is_registered {
            "applied"
        } else if placement.is_open_at(now) {
            "open"
        } else {
            "closed"
        };
        ctx.output.table_row(
            &[
                placement.id.as_str(),
                &placement.company_name,
                &placement.role,
                &format_date(placement.deadline),
                state,
            ],
            &widths,
        );
    }
    Ok(())
}

async fn list_registrations(id: PlacementId, ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;
    let registrations = api.placements().registrations(&id).await?;

    if ctx.output.is_json() {
        ctx.output.json(&registrations);
        return Ok(());
    }

    ctx.output
        .header(&format!("Registrations for {} ({})", id, registrations.len()));
    for reg in &registrations {
        let name = reg.full_name.as_deref().unwrap_or(reg.student_id.as_str());
        let status = serde_json::to_value(reg.status)?;
        let status = status.as_str().unwrap_or_default();
        ctx.output
            .list_item(&format!("{} [{}]", name, status_badge(status)));
    }
    Ok(())
}
