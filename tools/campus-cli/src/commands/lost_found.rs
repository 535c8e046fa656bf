//! Lost-and-found commands.

use anyhow::Result;
use campus_api::prelude::*;

use super::{LostFoundArgs, LostFoundCommand};
use crate::context::Context;
use crate::output::{format_date, status_badge};

/// Run the lost-found command.
pub async fn run(args: LostFoundArgs, ctx: &Context) -> Result<()> {
    match args.command {
        LostFoundCommand::List { all } => list_items(all, ctx).await,
        LostFoundCommand::Claim { id } => claim(LostItemId::new(id), ctx).await,
    }
}

async fn list_items(all: bool, ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;

    let spinner = ctx.output.spinner("Fetching lost-and-found reports...");
    let items = api.lost_found().list().await;
    spinner.finish_and_clear();
    let items: Vec<LostItem> = items?
        .into_iter()
        .filter(|item| all || !item.is_claimed)
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&items);
        return Ok(());
    }

    ctx.output.header(&format!("Lost and found ({})", items.len()));
    if items.is_empty() {
        ctx.output.info("Nothing reported");
        return Ok(());
    }

    let widths = [24, 28, 20, 9, 16];
    ctx.output.table_row(
        &["ID", "ITEM", "LOCATION", "STATE", "REPORTED"],
        &widths,
    );
    for item in &items {
        let state = if item.is_claimed { "claimed" } else { "open" };
        ctx.output.table_row(
            &[
                item.id.as_str(),
                &item.item_name,
                &item.location,
                state,
                &format_date(item.created_at),
            ],
            &widths,
        );
    }
    Ok(())
}

async fn claim(id: LostItemId, ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;
    let item = api.lost_found().mark_claimed(&id).await?;

    if ctx.output.is_json() {
        ctx.output.json(&item);
    } else {
        ctx.output.success(&format!(
            "{} is {}",
            item.item_name,
            status_badge("claimed")
        ));
    }
    Ok(())
}
