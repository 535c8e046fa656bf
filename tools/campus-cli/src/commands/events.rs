//! Event commands.

use anyhow::Result;
use campus_api::prelude::*;
use dialoguer::Confirm;

use super::{EventsArgs, EventsCommand};
use crate::context::Context;
use crate::output::format_date;

/// Run the events command.
pub async fn run(args: EventsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        EventsCommand::List { fresh } => list_events(fresh, ctx).await,
        EventsCommand::Show { id } => show_event(EventId::new(id), ctx).await,
        EventsCommand::React { id, kind } => react(EventId::new(id), &kind, ctx).await,
        EventsCommand::Unreact { id } => unreact(EventId::new(id), ctx).await,
        EventsCommand::Delete { id, yes } => delete_event(EventId::new(id), yes, ctx).await,
    }
}

async fn list_events(fresh: bool, ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;

    let options = if fresh {
        QueryOptions::fresh()
    } else {
        QueryOptions::default()
    };
    let spinner = ctx.output.spinner("Fetching events...");
    let events = api.events().list_with(options).await;
    spinner.finish_and_clear();
    let events = events?;

    if ctx.output.is_json() {
        ctx.output.json(&events);
        return Ok(());
    }

    ctx.output.header(&format!("Events ({})", events.len()));
    if events.is_empty() {
        ctx.output.info("No events yet");
        return Ok(());
    }

    let widths = [24, 32, 16, 20, 6];
    ctx.output
        .table_row(&["ID", "TITLE", "DATE", "LOCATION", "LIKES"], &widths);
    for event in &events {
        ctx.output.table_row(
            &[
                event.id.as_str(),
                &event.title,
                &event.date,
                &event.location,
                &event.reaction_count("like").to_string(),
            ],
            &widths,
        );
    }
    Ok(())
}

async fn show_event(id: EventId, ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;
    let event = api.events().get(&id).await?;

    if ctx.output.is_json() {
        ctx.output.json(&event);
        return Ok(());
    }

    ctx.output.header(&event.title);
    ctx.output.kv("id", event.id.as_str());
    ctx.output.kv("date", &event.date);
    ctx.output.kv("location", &event.location);
    ctx.output.kv("posted", &format_date(event.created_at));
    if let Some(image) = &event.image {
        ctx.output.kv("image", image);
    }
    ctx.output.kv("reactions", &event.reactions.len().to_string());
    if !event.description.is_empty() {
        println!();
        println!("{}", event.description);
    }
    Ok(())
}

async fn react(id: EventId, kind: &str, ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;
    api.events().react(&id, kind).await?;
    ctx.output.success(&format!("Reacted to {} with '{}'", id, kind));
    Ok(())
}

async fn unreact(id: EventId, ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;
    api.events().unreact(&id).await?;
    ctx.output.success(&format!("Removed reaction from {}", id));
    Ok(())
}

async fn delete_event(id: EventId, yes: bool, ctx: &Context) -> Result<()> {
    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete event {}?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.info("Cancelled");
            return Ok(());
        }
    }

    let (api, _) = ctx.signed_in().await?;
    api.events().delete(&id).await?;
    ctx.output.success(&format!("Deleted event {}", id));
    Ok(())
}
