//! Notification commands.

use anyhow::Result;
use campus_api::notifications::unread_count;
use campus_api::prelude::*;
use console::style;

use super::{NotificationsArgs, NotificationsCommand};
use crate::context::Context;
use crate::output::format_date;

/// Run the notifications command.
pub async fn run(args: NotificationsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        NotificationsCommand::List { unread } => list_notifications(unread, ctx).await,
        NotificationsCommand::Read { id } => mark_read(NotificationId::new(id), ctx).await,
        NotificationsCommand::ReadAll => mark_all_read(ctx).await,
    }
}

async fn list_notifications(unread_only: bool, ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;
    let notifications = api.notifications().list().await?;
    let unread = unread_count(&notifications);

    let shown: Vec<&Notification> = notifications
        .iter()
        .filter(|n| !unread_only || !n.is_read)
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&shown);
        return Ok(());
    }

    ctx.output
        .header(&format!("Notifications ({} unread)", unread));
    for n in shown {
        let marker = if n.is_read {
            style(" ").to_string()
        } else {
            style("●").cyan().to_string()
        };
        ctx.output.list_item(&format!(
            "{} {}  {}  {}",
            marker,
            style(format_date(n.created_at)).dim(),
            n.message,
            style(n.id.as_str()).dim()
        ));
    }
    Ok(())
}

async fn mark_read(id: NotificationId, ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;
    api.notifications().mark_read(&id).await?;
    ctx.output.success(&format!("Marked {} as read", id));
    Ok(())
}

async fn mark_all_read(ctx: &Context) -> Result<()> {
    let (api, _) = ctx.signed_in().await?;
    api.notifications().mark_all_read().await?;
    ctx.output.success("Marked all notifications as read");
    Ok(())
}
