//! Sign-in check.

use anyhow::Result;

use crate::context::Context;

/// Sign in and print the current user.
pub async fn whoami(ctx: &Context) -> Result<()> {
    let (api, user) = ctx.signed_in().await?;

    if ctx.output.is_json() {
        ctx.output.json(&user);
    } else {
        ctx.output
            .success(&format!("Signed in as {}", user.display_name()));
        ctx.output.kv("id", &user.id);
        ctx.output.kv("username", &user.username);
        if let Some(email) = &user.email {
            ctx.output.kv("email", email);
        }
        ctx.output.kv("role", user.role().as_str());
    }

    api.auth().logout().await?;
    Ok(())
}
