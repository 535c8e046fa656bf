//! Configuration management commands.

use anyhow::{bail, Result};
use campus_api::CampusConfig;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Path => show_path(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    print!("{}", ctx.config.render(false)?);
    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    match &ctx.config_path {
        Some(path) if ctx.output.is_json() => ctx.output.json(&path),
        Some(path) => println!("{}", path.display()),
        None => ctx.output.info("No config file found; using defaults"),
    }
    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let path = ctx
        .config_path
        .clone()
        .unwrap_or_else(|| ctx.default_config_path());

    if path.exists() && !force {
        bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    CampusConfig::default().save(&path)?;
    ctx.output
        .success(&format!("Created {}", path.display()));
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    let Some(path) = &ctx.config_path else {
        ctx.output.warn("No config file found; defaults are in use");
        return Ok(());
    };

    let config = CampusConfig::load(path)?;
    let mut problems = Vec::new();
    if !config.api.base_url.starts_with("http://") && !config.api.base_url.starts_with("https://") {
        problems.push(format!("api.base_url must be an http(s) URL, got '{}'", config.api.base_url));
    }
    if !config.auth.refresh_path.starts_with('/') {
        problems.push(format!(
            "auth.refresh_path must start with '/', got '{}'",
            config.auth.refresh_path
        ));
    }

    if problems.is_empty() {
        ctx.output
            .success(&format!("{} is valid", path.display()));
        return Ok(());
    }
    for problem in &problems {
        ctx.output.list_item(problem);
    }
    bail!("{} has {} problem(s)", path.display(), problems.len())
}
