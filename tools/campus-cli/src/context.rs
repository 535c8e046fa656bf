//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use campus_api::{CampusApi, CampusConfig};
use campus_session::Identity;
use dialoguer::{Input, Password};

use crate::output::Output;

/// Config file names searched for, nearest directory first.
pub const CONFIG_NAMES: [&str; 3] = ["campus.toml", ".campus.toml", "campus.json"];

/// Environment variable holding the default username.
pub const USERNAME_ENV: &str = "CAMPUS_USERNAME";

/// Environment variable holding the password, skipping the prompt.
pub const PASSWORD_ENV: &str = "CAMPUS_PASSWORD";

/// Global flags that shape the context.
pub struct LoadOptions<'a> {
    pub config_path: Option<&'a str>,
    pub base_url: Option<&'a str>,
    pub username: Option<String>,
}

/// Execution context for CLI commands.
pub struct Context {
    /// Resolved configuration.
    pub config: CampusConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    username: Option<String>,
}

impl Context {
    /// Load context from an explicit config file or the nearest one found
    /// walking up from the working directory.
    pub fn load(options: LoadOptions<'_>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match options.config_path {
            Some(path) => Some(PathBuf::from(path)),
            None => find_config(&cwd),
        };
        let mut config = CampusConfig::resolve(config_path.as_deref())?;
        if let Some(url) = options.base_url {
            config.apply_base_url(url);
        }

        let username = options
            .username
            .or_else(|| std::env::var(USERNAME_ENV).ok())
            .filter(|u| !u.trim().is_empty());

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
            username,
        })
    }

    /// An API client with an empty session.
    pub fn api(&self) -> Result<CampusApi> {
        self.output
            .debug(&format!("Using API at {}", self.config.api.base_url));
        Ok(CampusApi::from_config(&self.config)?)
    }

    /// An API client signed in as the configured user.
    pub async fn signed_in(&self) -> Result<(CampusApi, Identity)> {
        let api = self.api()?;
        let username = match &self.username {
            Some(username) => username.clone(),
            None if self.output.is_json() => {
                bail!("No username given; pass --username or set {}", USERNAME_ENV)
            }
            None => Input::<String>::new()
                .with_prompt("Username")
                .interact_text()
                .context("Failed to read username")?,
        };
        let password = match std::env::var(PASSWORD_ENV) {
            Ok(password) => password,
            Err(_) if self.output.is_json() => {
                bail!("No password given; set {}", PASSWORD_ENV)
            }
            Err(_) => Password::new()
                .with_prompt(format!("Password for {}", username))
                .interact()
                .context("Failed to read password")?,
        };

        let spinner = self.output.spinner("Signing in...");
        let result = api.auth().login(&username, &password).await;
        spinner.finish_and_clear();

        let user = match result? {
            Some(user) => user,
            None => api.auth().current_user().await?,
        };
        tracing::debug!(user = %user.username, role = %user.role(), "signed in");
        Ok((api, user))
    }

    /// Where `config init` writes when no `--config` path was given.
    pub fn default_config_path(&self) -> PathBuf {
        self.cwd.join(CONFIG_NAMES[0])
    }
}

/// Find a config file in the directory tree.
fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
