//! Token resolution and client construction
//!
//! Builds an `OctocrabClient` for a GitHub host (github.com or GitHub
//! Enterprise) with a token resolved from the environment.

use crate::{OctocrabClient, DEFAULT_HOST};
use anyhow::{Context, Result};
use log::{debug, info};
use octocrab::Octocrab;
use std::sync::Arc;

/// Env var with the bot account's token, used for any host
pub const BOT_TOKEN_ENV: &str = "REVIEW_BOT_TOKEN";

/// Where a resolved token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// `GITHUB_TOKEN_<HOST>`
    HostEnv,
    /// `REVIEW_BOT_TOKEN`
    BotEnv,
    /// `gh auth token`
    GhCli,
    /// `GITHUB_TOKEN` or `GH_TOKEN`
    DefaultEnv,
}

/// Resolves the bot's GitHub token for a host
///
/// Tries, in order:
/// 1. Host-specific env var (e.g., `GITHUB_TOKEN_GHE_EXAMPLE_COM`)
/// 2. `REVIEW_BOT_TOKEN`
/// 3. `gh auth token --hostname {host}`, unless disabled
/// 4. Generic `GITHUB_TOKEN` or `GH_TOKEN` (github.com only)
#[derive(Debug, Clone)]
pub struct TokenResolver {
    bot_token: Option<String>,
    default_token: Option<String>,
    use_gh_cli: bool,
}

impl Default for TokenResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenResolver {
    /// Create a resolver from the current environment
    pub fn new() -> Self {
        let bot_token = non_empty_env(BOT_TOKEN_ENV);
        let default_token = non_empty_env("GITHUB_TOKEN").or_else(|| non_empty_env("GH_TOKEN"));

        Self {
            bot_token,
            default_token,
            use_gh_cli: true,
        }
    }

    /// Never shell out to the `gh` CLI
    pub fn without_gh_cli(mut self) -> Self {
        self.use_gh_cli = false;
        self
    }

    /// Get a token for the given host (None = github.com)
    pub async fn get_token(&self, host: Option<&str>) -> Result<String> {
        let (token, source) = self.resolve(host.unwrap_or(DEFAULT_HOST)).await?;
        debug!("Using {:?} token", source);
        Ok(token)
    }

    async fn resolve(&self, host: &str) -> Result<(String, TokenSource)> {
        let env_key = host_env_key(host);
        if let Some(token) = non_empty_env(&env_key) {
            return Ok((token, TokenSource::HostEnv));
        }

        if let Some(ref token) = self.bot_token {
            return Ok((token.clone(), TokenSource::BotEnv));
        }

        if self.use_gh_cli {
            if let Some(token) = gh_auth_token(host).await? {
                return Ok((token, TokenSource::GhCli));
            }
        }

        if host == DEFAULT_HOST {
            if let Some(ref token) = self.default_token {
                return Ok((token.clone(), TokenSource::DefaultEnv));
            }
        }

        Err(anyhow::anyhow!(
            "No token found for host '{}'. Set {} or {}",
            host,
            env_key,
            BOT_TOKEN_ENV
        ))
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Token of the logged-in `gh` user, if the CLI is installed and logged in
async fn gh_auth_token(host: &str) -> Result<Option<String>> {
    debug!("Trying gh auth token for host {}", host);
    let output = tokio::process::Command::new("gh")
        .args(["auth", "token", "--hostname", host])
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            let token = String::from_utf8(output.stdout)
                .context("Invalid UTF-8 in gh auth token output")?
                .trim()
                .to_string();
            Ok(Some(token).filter(|t| !t.is_empty()))
        }
        Ok(_) => {
            debug!("gh auth token returned no token for host {}", host);
            Ok(None)
        }
        Err(e) => {
            debug!("gh CLI not available: {}", e);
            Ok(None)
        }
    }
}

/// Env var holding the token of a specific host
fn host_env_key(host: &str) -> String {
    format!(
        "GITHUB_TOKEN_{}",
        host.replace(['.', '-'], "_").to_uppercase()
    )
}

/// Create a client for the given host (None = github.com)
pub async fn create_client(tokens: &TokenResolver, host: Option<&str>) -> Result<OctocrabClient> {
    let effective_host = host.unwrap_or(DEFAULT_HOST);
    info!("Creating GitHub client for host: {}", effective_host);

    let token = tokens.get_token(host).await?;

    let mut builder = Octocrab::builder().personal_token(token);

    if effective_host != DEFAULT_HOST {
        let uri = format!("https://{}/api/v3", effective_host);
        builder = builder.base_uri(&uri).context("Failed to set base URI")?;
    }

    let octocrab = builder.build().context("Failed to build Octocrab client")?;

    info!("GitHub client created for host: {}", effective_host);
    Ok(OctocrabClient::new(Arc::new(octocrab)))
}
