//! Review engine for pull-request gating
//!
//! Reacts to slash commands in pull request comments and to pull request
//! state changes:
//! - `/lgtm` and `/lgtm cancel` toggle the reviewer's lgtm label
//! - `/approve` and `/approve cancel` toggle the `approved` label
//! - `/check-pr` reports why a pull request can't be merged, or merges it
//!
//! Label changes are only accepted from repository writers and OWNERS
//! listed maintainers or committers; see [`PermissionResolver`].
//!
//! # Example
//!
//! ```rust,no_run
//! use review_engine::{Event, ReviewBot};
//! use std::sync::Arc;
//!
//! # async fn example(payload: &str) -> anyhow::Result<()> {
//! let client = Arc::new(review_client::create_client(&Default::default(), None).await?);
//! let config = review_config::load_config(std::path::Path::new("review-bot.toml"))?;
//!
//! let event: Event = serde_json::from_str(payload)?;
//! ReviewBot::new(client.clone(), client).dispatch(&event, &config).await?;
//! # Ok(())
//! # }
//! ```

pub mod bot;
pub mod command;
pub mod error;
pub mod event;
pub mod gate;
pub mod labels;
pub mod messages;
pub mod owners;
pub mod permission;

#[cfg(test)]
mod fake;

pub use bot::ReviewBot;
pub use command::{parse_commands, Command};
pub use error::{Result, ReviewError};
pub use event::{
    Event, NoteAction, NoteEvent, PullRequestAction, PullRequestEvent, PullRequestInfo,
    PullRequestState,
};
pub use gate::{evaluate_gate, reasons, MergeBlocker};
pub use labels::{
    approved_label_name, is_lgtm_label, lgtm_label_name, GatingLabel, APPROVED_LABEL, LGTM_LABEL,
};
pub use permission::PermissionResolver;
