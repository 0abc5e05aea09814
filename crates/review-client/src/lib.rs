//! Code-hosting platform client for the review bot
//!
//! This crate provides the trait-based platform client the review engine
//! talks to, plus a GitHub implementation on top of octocrab.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │   PlatformClient trait   │   │   RepoFileCache trait    │
//! │  - permissions, content  │   │  - OWNERS per directory  │
//! │  - labels, comments      │   │                          │
//! │  - merge                 │   │                          │
//! └──────────────────────────┘   └──────────────────────────┘
//!               ▲                              ▲
//!               └──────────────┬───────────────┘
//!                      ┌───────────────┐
//!                      │OctocrabClient │
//!                      └───────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use review_client::{create_client, PlatformClient, TokenResolver};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = create_client(&TokenResolver::new(), None).await?;
//! let permission = client.get_user_permission("owner", "repo", "alice").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod client_manager;
pub mod octocrab_client;
pub mod types;

/// Default GitHub host (public GitHub)
pub const DEFAULT_HOST: &str = "github.com";

/// Platform name used when addressing the file cache
pub const PLATFORM_NAME: &str = "github";

pub use client::{PlatformClient, RepoFileCache};
pub use client_manager::{create_client, TokenResolver, TokenSource, BOT_TOKEN_ENV};
pub use octocrab_client::OctocrabClient;
pub use types::{Branch, ChangedFile, MergeMethod, RepoFile, RepoLabel, RepoPermission};
