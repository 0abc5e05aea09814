//! Permission resolution for gating label changes
//!
//! A commenter may add or remove a gating label if, checked in this order:
//! 1. they have admin or write access to the repository,
//! 2. they are listed in the root OWNERS file of the base branch,
//! 3. the repository is SIG-governed, every changed file lives under
//!    `sigs/<sig>/`, and the OWNERS file of every touched directory lists them.

use crate::event::PullRequestInfo;
use crate::owners::{decode_owners, OWNERS_FILE};
use log::debug;
use regex::Regex;
use review_client::{Branch, ChangedFile, PlatformClient, RepoFileCache, PLATFORM_NAME};
use review_config::BotConfig;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Decides who may mutate gating labels on a pull request
pub struct PermissionResolver<'a> {
    client: &'a dyn PlatformClient,
    files: &'a dyn RepoFileCache,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(client: &'a dyn PlatformClient, files: &'a dyn RepoFileCache) -> Self {
        Self { client, files }
    }

    /// Whether `actor` may add or remove gating labels on `pr`
    ///
    /// Lookup failures are returned as errors; they must not be read as
    /// either an allow or a deny.
    pub async fn authorize(
        &self,
        actor: &str,
        pr: &PullRequestInfo,
        config: &BotConfig,
    ) -> anyhow::Result<bool> {
        let permission = self
            .client
            .get_user_permission(&pr.org, &pr.repo, actor)
            .await?;
        if permission.can_write() {
            debug!("{} has {:?} access to {}", actor, permission, pr);
            return Ok(true);
        }

        if self.in_repo_owners_file(actor, pr).await? {
            debug!("{} is listed in the root OWNERS file of {}", actor, pr);
            return Ok(true);
        }

        if !config.is_sig_repo(&pr.org, &pr.repo) {
            return Ok(false);
        }

        self.in_sig_dir_owners_files(actor, pr).await
    }

    async fn in_repo_owners_file(&self, actor: &str, pr: &PullRequestInfo) -> anyhow::Result<bool> {
        let content = self
            .client
            .get_path_content(&pr.org, &pr.repo, OWNERS_FILE, &pr.base_ref)
            .await?;

        Ok(match content {
            Some(content) if !content.is_empty() => decode_owners(&content).contains(actor),
            _ => false,
        })
    }

    async fn in_sig_dir_owners_files(
        &self,
        actor: &str,
        pr: &PullRequestInfo,
    ) -> anyhow::Result<bool> {
        let changes = self
            .client
            .get_pull_request_changes(&pr.org, &pr.repo, pr.number)
            .await?;

        let Some(mut pending) = sig_directories(&changes) else {
            debug!("{} changes files outside of SIG directories", pr);
            return Ok(false);
        };
        if pending.is_empty() {
            return Ok(false);
        }

        let branch = Branch {
            platform: PLATFORM_NAME.to_string(),
            org: pr.org.clone(),
            repo: pr.repo.clone(),
            branch: pr.base_ref.clone(),
        };
        let files = self.files.get_files(&branch, OWNERS_FILE, true).await?;

        for file in files {
            if !pending.contains(&file.path) {
                continue;
            }

            if !decode_owners(&file.content).contains(actor) {
                debug!("{} is not an owner of {}", actor, file.path);
                return Ok(false);
            }

            pending.remove(&file.path);
            if pending.is_empty() {
                break;
            }
        }

        if !pending.is_empty() {
            debug!("No OWNERS file in {:?}", pending);
        }
        Ok(pending.is_empty())
    }
}

/// Parent directories of the changed files
///
/// Returns `None` if any file lies outside `sigs/<sig>/`.
fn sig_directories(changes: &[ChangedFile]) -> Option<BTreeSet<String>> {
    static SIG_FILE_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = SIG_FILE_REGEX.get_or_init(|| Regex::new(r"^sigs/[a-zA-Z0-9_-]+/.+").unwrap());

    changes
        .iter()
        .map(|file| {
            if !re.is_match(&file.filename) {
                return None;
            }
            file.filename
                .rsplit_once('/')
                .map(|(dir, _)| dir.to_string())
        })
        .collect()
}
