//! Platform client traits
//!
//! This module defines the `PlatformClient` trait that every client
//! implementation must satisfy, and the `RepoFileCache` trait used to
//! look up OWNERS files across a whole branch in one request.

use crate::types::{Branch, ChangedFile, MergeMethod, RepoFile, RepoLabel, RepoPermission};
use async_trait::async_trait;

/// Code-hosting platform client trait
///
/// Defines the calls the review bot makes against the remote platform.
/// Every call is a single request/response round trip without retries;
/// a failure is reported to the caller as-is.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across
/// async tasks and threads.
///
/// # Example
///
/// ```rust,ignore
/// use review_client::PlatformClient;
///
/// async fn greet(client: &dyn PlatformClient) -> anyhow::Result<()> {
///     client.create_pr_comment("my-org", "my-repo", 7, "hello").await
/// }
/// ```
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Fetch the permission level `login` holds on the repository
    async fn get_user_permission(
        &self,
        org: &str,
        repo: &str,
        login: &str,
    ) -> anyhow::Result<RepoPermission>;

    /// Fetch the content of a file at a given ref
    ///
    /// # Returns
    ///
    /// The base64-encoded content, or `None` if the file does not exist.
    async fn get_path_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> anyhow::Result<Option<String>>;

    /// List the files changed by a pull request
    async fn get_pull_request_changes(
        &self,
        org: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<ChangedFile>>;

    // === Label Operations ===

    /// Add labels to a pull request
    ///
    /// Adding a label that is already present is not an error.
    async fn add_pr_labels(
        &self,
        org: &str,
        repo: &str,
        pr_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()>;

    /// Remove labels from a pull request
    ///
    /// Removing a label that is not present is not an error.
    async fn remove_pr_labels(
        &self,
        org: &str,
        repo: &str,
        pr_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()>;

    /// List the labels defined on the repository
    async fn get_repo_labels(&self, org: &str, repo: &str) -> anyhow::Result<Vec<RepoLabel>>;

    /// Create a label at repository scope
    async fn create_repo_label(
        &self,
        org: &str,
        repo: &str,
        name: &str,
        color: &str,
    ) -> anyhow::Result<()>;

    // === PR Operations ===

    /// Post a comment on a pull request
    async fn create_pr_comment(
        &self,
        org: &str,
        repo: &str,
        pr_number: u64,
        body: &str,
    ) -> anyhow::Result<()>;

    /// Merge a pull request with the given method
    async fn merge_pull_request(
        &self,
        org: &str,
        repo: &str,
        pr_number: u64,
        merge_method: MergeMethod,
    ) -> anyhow::Result<()>;

    /// Reset the pending reviewer and tester assignments of a pull request
    async fn reset_reviewer_tester_count(
        &self,
        org: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<()>;
}

/// Branch-wide file lookup
///
/// Returns every file with a given name in a branch, one entry per
/// directory, so that per-directory OWNERS files can be checked in one go.
#[async_trait]
pub trait RepoFileCache: Send + Sync {
    /// Fetch every file named `file_name` in the branch
    ///
    /// # Arguments
    ///
    /// * `branch` - Platform, repository and branch to search
    /// * `file_name` - Exact file name to match (e.g., "OWNERS")
    /// * `recursive` - Search the whole tree instead of only the root directory
    async fn get_files(
        &self,
        branch: &Branch,
        file_name: &str,
        recursive: bool,
    ) -> anyhow::Result<Vec<RepoFile>>;
}
