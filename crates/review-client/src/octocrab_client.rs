//! Octocrab-based platform client
//!
//! Direct implementation of the `PlatformClient` and `RepoFileCache` traits
//! against the GitHub REST API using the octocrab library.

use crate::client::{PlatformClient, RepoFileCache};
use crate::types::{Branch, ChangedFile, MergeMethod, RepoFile, RepoLabel, RepoPermission};
use anyhow::Context;
use async_trait::async_trait;
use log::debug;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PER_PAGE: u8 = 100;

/// Direct GitHub API client using octocrab
///
/// The API endpoint (github.com or an enterprise host) is whatever the
/// octocrab instance was built for.
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
}

impl OctocrabClient {
    /// Create a new client with the given octocrab instance
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }
}

#[derive(Debug, Deserialize)]
struct PermissionResponse {
    permission: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Login {
    login: String,
}

#[derive(Debug, Deserialize)]
struct TeamSlug {
    slug: String,
}

#[derive(Debug, Deserialize)]
struct ReviewRequests {
    #[serde(default)]
    requested_reviewers: Vec<Login>,
    #[serde(default)]
    requested_teams: Vec<TeamSlug>,
}

#[derive(Debug, Serialize)]
struct RemoveReviewRequests<'a> {
    reviewers: &'a [String],
    team_reviewers: &'a [String],
}

/// Contents API route for `path` at `reference`
///
/// Path segments and the ref are percent-encoded; `/` keeps separating
/// path segments.
fn contents_route(org: &str, repo: &str, path: &str, reference: &str) -> String {
    let path = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    format!(
        "/repos/{}/{}/contents/{}?ref={}",
        org,
        repo,
        path,
        urlencoding::encode(reference)
    )
}

/// Whether an octocrab error is a plain 404 from the API
fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

#[async_trait]
impl PlatformClient for OctocrabClient {
    async fn get_user_permission(
        &self,
        org: &str,
        repo: &str,
        login: &str,
    ) -> anyhow::Result<RepoPermission> {
        debug!("Fetching permission of {} on {}/{}", login, org, repo);

        let route = format!("/repos/{}/{}/collaborators/{}/permission", org, repo, login);
        let response: PermissionResponse = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .with_context(|| format!("Failed to get permission of {} on {}/{}", login, org, repo))?;

        Ok(RepoPermission::from_api(&response.permission))
    }

    async fn get_path_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> anyhow::Result<Option<String>> {
        debug!("Fetching {} of {}/{} @ {}", path, org, repo, reference);

        let route = contents_route(org, repo, path, reference);
        match self.octocrab.get::<ContentResponse, _, _>(route, None::<&()>).await {
            Ok(response) => Ok(response.content),
            Err(e) if is_not_found(&e) => {
                debug!("{} not found in {}/{} @ {}", path, org, repo, reference);
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| {
                format!("Failed to get {} of {}/{} @ {}", path, org, repo, reference)
            }),
        }
    }

    async fn get_pull_request_changes(
        &self,
        org: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<ChangedFile>> {
        debug!("Fetching changed files for {}/{}#{}", org, repo, pr_number);

        let mut files = Vec::new();
        let mut page_num = 1u32;

        loop {
            let route = format!(
                "/repos/{}/{}/pulls/{}/files?per_page={}&page={}",
                org, repo, pr_number, PER_PAGE, page_num
            );
            let page: Vec<ChangedFile> = self
                .octocrab
                .get(route, None::<&()>)
                .await
                .with_context(|| {
                    format!("Failed to list changed files of {}/{}#{}", org, repo, pr_number)
                })?;

            let is_last = page.len() < PER_PAGE as usize;
            files.extend(page);

            if is_last {
                break;
            }

            page_num += 1;
        }

        debug!(
            "Fetched {} changed files for {}/{}#{}",
            files.len(),
            org,
            repo,
            pr_number
        );
        Ok(files)
    }

    async fn add_pr_labels(
        &self,
        org: &str,
        repo: &str,
        pr_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        debug!("Adding labels {:?} to {}/{}#{}", labels, org, repo, pr_number);

        self.octocrab
            .issues(org, repo)
            .add_labels(pr_number, labels)
            .await
            .with_context(|| format!("Failed to add labels to {}/{}#{}", org, repo, pr_number))?;

        Ok(())
    }

    async fn remove_pr_labels(
        &self,
        org: &str,
        repo: &str,
        pr_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        debug!(
            "Removing labels {:?} from {}/{}#{}",
            labels, org, repo, pr_number
        );

        let issues = self.octocrab.issues(org, repo);
        for label in labels {
            match issues.remove_label(pr_number, label).await {
                Ok(_) => {}
                Err(e) if is_not_found(&e) => {
                    debug!("Label {} was not on {}/{}#{}", label, org, repo, pr_number);
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!(
                            "Failed to remove label {} from {}/{}#{}",
                            label, org, repo, pr_number
                        )
                    });
                }
            }
        }

        Ok(())
    }

    async fn get_repo_labels(&self, org: &str, repo: &str) -> anyhow::Result<Vec<RepoLabel>> {
        debug!("Fetching labels of {}/{}", org, repo);

        let mut labels = Vec::new();
        let mut page_num = 1u32;

        loop {
            let page = self
                .octocrab
                .issues(org, repo)
                .list_labels_for_repo()
                .per_page(PER_PAGE)
                .page(page_num)
                .send()
                .await
                .with_context(|| format!("Failed to list labels of {}/{}", org, repo))?;

            let page_is_empty = page.items.is_empty();
            let has_next = page.next.is_some();

            labels.extend(page.items.into_iter().map(|l| RepoLabel {
                name: l.name,
                color: l.color,
            }));

            if page_is_empty || !has_next {
                break;
            }

            page_num += 1;
        }

        Ok(labels)
    }

    async fn create_repo_label(
        &self,
        org: &str,
        repo: &str,
        name: &str,
        color: &str,
    ) -> anyhow::Result<()> {
        debug!("Creating label {} on {}/{}", name, org, repo);

        self.octocrab
            .issues(org, repo)
            .create_label(name, color, "")
            .await
            .with_context(|| format!("Failed to create label {} on {}/{}", name, org, repo))?;

        Ok(())
    }

    async fn create_pr_comment(
        &self,
        org: &str,
        repo: &str,
        pr_number: u64,
        body: &str,
    ) -> anyhow::Result<()> {
        debug!("Commenting on {}/{}#{}", org, repo, pr_number);

        self.octocrab
            .issues(org, repo)
            .create_comment(pr_number, body)
            .await
            .with_context(|| format!("Failed to comment on {}/{}#{}", org, repo, pr_number))?;

        Ok(())
    }

    async fn merge_pull_request(
        &self,
        org: &str,
        repo: &str,
        pr_number: u64,
        merge_method: MergeMethod,
    ) -> anyhow::Result<()> {
        debug!(
            "Merging {}/{}#{} with method {}",
            org, repo, pr_number, merge_method
        );

        let method = match merge_method {
            MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
        };

        let merge = self
            .octocrab
            .pulls(org, repo)
            .merge(pr_number)
            .method(method)
            .send()
            .await
            .with_context(|| format!("Failed to merge {}/{}#{}", org, repo, pr_number))?;

        if !merge.merged {
            anyhow::bail!(
                "{}/{}#{} was not merged: {}",
                org,
                repo,
                pr_number,
                merge.message.unwrap_or_default()
            );
        }

        Ok(())
    }

    /// GitHub keeps no reviewer/tester counters; the pending part of an
    /// assignment is the open review request, so those are withdrawn.
    async fn reset_reviewer_tester_count(
        &self,
        org: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<()> {
        let route = format!("/repos/{}/{}/pulls/{}", org, repo, pr_number);
        let requests: ReviewRequests = self
            .octocrab
            .get(&route, None::<&()>)
            .await
            .with_context(|| format!("Failed to fetch {}/{}#{}", org, repo, pr_number))?;

        let reviewers: Vec<String> = requests
            .requested_reviewers
            .into_iter()
            .map(|u| u.login)
            .collect();
        let teams: Vec<String> = requests
            .requested_teams
            .into_iter()
            .map(|t| t.slug)
            .collect();

        if reviewers.is_empty() && teams.is_empty() {
            return Ok(());
        }

        debug!(
            "Withdrawing review requests {:?} {:?} on {}/{}#{}",
            reviewers, teams, org, repo, pr_number
        );

        let body = RemoveReviewRequests {
            reviewers: &reviewers,
            team_reviewers: &teams,
        };
        let _: serde_json::Value = self
            .octocrab
            .delete(format!("{}/requested_reviewers", route), Some(&body))
            .await
            .with_context(|| {
                format!(
                    "Failed to withdraw review requests on {}/{}#{}",
                    org, repo, pr_number
                )
            })?;

        Ok(())
    }
}

#[async_trait]
impl RepoFileCache for OctocrabClient {
    async fn get_files(
        &self,
        branch: &Branch,
        file_name: &str,
        recursive: bool,
    ) -> anyhow::Result<Vec<RepoFile>> {
        debug!(
            "Looking up {} files in {}/{} @ {}",
            file_name, branch.org, branch.repo, branch.branch
        );

        let mut route = format!(
            "/repos/{}/{}/git/trees/{}",
            branch.org, branch.repo, branch.branch
        );
        if recursive {
            route.push_str("?recursive=1");
        }

        let tree: TreeResponse = self.octocrab.get(route, None::<&()>).await.with_context(|| {
            format!(
                "Failed to read tree of {}/{} @ {}",
                branch.org, branch.repo, branch.branch
            )
        })?;

        if tree.truncated {
            log::warn!(
                "Tree of {}/{} @ {} is truncated, some {} files may be missed",
                branch.org,
                branch.repo,
                branch.branch,
                file_name
            );
        }

        let mut files = Vec::new();
        for entry in tree.tree {
            if entry.kind != "blob" {
                continue;
            }

            let Some(dir) = matching_dir(&entry.path, file_name) else {
                continue;
            };

            let blob_route = format!(
                "/repos/{}/{}/git/blobs/{}",
                branch.org, branch.repo, entry.sha
            );
            let blob: BlobResponse = self
                .octocrab
                .get(blob_route, None::<&()>)
                .await
                .with_context(|| format!("Failed to read blob of {}", entry.path))?;

            files.push(RepoFile {
                path: dir.to_string(),
                content: blob.content,
            });
        }

        debug!("Found {} {} files", files.len(), file_name);
        Ok(files)
    }
}

/// Return the directory of `path` if its final segment is `file_name`
fn matching_dir<'a>(path: &'a str, file_name: &str) -> Option<&'a str> {
    match path.rsplit_once('/') {
        Some((dir, name)) if name == file_name => Some(dir),
        None if path == file_name => Some(""),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_route_plain() {
        assert_eq!(
            contents_route("my-org", "my-repo", "OWNERS", "main"),
            "/repos/my-org/my-repo/contents/OWNERS?ref=main"
        );
        assert_eq!(
            contents_route("my-org", "my-repo", "sigs/infra/OWNERS", "release/1.0"),
            "/repos/my-org/my-repo/contents/sigs/infra/OWNERS?ref=release%2F1.0"
        );
    }

    #[test]
    fn test_contents_route_encodes_reserved_characters() {
        assert_eq!(
            contents_route("my-org", "my-repo", "docs/a b#c", "fix#1&x=y?z"),
            "/repos/my-org/my-repo/contents/docs/a%20b%23c?ref=fix%231%26x%3Dy%3Fz"
        );
    }

    #[test]
    fn test_matching_dir() {
        assert_eq!(matching_dir("OWNERS", "OWNERS"), Some(""));
        assert_eq!(matching_dir("sigs/infra/OWNERS", "OWNERS"), Some("sigs/infra"));
        assert_eq!(matching_dir("sigs/infra/README.md", "OWNERS"), None);
        assert_eq!(matching_dir("sigs/infra/NOT_OWNERS", "OWNERS"), None);
        assert_eq!(matching_dir("README.md", "OWNERS"), None);
    }

    #[test]
    fn test_tree_response_deserialize() {
        let json = r#"{
            "sha": "abc",
            "tree": [
                {"path": "sigs", "type": "tree", "sha": "1"},
                {"path": "sigs/infra/OWNERS", "type": "blob", "sha": "2", "size": 12}
            ],
            "truncated": false
        }"#;
        let tree: TreeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(tree.tree.len(), 2);
        assert_eq!(tree.tree[1].kind, "blob");
        assert!(!tree.truncated);
    }

    #[test]
    fn test_review_requests_deserialize_without_teams() {
        let json = r#"{"number": 1, "requested_reviewers": [{"login": "alice"}]}"#;
        let requests: ReviewRequests = serde_json::from_str(json).unwrap();
        assert_eq!(requests.requested_reviewers[0].login, "alice");
        assert!(requests.requested_teams.is_empty());
    }
}
