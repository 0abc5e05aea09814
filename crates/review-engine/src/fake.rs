//! Recording in-memory platform for tests

use async_trait::async_trait;
use review_client::{
    Branch, ChangedFile, MergeMethod, PlatformClient, RepoFile, RepoFileCache, RepoLabel,
    RepoPermission,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

/// A mutation issued against the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AddLabels(Vec<String>),
    RemoveLabels(Vec<String>),
    CreateRepoLabel(String),
    Comment(String),
    ResetReviewerTesterCount,
    Merge(MergeMethod),
}

#[derive(Default)]
pub struct FakePlatform {
    permissions: HashMap<String, RepoPermission>,
    root_owners: Option<String>,
    changes: Vec<ChangedFile>,
    dir_owners: Vec<RepoFile>,
    repo_labels: Mutex<Vec<RepoLabel>>,
    pr_labels: Mutex<BTreeSet<String>>,

    fail_permission: bool,
    fail_content: bool,
    fail_changes: bool,
    fail_label_creation: bool,
    fail_comment: bool,

    calls: Mutex<Vec<Call>>,
    path_requests: Mutex<Vec<String>>,
    changes_requests: Mutex<usize>,
    cache_requests: Mutex<usize>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_permission(mut self, login: &str, permission: RepoPermission) -> Self {
        self.permissions.insert(login.to_string(), permission);
        self
    }

    pub fn with_root_owners(mut self, content: String) -> Self {
        self.root_owners = Some(content);
        self
    }

    pub fn with_changes(mut self, paths: &[&str]) -> Self {
        self.changes = paths
            .iter()
            .map(|p| ChangedFile {
                filename: p.to_string(),
            })
            .collect();
        self
    }

    pub fn with_dir_owners(mut self, dir: &str, content: String) -> Self {
        self.dir_owners.push(RepoFile {
            path: dir.to_string(),
            content,
        });
        self
    }

    pub fn with_repo_labels(self, names: &[&str]) -> Self {
        *self.repo_labels.lock().unwrap() = names
            .iter()
            .map(|n| RepoLabel {
                name: n.to_string(),
                color: String::new(),
            })
            .collect();
        self
    }

    pub fn with_pr_labels(self, names: &[&str]) -> Self {
        *self.pr_labels.lock().unwrap() = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn failing_permission_lookup(mut self) -> Self {
        self.fail_permission = true;
        self
    }

    pub fn failing_content_fetch(mut self) -> Self {
        self.fail_content = true;
        self
    }

    pub fn failing_changes_listing(mut self) -> Self {
        self.fail_changes = true;
        self
    }

    pub fn failing_label_creation(mut self) -> Self {
        self.fail_label_creation = true;
        self
    }

    pub fn failing_comments(mut self) -> Self {
        self.fail_comment = true;
        self
    }

    /// Mutations in the order they were issued
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn comments(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Comment(body) => Some(body),
                _ => None,
            })
            .collect()
    }

    /// Mutations other than comments
    pub fn label_and_merge_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Comment(_)))
            .collect()
    }

    /// Current labels of the pull request
    pub fn pr_labels(&self) -> BTreeSet<String> {
        self.pr_labels.lock().unwrap().clone()
    }

    /// `path@ref` of every content request
    pub fn path_content_requests(&self) -> Vec<String> {
        self.path_requests.lock().unwrap().clone()
    }

    pub fn changed_file_requests(&self) -> usize {
        *self.changes_requests.lock().unwrap()
    }

    pub fn file_cache_requests(&self) -> usize {
        *self.cache_requests.lock().unwrap()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlatformClient for FakePlatform {
    async fn get_user_permission(
        &self,
        _org: &str,
        _repo: &str,
        login: &str,
    ) -> anyhow::Result<RepoPermission> {
        if self.fail_permission {
            anyhow::bail!("permission lookup failed");
        }
        Ok(self.permissions.get(login).copied().unwrap_or_default())
    }

    async fn get_path_content(
        &self,
        _org: &str,
        _repo: &str,
        path: &str,
        reference: &str,
    ) -> anyhow::Result<Option<String>> {
        self.path_requests
            .lock()
            .unwrap()
            .push(format!("{}@{}", path, reference));
        if self.fail_content {
            anyhow::bail!("content fetch failed");
        }
        Ok(self.root_owners.clone())
    }

    async fn get_pull_request_changes(
        &self,
        _org: &str,
        _repo: &str,
        _pr_number: u64,
    ) -> anyhow::Result<Vec<ChangedFile>> {
        *self.changes_requests.lock().unwrap() += 1;
        if self.fail_changes {
            anyhow::bail!("changed files listing failed");
        }
        Ok(self.changes.clone())
    }

    async fn add_pr_labels(
        &self,
        _org: &str,
        _repo: &str,
        _pr_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        self.record(Call::AddLabels(labels.to_vec()));
        self.pr_labels.lock().unwrap().extend(labels.iter().cloned());
        Ok(())
    }

    async fn remove_pr_labels(
        &self,
        _org: &str,
        _repo: &str,
        _pr_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        self.record(Call::RemoveLabels(labels.to_vec()));
        let mut current = self.pr_labels.lock().unwrap();
        for label in labels {
            current.remove(label);
        }
        Ok(())
    }

    async fn get_repo_labels(&self, _org: &str, _repo: &str) -> anyhow::Result<Vec<RepoLabel>> {
        Ok(self.repo_labels.lock().unwrap().clone())
    }

    async fn create_repo_label(
        &self,
        _org: &str,
        _repo: &str,
        name: &str,
        color: &str,
    ) -> anyhow::Result<()> {
        self.record(Call::CreateRepoLabel(name.to_string()));
        if self.fail_label_creation {
            anyhow::bail!("label creation failed");
        }
        self.repo_labels.lock().unwrap().push(RepoLabel {
            name: name.to_string(),
            color: color.to_string(),
        });
        Ok(())
    }

    async fn create_pr_comment(
        &self,
        _org: &str,
        _repo: &str,
        _pr_number: u64,
        body: &str,
    ) -> anyhow::Result<()> {
        self.record(Call::Comment(body.to_string()));
        if self.fail_comment {
            anyhow::bail!("comment failed");
        }
        Ok(())
    }

    async fn merge_pull_request(
        &self,
        _org: &str,
        _repo: &str,
        _pr_number: u64,
        merge_method: MergeMethod,
    ) -> anyhow::Result<()> {
        self.record(Call::Merge(merge_method));
        Ok(())
    }

    async fn reset_reviewer_tester_count(
        &self,
        _org: &str,
        _repo: &str,
        _pr_number: u64,
    ) -> anyhow::Result<()> {
        self.record(Call::ResetReviewerTesterCount);
        Ok(())
    }
}

#[async_trait]
impl RepoFileCache for FakePlatform {
    async fn get_files(
        &self,
        _branch: &Branch,
        _file_name: &str,
        _recursive: bool,
    ) -> anyhow::Result<Vec<RepoFile>> {
        *self.cache_requests.lock().unwrap() += 1;
        Ok(self.dir_owners.clone())
    }
}
