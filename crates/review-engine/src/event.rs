//! Events delivered by the hosting framework
//!
//! The framework decodes the platform webhook payloads into these types;
//! everything the engine decides on is read from them or fetched fresh
//! from the platform.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// State of a pull request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestState {
    #[default]
    Open,
    Closed,
    Merged,
}

/// Snapshot of a pull request taken from the event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestInfo {
    pub org: String,
    pub repo: String,
    pub number: u64,
    /// Login of the pull request author
    pub author: String,
    /// Branch the pull request targets
    pub base_ref: String,
    #[serde(default)]
    pub state: PullRequestState,
    #[serde(default)]
    pub labels: HashSet<String>,
    /// False while the pull request conflicts with its target branch
    #[serde(default)]
    pub mergeable: bool,
    /// Pending reviewer assignments
    #[serde(default)]
    pub assignees_number: u32,
    /// Pending tester assignments
    #[serde(default)]
    pub testers_number: u32,
}

impl PullRequestInfo {
    pub fn is_open(&self) -> bool {
        self.state == PullRequestState::Open
    }

    /// Whether reviewer or tester assignments are still pending
    pub fn needs_review_or_test(&self) -> bool {
        self.assignees_number > 0 || self.testers_number > 0
    }
}

impl fmt::Display for PullRequestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.org, self.repo, self.number)
    }
}

/// What happened to a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestAction {
    Opened,
    /// New commits were pushed to the source branch (push, force-push, rebase)
    SourceBranchChanged,
    /// Labels were added or removed
    LabelUpdated,
    Closed,
    Merged,
    #[serde(other)]
    Other,
}

/// A pull request state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub action: PullRequestAction,
    pub pull_request: PullRequestInfo,
}

/// What happened to a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteAction {
    Create,
    Edit,
    Delete,
    #[serde(other)]
    Other,
}

/// A comment event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub action: NoteAction,
    /// Login of the comment author
    pub commenter: String,
    /// Comment body
    pub comment: String,
    /// The pull request commented on; `None` for issue or commit comments
    #[serde(default)]
    pub pull_request: Option<PullRequestInfo>,
}

impl NoteEvent {
    /// The pull request, if this is a new comment on an open pull request
    pub fn open_pull_request_comment(&self) -> Option<&PullRequestInfo> {
        if self.action != NoteAction::Create {
            return None;
        }
        self.pull_request.as_ref().filter(|pr| pr.is_open())
    }
}

/// Any event the engine handles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    PullRequest(PullRequestEvent),
    Note(NoteEvent),
}

impl Event {
    /// The pull request the event is about, if any
    pub fn pull_request(&self) -> Option<&PullRequestInfo> {
        match self {
            Event::PullRequest(e) => Some(&e.pull_request),
            Event::Note(e) => e.pull_request.as_ref(),
        }
    }
}
