//! Review bot event handling
//!
//! Turns pull request and comment events into label changes, comments and
//! merges. Every decision is made on the snapshot carried by the event plus
//! fresh lookups against the platform; nothing is kept between events.

use crate::command::{parse_commands, Command};
use crate::error::{Result, ReviewError};
use crate::event::{Event, NoteEvent, PullRequestAction, PullRequestEvent, PullRequestInfo};
use crate::gate::{evaluate_gate, reasons};
use crate::labels::{lgtm_labels_present, GatingLabel, APPROVED_LABEL, LGTM_LABEL};
use crate::messages::{self, LabelAction};
use crate::permission::PermissionResolver;
use log::{debug, error, info};
use review_client::{PlatformClient, RepoFileCache};
use review_config::{BotConfig, Configuration};
use std::sync::Arc;

/// The review bot
///
/// Holds only the platform collaborators; it can be shared freely between
/// concurrently handled events.
#[derive(Clone)]
pub struct ReviewBot {
    client: Arc<dyn PlatformClient>,
    files: Arc<dyn RepoFileCache>,
}

impl ReviewBot {
    pub fn new(client: Arc<dyn PlatformClient>, files: Arc<dyn RepoFileCache>) -> Self {
        Self { client, files }
    }

    fn resolver(&self) -> PermissionResolver<'_> {
        PermissionResolver::new(self.client.as_ref(), self.files.as_ref())
    }

    /// Handle any event, resolving the repository's configuration first
    ///
    /// Events the handlers would ignore are dropped before the lookup, so an
    /// unconfigured repository only fails for events that need a config.
    pub async fn dispatch(&self, event: &Event, config: &Configuration) -> Result<()> {
        let pr = match event {
            Event::PullRequest(e) if Self::handles_action(e.action) => &e.pull_request,
            Event::Note(e) => match e.open_pull_request_comment() {
                Some(pr) => pr,
                None => return Ok(()),
            },
            Event::PullRequest(e) => {
                debug!("Ignoring {:?} on {}", e.action, e.pull_request);
                return Ok(());
            }
        };

        let bot_config = config.config_for(&pr.org, &pr.repo).ok_or_else(|| {
            ReviewError::MissingConfig {
                org: pr.org.clone(),
                repo: pr.repo.clone(),
            }
        })?;

        match event {
            Event::PullRequest(e) => self.handle_pull_request_event(e, bot_config).await,
            Event::Note(e) => self.handle_note_event(e, bot_config).await,
        }
    }

    /// Handle a pull request state change
    ///
    /// New commits drop every lgtm label; a label change may complete the
    /// merge requirements and triggers a silent merge attempt.
    pub async fn handle_pull_request_event(
        &self,
        event: &PullRequestEvent,
        config: &BotConfig,
    ) -> Result<()> {
        match event.action {
            PullRequestAction::SourceBranchChanged => self.clear_lgtm(&event.pull_request).await,
            PullRequestAction::LabelUpdated => self.try_merge(&event.pull_request, config).await,
            _ => Ok(()),
        }
    }

    fn handles_action(action: PullRequestAction) -> bool {
        matches!(
            action,
            PullRequestAction::SourceBranchChanged | PullRequestAction::LabelUpdated
        )
    }

    /// Handle a comment, running the review commands it contains
    pub async fn handle_note_event(&self, event: &NoteEvent, config: &BotConfig) -> Result<()> {
        let Some(pr) = event.open_pull_request_comment() else {
            return Ok(());
        };

        for command in parse_commands(&event.comment) {
            info!("Running {:?} for {} on {}", command, event.commenter, pr);

            let commenter = event.commenter.as_str();
            match command {
                Command::AddLgtm => self.add_lgtm(pr, commenter, config).await?,
                Command::RemoveLgtm => self.remove_lgtm(pr, commenter, config).await?,
                Command::AddApprove => self.add_approve(pr, commenter, config).await?,
                Command::RemoveApprove => self.remove_approve(pr, commenter, config).await?,
                Command::CheckPr => self.check_pr(pr, commenter, config).await?,
            }
        }

        Ok(())
    }

    async fn add_lgtm(
        &self,
        pr: &PullRequestInfo,
        commenter: &str,
        config: &BotConfig,
    ) -> Result<()> {
        if pr.author == commenter {
            return self.comment(pr, messages::LGTM_SELF_OWN).await;
        }

        if !self.resolver().authorize(commenter, pr, config).await? {
            let body = messages::no_permission(commenter, LabelAction::Add, LGTM_LABEL);
            return self.comment(pr, &body).await;
        }

        let label = GatingLabel::lgtm_for(commenter, config.lgtm_counts_required);
        if label != GatingLabel::LgtmShared {
            if let Err(e) = self.ensure_repo_label(pr, label.name()).await {
                error!("Failed to prepare label {} on {}: {:#}", label, pr, e);
            }
        }

        self.add_label(pr, &label).await?;
        self.comment_best_effort(pr, &messages::lgtm_added(commenter)).await;

        Ok(())
    }

    async fn remove_lgtm(
        &self,
        pr: &PullRequestInfo,
        commenter: &str,
        config: &BotConfig,
    ) -> Result<()> {
        // The author may clear every reviewer's lgtm on their own pull request.
        if pr.author == commenter {
            let labels: Vec<String> = lgtm_labels_present(&pr.labels).into_iter().collect();
            if labels.is_empty() {
                return Ok(());
            }
            return self.remove_labels(pr, &labels).await;
        }

        if !self.resolver().authorize(commenter, pr, config).await? {
            let body = messages::no_permission(commenter, LabelAction::Remove, LGTM_LABEL);
            return self.comment(pr, &body).await;
        }

        let label = GatingLabel::lgtm_for(commenter, config.lgtm_counts_required);
        if !pr.labels.contains(label.name()) {
            debug!("{} is not on {}", label, pr);
            return Ok(());
        }

        self.remove_labels(pr, &[label.name().to_string()]).await
    }

    async fn add_approve(
        &self,
        pr: &PullRequestInfo,
        commenter: &str,
        config: &BotConfig,
    ) -> Result<()> {
        if !self.resolver().authorize(commenter, pr, config).await? {
            let body = messages::no_permission(commenter, LabelAction::Add, APPROVED_LABEL);
            return self.comment(pr, &body).await;
        }

        self.add_label(pr, &GatingLabel::Approved).await?;
        self.comment_best_effort(pr, &messages::approved_added(commenter)).await;

        Ok(())
    }

    async fn remove_approve(
        &self,
        pr: &PullRequestInfo,
        commenter: &str,
        config: &BotConfig,
    ) -> Result<()> {
        if !self.resolver().authorize(commenter, pr, config).await? {
            let body = messages::no_permission(commenter, LabelAction::Remove, APPROVED_LABEL);
            return self.comment(pr, &body).await;
        }

        let label = GatingLabel::Approved;
        if !pr.labels.contains(label.name()) {
            debug!("{} is not on {}", label, pr);
            return Ok(());
        }

        self.remove_labels(pr, &[label.name().to_string()]).await?;
        self.comment_best_effort(pr, &messages::approved_removed(commenter)).await;

        Ok(())
    }

    async fn check_pr(
        &self,
        pr: &PullRequestInfo,
        commenter: &str,
        config: &BotConfig,
    ) -> Result<()> {
        let blockers = evaluate_gate(pr.mergeable, &pr.labels, config);
        if !blockers.is_empty() {
            let details = reasons(&blockers);
            info!("{} can not be merged: {}", pr, details.join("; "));
            return self
                .comment(pr, &messages::not_mergeable(commenter, &details))
                .await;
        }

        self.merge(pr, config).await
    }

    async fn try_merge(&self, pr: &PullRequestInfo, config: &BotConfig) -> Result<()> {
        let blockers = evaluate_gate(pr.mergeable, &pr.labels, config);
        if !blockers.is_empty() {
            info!(
                "{} can not be merged yet: {}",
                pr,
                reasons(&blockers).join("; ")
            );
            return Ok(());
        }

        self.merge(pr, config).await
    }

    async fn merge(&self, pr: &PullRequestInfo, config: &BotConfig) -> Result<()> {
        if pr.needs_review_or_test() {
            self.client
                .reset_reviewer_tester_count(&pr.org, &pr.repo, pr.number)
                .await?;
        }

        info!("Merging {} with method {}", pr, config.merge_method);
        self.client
            .merge_pull_request(&pr.org, &pr.repo, pr.number, config.merge_method)
            .await?;

        Ok(())
    }

    /// Drop every lgtm label after new commits; approvals don't carry over
    async fn clear_lgtm(&self, pr: &PullRequestInfo) -> Result<()> {
        let labels: Vec<String> = lgtm_labels_present(&pr.labels).into_iter().collect();
        if labels.is_empty() {
            return Ok(());
        }

        self.remove_labels(pr, &labels).await?;
        self.comment_best_effort(pr, &messages::lgtm_cleared(&labels)).await;

        Ok(())
    }

    /// Create a per-reviewer label at repository scope if it is missing
    async fn ensure_repo_label(&self, pr: &PullRequestInfo, name: &str) -> anyhow::Result<()> {
        let labels = self.client.get_repo_labels(&pr.org, &pr.repo).await?;
        if labels.iter().any(|l| l.name == name) {
            return Ok(());
        }

        self.client
            .create_repo_label(&pr.org, &pr.repo, name, "")
            .await
    }

    async fn add_label(&self, pr: &PullRequestInfo, label: &GatingLabel) -> Result<()> {
        self.client
            .add_pr_labels(&pr.org, &pr.repo, pr.number, &[label.name().to_string()])
            .await?;
        Ok(())
    }

    async fn remove_labels(&self, pr: &PullRequestInfo, labels: &[String]) -> Result<()> {
        self.client
            .remove_pr_labels(&pr.org, &pr.repo, pr.number, labels)
            .await?;
        Ok(())
    }

    async fn comment(&self, pr: &PullRequestInfo, body: &str) -> Result<()> {
        self.client
            .create_pr_comment(&pr.org, &pr.repo, pr.number, body)
            .await?;
        Ok(())
    }

    async fn comment_best_effort(&self, pr: &PullRequestInfo, body: &str) {
        if let Err(e) = self.comment(pr, body).await {
            error!("Failed to comment on {}: {}", pr, e);
        }
    }
}
