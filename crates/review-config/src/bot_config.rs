//! Review bot configuration
//!
//! A `Configuration` holds a list of `BotConfig` items, each scoped to a set
//! of organizations and repositories.

use crate::ConfigError;
use review_client::MergeMethod;
use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from the config file
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// One entry per group of organizations/repositories
    #[serde(default)]
    pub config_items: Vec<BotConfig>,
}

impl Configuration {
    /// Find the configuration applying to `org/repo`
    ///
    /// An item listing `org/repo` exactly wins over one that only lists
    /// `org`; an org-level item is skipped when it excludes the repository.
    pub fn config_for(&self, org: &str, repo: &str) -> Option<&BotConfig> {
        let full_name = format!("{}/{}", org, repo);

        self.config_items
            .iter()
            .find(|item| item.repos.iter().any(|r| *r == full_name))
            .or_else(|| {
                self.config_items.iter().find(|item| {
                    item.repos.iter().any(|r| r == org)
                        && !item.excluded_repos.iter().any(|r| *r == full_name)
                })
            })
    }

    /// Fill in defaults for every item
    pub fn set_default(&mut self) {
        for item in &mut self.config_items {
            item.set_default();
        }
    }

    /// Validate every item
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config_items.iter().try_for_each(BotConfig::validate)
    }
}

/// Configuration of the review bot for a group of repositories
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Organizations (`org`) or repositories (`org/repo`) this item applies to
    #[serde(default)]
    pub repos: Vec<String>,

    /// Repositories (`org/repo`) excluded from an org-level entry in `repos`
    #[serde(default)]
    pub excluded_repos: Vec<String>,

    /// Number of lgtm labels a pull request needs before it can be merged.
    ///
    /// When greater than 1, every reviewer gets an own `lgtm-<login>` label.
    /// Zero is treated as 1.
    #[serde(default)]
    pub lgtm_counts_required: u32,

    /// Repositories (`org/repo`) where OWNERS files in `sigs/<sig>/`
    /// directories also grant permission for changes under that directory
    #[serde(default)]
    pub repos_of_sig: Vec<String>,

    /// Labels a pull request must carry to be merged
    #[serde(default)]
    pub labels_for_merge: Vec<String>,

    /// Labels that block merging while present
    #[serde(default)]
    pub missing_labels_for_merge: Vec<String>,

    /// How pull requests are merged
    #[serde(default)]
    pub merge_method: MergeMethod,
}

impl BotConfig {
    /// Fill in defaults for unset values
    pub fn set_default(&mut self) {
        if self.lgtm_counts_required == 0 {
            self.lgtm_counts_required = 1;
        }
    }

    /// Check that the repository scoping is well formed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repos.is_empty() {
            return Err(ConfigError::EmptyRepos);
        }

        for repo in &self.repos {
            if !is_org_or_full_name(repo) {
                return Err(ConfigError::InvalidRepo(repo.clone()));
            }
        }

        for excluded in &self.excluded_repos {
            let Some((org, _)) = split_full_name(excluded) else {
                return Err(ConfigError::InvalidExcludedRepo(excluded.clone()));
            };

            if !self.repos.iter().any(|r| r == org) {
                return Err(ConfigError::InvalidExcludedRepo(excluded.clone()));
            }
        }

        Ok(())
    }

    /// Whether `org/repo` authorizes via per-SIG OWNERS files
    pub fn is_sig_repo(&self, org: &str, repo: &str) -> bool {
        self.repos_of_sig
            .iter()
            .any(|r| split_full_name(r) == Some((org, repo)))
    }
}

fn split_full_name(name: &str) -> Option<(&str, &str)> {
    let (org, repo) = name.split_once('/')?;
    if org.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((org, repo))
}

fn is_org_or_full_name(name: &str) -> bool {
    if name.contains('/') {
        split_full_name(name).is_some()
    } else {
        !name.is_empty()
    }
}
