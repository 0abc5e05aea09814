//! Merge gate evaluation
//!
//! Pure decision over the label set, the conflict flag and the repository
//! configuration. Every unmet requirement is reported at once, except for
//! conflicts which hide everything else.

use crate::labels::{lgtm_labels_present, APPROVED_LABEL, LGTM_LABEL};
use review_config::BotConfig;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// A reason why a pull request cannot be merged yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeBlocker {
    /// The pull request conflicts with its target branch
    Conflict,
    /// Fewer lgtm labels than configured
    NotEnoughLgtm { required: u32, actual: usize },
    /// Required labels that are absent, sorted
    MissingLabels(Vec<String>),
    /// Blocking labels that are present, sorted
    ForbiddenLabels(Vec<String>),
}

impl fmt::Display for MergeBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeBlocker::Conflict => write!(f, "PR conflicts with target branch."),
            MergeBlocker::NotEnoughLgtm { required, actual } => {
                write!(f, "PR needs {} lgtm labels and now gets {}", required, actual)
            }
            MergeBlocker::MissingLabels(labels) => {
                write!(f, "PR does not have these labels: {}", labels.join(", "))
            }
            MergeBlocker::ForbiddenLabels(labels) => {
                write!(f, "PR should remove these labels: {}", labels.join(", "))
            }
        }
    }
}

/// Evaluate whether a pull request may be merged
///
/// Returns the blocking reasons in a fixed order; an empty list means the
/// pull request can be merged.
pub fn evaluate_gate(
    mergeable: bool,
    labels: &HashSet<String>,
    config: &BotConfig,
) -> Vec<MergeBlocker> {
    if !mergeable {
        return vec![MergeBlocker::Conflict];
    }

    let mut blockers = Vec::new();

    let mut required: BTreeSet<&str> = config
        .labels_for_merge
        .iter()
        .map(String::as_str)
        .collect();
    required.insert(APPROVED_LABEL);

    let lgtm_required = config.lgtm_counts_required;
    if lgtm_required <= 1 {
        required.insert(LGTM_LABEL);
    } else {
        let actual = lgtm_labels_present(labels).len();
        if actual < lgtm_required as usize {
            blockers.push(MergeBlocker::NotEnoughLgtm {
                required: lgtm_required,
                actual,
            });
        }
    }

    let missing: Vec<String> = required
        .into_iter()
        .filter(|l| !labels.contains(*l))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        blockers.push(MergeBlocker::MissingLabels(missing));
    }

    let forbidden: BTreeSet<&String> = config
        .missing_labels_for_merge
        .iter()
        .filter(|l| labels.contains(*l))
        .collect();
    if !forbidden.is_empty() {
        blockers.push(MergeBlocker::ForbiddenLabels(
            forbidden.into_iter().cloned().collect(),
        ));
    }

    blockers
}

/// Render blockers as reason strings
pub fn reasons(blockers: &[MergeBlocker]) -> Vec<String> {
    blockers.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn config(lgtm_required: u32) -> BotConfig {
        BotConfig {
            repos: vec!["my-org".to_string()],
            lgtm_counts_required: lgtm_required,
            ..Default::default()
        }
    }

    #[test]
    fn test_conflict_hides_everything_else() {
        let mut cfg = config(3);
        cfg.missing_labels_for_merge = vec!["do-not-merge".to_string()];

        for set in [labels(&[]), labels(&["do-not-merge"]), labels(&["approved", "lgtm"])] {
            let blockers = evaluate_gate(false, &set, &cfg);
            assert_eq!(blockers, vec![MergeBlocker::Conflict]);
        }
        assert_eq!(
            reasons(&[MergeBlocker::Conflict]),
            vec!["PR conflicts with target branch.".to_string()]
        );
    }

    #[test]
    fn test_single_lgtm_and_approved_is_mergeable() {
        assert!(evaluate_gate(true, &labels(&["approved", "lgtm"]), &config(1)).is_empty());
    }

    #[test]
    fn test_not_enough_lgtm_labels() {
        let blockers = evaluate_gate(true, &labels(&["approved"]), &config(2));
        assert_eq!(
            blockers,
            vec![MergeBlocker::NotEnoughLgtm {
                required: 2,
                actual: 0
            }]
        );
        assert_eq!(
            blockers[0].to_string(),
            "PR needs 2 lgtm labels and now gets 0"
        );
    }

    #[test]
    fn test_enough_reviewer_lgtm_labels() {
        let set = labels(&["approved", "lgtm-alice", "lgtm-bob"]);
        assert!(evaluate_gate(true, &set, &config(2)).is_empty());
    }

    #[test]
    fn test_shared_lgtm_not_required_with_multiple_reviewers() {
        let blockers = evaluate_gate(true, &labels(&["approved", "lgtm-alice"]), &config(2));
        assert_eq!(
            blockers,
            vec![MergeBlocker::NotEnoughLgtm {
                required: 2,
                actual: 1
            }]
        );
    }

    #[test]
    fn test_missing_labels_are_sorted() {
        let mut cfg = config(1);
        cfg.labels_for_merge = vec!["ci-passed".to_string(), "cla/yes".to_string()];

        let blockers = evaluate_gate(true, &labels(&[]), &cfg);
        assert_eq!(
            blockers,
            vec![MergeBlocker::MissingLabels(vec![
                "approved".to_string(),
                "ci-passed".to_string(),
                "cla/yes".to_string(),
                "lgtm".to_string(),
            ])]
        );
        assert_eq!(
            blockers[0].to_string(),
            "PR does not have these labels: approved, ci-passed, cla/yes, lgtm"
        );
    }

    #[test]
    fn test_forbidden_label_blocks_otherwise_ready_pr() {
        let mut cfg = config(1);
        cfg.missing_labels_for_merge = vec!["do-not-merge".to_string(), "wip".to_string()];

        let blockers = evaluate_gate(true, &labels(&["approved", "lgtm", "do-not-merge"]), &cfg);
        assert_eq!(
            blockers,
            vec![MergeBlocker::ForbiddenLabels(vec!["do-not-merge".to_string()])]
        );
        assert_eq!(
            blockers[0].to_string(),
            "PR should remove these labels: do-not-merge"
        );
    }

    #[test]
    fn test_all_reasons_reported_together() {
        let mut cfg = config(2);
        cfg.labels_for_merge = vec!["ci-passed".to_string()];
        cfg.missing_labels_for_merge = vec!["wip".to_string()];

        let blockers = evaluate_gate(true, &labels(&["lgtm-alice", "wip"]), &cfg);
        assert_eq!(
            reasons(&blockers),
            vec![
                "PR needs 2 lgtm labels and now gets 1".to_string(),
                "PR does not have these labels: approved, ci-passed".to_string(),
                "PR should remove these labels: wip".to_string(),
            ]
        );
    }
}
