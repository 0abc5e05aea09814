//! Comment texts posted on pull requests

use std::fmt;

/// Direction of a label change, as shown to the commenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAction {
    Add,
    Remove,
}

impl fmt::Display for LabelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelAction::Add => f.write_str("add"),
            LabelAction::Remove => f.write_str("remove"),
        }
    }
}

pub const LGTM_SELF_OWN: &str =
    "***lgtm*** can not be added in your self-own pull request. :astonished:";

pub fn lgtm_added(commenter: &str) -> String {
    format!(
        "***lgtm*** is added in this pull request by: ***{}***. :wave:",
        commenter
    )
}

pub fn approved_added(commenter: &str) -> String {
    format!(
        "***approved*** is added in this pull request by: ***{}***. :wave:",
        commenter
    )
}

pub fn approved_removed(commenter: &str) -> String {
    format!(
        "***approved*** is removed in this pull request by: ***{}***. :flushed:",
        commenter
    )
}

pub fn no_permission(commenter: &str, action: LabelAction, label: &str) -> String {
    format!(
        "***@{}*** has no permission to {} ***{}*** in this pull request. :astonished:\n\
         please contact to the collaborators in this repository.",
        commenter, action, label
    )
}

pub fn not_mergeable(commenter: &str, reasons: &[String]) -> String {
    format!(
        "@{} , this pr is not mergeable and the reasons are below:\n{}",
        commenter,
        reasons.join("\n")
    )
}

pub fn lgtm_cleared(labels: &[String]) -> String {
    format!(
        "New changes are detected. Remove the following labels: ***{}***. :flushed:",
        labels.join(", ")
    )
}
