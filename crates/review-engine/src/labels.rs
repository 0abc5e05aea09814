//! Gating label vocabulary
//!
//! The engine is the only party that gives meaning to these labels; to the
//! platform they are plain strings. Conversion between the typed form and
//! the flat label name happens here and nowhere else.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Name of the shared lgtm label, also the prefix of per-reviewer labels
pub const LGTM_LABEL: &str = "lgtm";

/// Name of the approved label
pub const APPROVED_LABEL: &str = "approved";

/// The platform rejects labels longer than this
pub const LABEL_LEN_LIMIT: usize = 20;

/// A label whose presence gates merging
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GatingLabel {
    /// `approved`
    Approved,
    /// `lgtm`, shared by all reviewers when one lgtm is enough
    LgtmShared,
    /// `lgtm-<login>` of one reviewer; holds the full label name, which is
    /// lowercased and possibly truncated
    LgtmByReviewer(String),
}

impl GatingLabel {
    /// The lgtm label `commenter` applies when `required` lgtm labels are needed
    ///
    /// With `required <= 1` every reviewer shares the bare `lgtm` label.
    /// Otherwise the label is `lgtm-<lowercased login>`, silently cut down
    /// to [`LABEL_LEN_LIMIT`] characters.
    pub fn lgtm_for(commenter: &str, required: u32) -> Self {
        if required <= 1 {
            return GatingLabel::LgtmShared;
        }

        let name: String = format!("{}-{}", LGTM_LABEL, commenter.to_lowercase())
            .chars()
            .take(LABEL_LEN_LIMIT)
            .collect();

        GatingLabel::LgtmByReviewer(name)
    }

    /// Interpret a platform label name
    pub fn parse(name: &str) -> Option<Self> {
        if name == APPROVED_LABEL {
            Some(GatingLabel::Approved)
        } else if name == LGTM_LABEL {
            Some(GatingLabel::LgtmShared)
        } else if is_lgtm_label(name) {
            Some(GatingLabel::LgtmByReviewer(name.to_string()))
        } else {
            None
        }
    }

    /// The label name as stored on the platform
    pub fn name(&self) -> &str {
        match self {
            GatingLabel::Approved => APPROVED_LABEL,
            GatingLabel::LgtmShared => LGTM_LABEL,
            GatingLabel::LgtmByReviewer(name) => name,
        }
    }

    /// Whether this is one of the lgtm labels
    pub fn is_lgtm(&self) -> bool {
        !matches!(self, GatingLabel::Approved)
    }
}

impl fmt::Display for GatingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of the approved label
pub fn approved_label_name() -> &'static str {
    APPROVED_LABEL
}

/// Name of the lgtm label `commenter` applies when `required` lgtm labels are needed
pub fn lgtm_label_name(commenter: &str, required: u32) -> String {
    GatingLabel::lgtm_for(commenter, required).name().to_string()
}

/// Whether `name` counts as an lgtm label
///
/// This is a bare prefix check: `lgtmxyz` matches too. Only well-formed
/// lgtm labels are ever created by the bot.
pub fn is_lgtm_label(name: &str) -> bool {
    name.starts_with(LGTM_LABEL)
}

/// All lgtm labels in `labels`, sorted
pub fn lgtm_labels_present(labels: &HashSet<String>) -> BTreeSet<String> {
    labels
        .iter()
        .filter_map(|l| GatingLabel::parse(l))
        .filter(GatingLabel::is_lgtm)
        .map(|l| l.name().to_string())
        .collect()
}
