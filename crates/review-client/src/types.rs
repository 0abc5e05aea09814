//! Platform API data transfer objects
//!
//! These types represent the data returned from the platform API.
//! They are intentionally separate from the review engine's domain model
//! to keep this crate pure and reusable.

use serde::{Deserialize, Serialize};

/// Permission level a user holds on a repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoPermission {
    /// Full administrative access
    Admin,
    /// Maintain access (push plus repository management)
    Maintain,
    /// Push access
    Write,
    /// Triage access (labels, issues)
    Triage,
    /// Read-only access
    Read,
    /// No access at all
    #[default]
    None,
}

impl RepoPermission {
    /// Parse the permission string reported by the platform
    ///
    /// Unknown values map to `None` so an unrecognised role never grants access.
    pub fn from_api(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "admin" => RepoPermission::Admin,
            "maintain" => RepoPermission::Maintain,
            "write" | "push" => RepoPermission::Write,
            "triage" => RepoPermission::Triage,
            "read" | "pull" => RepoPermission::Read,
            _ => RepoPermission::None,
        }
    }

    /// Whether this role may mutate gating labels without further checks
    pub fn can_write(&self) -> bool {
        matches!(self, RepoPermission::Admin | RepoPermission::Write)
    }
}

/// A file touched by a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path of the file relative to the repository root
    pub filename: String,
}

/// A label defined at repository scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoLabel {
    /// Label name
    pub name: String,
    /// Hex color without the leading `#` (may be empty)
    #[serde(default)]
    pub color: String,
}

/// Merge method for pull requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMethod {
    /// Create a merge commit
    #[default]
    Merge,
    /// Squash all commits into one
    Squash,
}

impl MergeMethod {
    /// The wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMethod::Merge => "merge",
            MergeMethod::Squash => "squash",
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one branch of one repository on one platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Branch {
    /// Platform name (e.g., "github")
    pub platform: String,
    /// Repository owner
    pub org: String,
    /// Repository name
    pub repo: String,
    /// Branch name
    pub branch: String,
}

/// A file found in a branch by the file cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFile {
    /// Directory containing the file, relative to the repository root
    /// (empty for the root directory)
    pub path: String,
    /// Base64-encoded file content
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_permission_from_api() {
        assert_eq!(RepoPermission::from_api("admin"), RepoPermission::Admin);
        assert_eq!(RepoPermission::from_api("WRITE"), RepoPermission::Write);
        assert_eq!(RepoPermission::from_api("push"), RepoPermission::Write);
        assert_eq!(RepoPermission::from_api("read"), RepoPermission::Read);
        assert_eq!(RepoPermission::from_api("maintain"), RepoPermission::Maintain);
        assert_eq!(RepoPermission::from_api("owner"), RepoPermission::None);
    }

    #[test]
    fn test_only_admin_and_write_can_write() {
        assert!(RepoPermission::Admin.can_write());
        assert!(RepoPermission::Write.can_write());
        assert!(!RepoPermission::Maintain.can_write());
        assert!(!RepoPermission::Triage.can_write());
        assert!(!RepoPermission::Read.can_write());
        assert!(!RepoPermission::None.can_write());
    }

    #[test]
    fn test_merge_method_serde() {
        let methods = vec![(MergeMethod::Merge, "\"merge\""), (MergeMethod::Squash, "\"squash\"")];

        for (method, expected_json) in methods {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, expected_json);

            let deserialized: MergeMethod = serde_json::from_str(&json).unwrap();
            assert_eq!(deserialized, method);
        }

        assert!(serde_json::from_str::<MergeMethod>("\"rebase\"").is_err());
    }

    #[test]
    fn test_merge_method_default() {
        assert_eq!(MergeMethod::default(), MergeMethod::Merge);
        assert_eq!(MergeMethod::Squash.to_string(), "squash");
    }
}
