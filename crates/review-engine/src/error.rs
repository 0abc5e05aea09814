use thiserror::Error;

/// Errors that abort the handling of an event
///
/// Denied permission and unmet merge requirements are not errors; they are
/// reported to the commenter in a pull request comment.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("No config for this repo: {org}/{repo}")]
    MissingConfig { org: String, repo: String },

    #[error(transparent)]
    Platform(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
