use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    TaskFailed(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Errors raised by the git gateway. All of them abort the run.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("No git repository found at {0}")]
    RepositoryNotFound(PathBuf),

    #[error("Revision '{0}' not found in repository")]
    RevisionNotFound(String),

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("`{0}` timed out")]
    Timeout(String),

    #[error("Git operation cancelled")]
    Cancelled,

    #[error("Failed to run git: {0}")]
    Io(#[from] std::io::Error),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<git2::Error> for GitError {
    fn from(e: git2::Error) -> Self {
        match e.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::Ambiguous | git2::ErrorCode::InvalidSpec => {
                GitError::RevisionNotFound(e.message().to_string())
            }
            _ => GitError::Repository(e.message().to_string()),
        }
    }
}

impl AppError {
    /// Whether the run was aborted rather than failed
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled | AppError::Git(GitError::Cancelled))
    }
}

/// Result type alias for app operations
pub type AppResult<T> = Result<T, AppError>;
