use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Timeouts {
    pub git_command: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            git_command: Duration::from_secs(120),
        }
    }
}

impl Timeouts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_git_command(mut self, timeout: Duration) -> Self {
        self.git_command = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub timeouts: Timeouts,
    /// Upper bound on concurrent per-commit tasks
    pub git_concurrency: usize,
    /// Directory git commands run in
    pub repo_path: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timeouts: Timeouts::default(),
            git_concurrency: default_concurrency(),
            repo_path: PathBuf::from("."),
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_git_concurrency(mut self, concurrency: usize) -> Self {
        self.git_concurrency = concurrency.max(1);
        self
    }

    pub fn with_repo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.repo_path = path.into();
        self
    }
}

/// One worker per hardware thread
fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
