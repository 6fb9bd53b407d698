//! Application core
//!
//! Runs the pipeline as explicit stages with a barrier between each:
//! resolve both tips, list both one-sided ranges, analyze the branch set,
//! analyze the upstream set, correlate, build the report.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::analysis::{collect_commit_set, correlate};
use crate::config::ServiceConfig;
use crate::error::AppResult;
use crate::report::Report;
use crate::service::{GitOperations, GitService};

/// Main application struct
pub struct App<G: GitOperations = GitService> {
    /// Version-control gateway
    git: G,
    /// Worker pool size and timeouts
    config: ServiceConfig,
    /// Cancellation token shared with the gateway
    cancel_token: CancellationToken,
}

impl App<GitService> {
    /// Create an application backed by the `git` binary
    pub fn new(config: ServiceConfig, cancel_token: CancellationToken) -> Self {
        let git = GitService::new_with_config(cancel_token.clone(), config.clone());
        Self::with_gateway(git, config, cancel_token)
    }
}

impl<G: GitOperations> App<G> {
    /// Create an application over any gateway
    pub fn with_gateway(git: G, config: ServiceConfig, cancel_token: CancellationToken) -> Self {
        Self {
            git,
            config,
            cancel_token,
        }
    }

    /// Build the rebase report for `branch` against `upstream`
    pub async fn run(&self, branch: &str, upstream: &str) -> AppResult<Report> {
        let branch_tip = self.git.resolve_ref(branch).await?;
        let upstream_tip = self.git.resolve_ref(upstream).await?;
        info!(branch = %branch_tip, upstream = %upstream_tip, "Resolved references");

        let branch_refs = self
            .git
            .symmetric_difference(&upstream_tip, &branch_tip)
            .await?;
        let upstream_refs = self
            .git
            .symmetric_difference(&branch_tip, &upstream_tip)
            .await?;

        let concurrency = self.config.git_concurrency;
        let mut branch_set =
            collect_commit_set(&self.git, branch_refs, concurrency, &self.cancel_token, "branch")
                .await?;
        let upstream_set = collect_commit_set(
            &self.git,
            upstream_refs,
            concurrency,
            &self.cancel_token,
            "upstream",
        )
        .await?;

        let correlation = correlate(&mut branch_set, &upstream_set);
        Ok(Report::build(&branch_set, &correlation))
    }

    /// Request that an in-flight run stop
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }
}
