use std::path::PathBuf;
use std::process::Stdio;

use git2::Repository;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{ServiceConfig, Timeouts};
use crate::error::GitError;
use crate::model::CommitRef;
use crate::service::GitOperations;

/// Gateway backed by the `git` binary, with libgit2 for ref resolution
#[derive(Clone)]
pub struct GitService {
    repo_path: PathBuf,
    cancel_token: CancellationToken,
    timeouts: Timeouts,
}

impl GitService {
    /// Create a new GitService for the current directory
    pub fn new(cancel_token: CancellationToken) -> Self {
        Self::new_with_config(cancel_token, ServiceConfig::default())
    }

    pub fn new_with_config(cancel_token: CancellationToken, config: ServiceConfig) -> Self {
        Self {
            repo_path: config.repo_path,
            cancel_token,
            timeouts: config.timeouts,
        }
    }

    /// Resolve a branch, tag or revision expression to a full commit id
    pub async fn resolve_ref(&self, name: &str) -> Result<CommitRef, GitError> {
        if self.cancel_token.is_cancelled() {
            return Err(GitError::Cancelled);
        }

        let repo_path = self.repo_path.clone();
        let name = name.to_string();

        tokio::task::spawn_blocking(move || -> Result<CommitRef, GitError> {
            let repo = Repository::discover(&repo_path)
                .map_err(|_| GitError::RepositoryNotFound(repo_path.clone()))?;
            let object = repo
                .revparse_single(&name)
                .map_err(|_| GitError::RevisionNotFound(name.clone()))?;
            let commit = object.peel_to_commit()?;
            debug!(reference = %name, commit = %commit.id(), "Resolved reference");
            Ok(commit.id().to_string())
        })
        .await
        .map_err(|e| GitError::Repository(format!("Task failed: {}", e)))?
    }

    /// `git rev-list --cherry-pick --right-only --no-merges exclude..include`
    pub async fn symmetric_difference(
        &self,
        exclude: &str,
        include: &str,
    ) -> Result<Vec<CommitRef>, GitError> {
        let range = format!("{}..{}", exclude, include);
        let output = self
            .run_git(
                &["rev-list", "--cherry-pick", "--right-only", "--no-merges", &range],
                None,
            )
            .await?;

        Ok(parse_rev_list(&output))
    }

    /// `git show` in a fixed format, independent of user log settings
    pub async fn show_commit(&self, commit: &str) -> Result<Vec<u8>, GitError> {
        self.run_git(
            &["show", "--no-color", "--no-ext-diff", "--pretty=medium", "--date=default", commit],
            None,
        )
        .await
    }

    /// Pipe a patch through `git patch-id`
    pub async fn patch_identity(&self, patch: &[u8]) -> Result<String, GitError> {
        let output = self.run_git(&["patch-id"], Some(patch)).await?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    /// Run a git command in the repository and return stdout
    async fn run_git(&self, args: &[&str], stdin: Option<&[u8]>) -> Result<Vec<u8>, GitError> {
        if self.cancel_token.is_cancelled() {
            return Err(GitError::Cancelled);
        }

        let command = format!("git {}", args.join(" "));
        debug!(command = %command, "Running git");

        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&self.repo_path)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let run = async {
            let mut child = cmd.spawn()?;
            if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
                pipe.write_all(input).await?;
                // git waits for EOF before it answers
                drop(pipe);
            }
            Ok::<_, std::io::Error>(child.wait_with_output().await?)
        };

        let output = tokio::select! {
            result = tokio::time::timeout(self.timeouts.git_command, run) => {
                match result {
                    Ok(Ok(output)) => output,
                    Ok(Err(e)) => return Err(GitError::Io(e)),
                    Err(_) => return Err(GitError::Timeout(command)),
                }
            }
            _ = self.cancel_token.cancelled() => {
                return Err(GitError::Cancelled);
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed {
                command,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

impl GitOperations for GitService {
    async fn resolve_ref(&self, name: &str) -> Result<CommitRef, GitError> {
        GitService::resolve_ref(self, name).await
    }

    async fn symmetric_difference(
        &self,
        exclude: &str,
        include: &str,
    ) -> Result<Vec<CommitRef>, GitError> {
        GitService::symmetric_difference(self, exclude, include).await
    }

    async fn show_commit(&self, commit: &str) -> Result<Vec<u8>, GitError> {
        GitService::show_commit(self, commit).await
    }

    async fn patch_identity(&self, patch: &[u8]) -> Result<String, GitError> {
        GitService::patch_identity(self, patch).await
    }
}

/// One commit id per line
fn parse_rev_list(output: &[u8]) -> Vec<CommitRef> {
    String::from_utf8_lossy(output)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
