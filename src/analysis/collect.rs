//! Bounded fan-out over one commit set.
//!
//! Each worker fetches a commit's patch, fingerprints it and extracts its
//! metadata. Results are gathered as workers finish; the first failure
//! aborts the rest of the pool.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::analysis::{fingerprint, metadata};
use crate::error::{AppError, AppResult, GitError};
use crate::model::{CommitInfo, CommitRef, CommitSet, RevertRef};
use crate::service::GitOperations;

/// Fetch and analyze one commit
pub async fn analyze_commit<G: GitOperations>(git: &G, commit: &str) -> Result<CommitInfo, GitError> {
    let patch = git.show_commit(commit).await?;
    let fingerprint = fingerprint::fingerprint(git, &patch).await?;
    let meta = metadata::extract(&patch);

    Ok(CommitInfo {
        author: meta.author,
        date: meta.date,
        subject: meta.subject,
        fingerprint,
        reverts: meta.reverts.map(RevertRef::Unresolved).unwrap_or_default(),
    })
}

/// Analyze every ref with at most `concurrency` workers in flight.
///
/// `label` only names the set in log output.
pub async fn collect_commit_set<G: GitOperations>(
    git: &G,
    refs: Vec<CommitRef>,
    concurrency: usize,
    cancel_token: &CancellationToken,
    label: &str,
) -> AppResult<CommitSet> {
    let total = refs.len();
    info!(set = label, commits = total, "Start calculating {}({})", label, total);

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for commit in refs.iter().cloned() {
        let git = git.clone();
        let semaphore = semaphore.clone();
        let cancel = cancel_token.clone();

        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| GitError::Cancelled)?;
            if cancel.is_cancelled() {
                return Err(GitError::Cancelled);
            }
            let info = analyze_commit(&git, &commit).await?;
            Ok::<_, GitError>((commit, info))
        });
    }

    let step = (total / 100).max(1);
    let mut completed = 0usize;
    let mut infos: HashMap<CommitRef, CommitInfo> = HashMap::with_capacity(total);

    // Returning early drops the JoinSet, which aborts the remaining workers
    while let Some(joined) = tasks.join_next().await {
        let (commit, info) = match joined {
            Ok(Ok(done)) => done,
            Ok(Err(GitError::Cancelled)) => return Err(AppError::Cancelled),
            Ok(Err(e)) => return Err(e.into()),
            Err(e) => return Err(AppError::TaskFailed(e.to_string())),
        };

        debug!(set = label, commit = %commit, fingerprint = %info.fingerprint, "Analyzed commit");
        let previous = infos.insert(commit, info);
        debug_assert!(previous.is_none(), "commit analyzed twice");

        completed += 1;
        if completed % step == 0 || completed == total {
            info!(set = label, "Ready: {} %", completed * 100 / total);
        }
    }

    Ok(CommitSet::new(refs, infos))
}
