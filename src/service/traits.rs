use crate::error::GitError;
use crate::model::CommitRef;

/// The version-control gateway the correlation pipeline talks to.
///
/// Every operation is treated as deterministic; callers never retry.
pub trait GitOperations: Clone + Send + Sync + 'static {
    /// Resolve a user-supplied reference to a full commit id
    fn resolve_ref(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<CommitRef, GitError>> + Send;

    /// Commits reachable from `include` but not from `exclude`, merges
    /// and cherry-pick equivalents left out, newest first
    fn symmetric_difference(
        &self,
        exclude: &str,
        include: &str,
    ) -> impl std::future::Future<Output = Result<Vec<CommitRef>, GitError>> + Send;

    /// Header and full diff of one commit, as raw bytes
    fn show_commit(
        &self,
        commit: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, GitError>> + Send;

    /// Raw patch-id output for a patch text
    fn patch_identity(
        &self,
        patch: &[u8],
    ) -> impl std::future::Future<Output = Result<String, GitError>> + Send;
}
