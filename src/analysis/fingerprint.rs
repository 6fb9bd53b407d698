use crate::error::GitError;
use crate::service::GitOperations;

/// Content fingerprint of a patch, or an empty string when git derives
/// no patch identity (for instance an empty diff).
pub async fn fingerprint<G: GitOperations>(git: &G, patch: &[u8]) -> Result<String, GitError> {
    let output = git.patch_identity(patch).await?;
    Ok(first_token(&output))
}

/// `git patch-id` prints `<patch-id> <commit-id>`; keep the first token
pub fn first_token(output: &str) -> String {
    output
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}
