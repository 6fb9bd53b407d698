//! Integration tests for rebase-list
//!
//! Most tests drive the full pipeline through an in-memory gateway. The
//! last one builds a throwaway repository and runs against real git; it is
//! skipped when git is not installed.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use rebase_list::{
    Annotation, App, AppError, CommitRef, GitError, GitOperations, Report, ServiceConfig,
};
use tokio_util::sync::CancellationToken;

const BRANCH: &str = "topic";
const UPSTREAM: &str = "main";
const BRANCH_TIP: &str = "b0000000000000000000000000000000000000tip";
const UPSTREAM_TIP: &str = "u0000000000000000000000000000000000000tip";

/// In-memory repository: two one-sided commit lists and their patches
#[derive(Clone, Default)]
struct FakeGit {
    inner: Arc<FakeRepo>,
}

#[derive(Default)]
struct FakeRepo {
    branch_only: Vec<CommitRef>,
    upstream_only: Vec<CommitRef>,
    patches: HashMap<CommitRef, String>,
}

struct FakeCommit<'a> {
    id: &'a str,
    author: &'a str,
    subject: &'a str,
    body: &'a str,
    diff: &'a str,
}

impl<'a> FakeCommit<'a> {
    fn new(id: &'a str, subject: &'a str, diff: &'a str) -> Self {
        Self {
            id,
            author: "Dev <dev@example.com>",
            subject,
            body: "",
            diff,
        }
    }

    fn author(mut self, author: &'a str) -> Self {
        self.author = author;
        self
    }

    fn body(mut self, body: &'a str) -> Self {
        self.body = body;
        self
    }

    fn patch(&self) -> String {
        let mut patch = format!(
            "commit {}\nAuthor: {}\nDate:   Mon Jan 1 00:00:00 2024 +0000\n\n    {}\n",
            self.id, self.author, self.subject
        );
        if !self.body.is_empty() {
            patch.push('\n');
            for line in self.body.lines() {
                patch.push_str(&format!("    {}\n", line));
            }
        }
        if !self.diff.is_empty() {
            patch.push_str(&format!(
                "\ndiff --git a/file b/file\n--- a/file\n+++ b/file\n@@ -1 +1 @@\n{}\n",
                self.diff
            ));
        }
        patch
    }
}

impl FakeGit {
    /// Lists are newest first, as git prints them
    fn new(branch_only: Vec<FakeCommit>, upstream_only: Vec<FakeCommit>) -> Self {
        let mut repo = FakeRepo::default();
        for commit in &branch_only {
            repo.branch_only.push(commit.id.to_string());
            repo.patches.insert(commit.id.to_string(), commit.patch());
        }
        for commit in &upstream_only {
            repo.upstream_only.push(commit.id.to_string());
            repo.patches.insert(commit.id.to_string(), commit.patch());
        }
        Self {
            inner: Arc::new(repo),
        }
    }

    fn without_patch(mut self, commit: &str) -> Self {
        if let Some(repo) = Arc::get_mut(&mut self.inner) {
            repo.patches.remove(commit);
        }
        self
    }
}

impl GitOperations for FakeGit {
    async fn resolve_ref(&self, name: &str) -> Result<CommitRef, GitError> {
        match name {
            BRANCH => Ok(BRANCH_TIP.to_string()),
            UPSTREAM => Ok(UPSTREAM_TIP.to_string()),
            _ => Err(GitError::RevisionNotFound(name.to_string())),
        }
    }

    async fn symmetric_difference(
        &self,
        exclude: &str,
        include: &str,
    ) -> Result<Vec<CommitRef>, GitError> {
        match (exclude, include) {
            (UPSTREAM_TIP, BRANCH_TIP) => Ok(self.inner.branch_only.clone()),
            (BRANCH_TIP, UPSTREAM_TIP) => Ok(self.inner.upstream_only.clone()),
            _ => Err(GitError::CommandFailed {
                command: format!("git rev-list {}..{}", exclude, include),
                stderr: "bad range".to_string(),
            }),
        }
    }

    async fn show_commit(&self, commit: &str) -> Result<Vec<u8>, GitError> {
        self.inner
            .patches
            .get(commit)
            .map(|p| p.as_bytes().to_vec())
            .ok_or_else(|| GitError::CommandFailed {
                command: format!("git show {}", commit),
                stderr: format!("fatal: bad object {}", commit),
            })
    }

    /// Hash of the changed lines only, like git's patch-id
    async fn patch_identity(&self, patch: &[u8]) -> Result<String, GitError> {
        let text = String::from_utf8_lossy(patch);
        let changed: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("diff --git"))
            .filter(|l| {
                (l.starts_with('+') || l.starts_with('-'))
                    && !l.starts_with("+++")
                    && !l.starts_with("---")
            })
            .collect();
        if changed.is_empty() {
            return Ok(String::new());
        }
        let mut hasher = DefaultHasher::new();
        changed.hash(&mut hasher);
        Ok(format!("{:016x} 0000000000000000000000000000000000000000\n", hasher.finish()))
    }
}

async fn run(git: FakeGit) -> Result<Report, AppError> {
    let config = ServiceConfig::new().with_git_concurrency(3);
    App::with_gateway(git, config, CancellationToken::new())
        .run(BRANCH, UPSTREAM)
        .await
}

fn ids(values: &[&str]) -> Vec<CommitRef> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_commit_already_upstream() {
    let git = FakeGit::new(
        vec![FakeCommit::new("x1", "Add line", "+L")],
        vec![FakeCommit::new("y1", "Add line (upstream)", "+L").author("Other <other@example.com>")],
    );

    let report = run(git).await.expect("report");

    assert_eq!(report.summary.found_upstream, 1);
    assert_eq!(report.summary.effective, 0);
    let line = report.line("x1").expect("x1 line");
    assert_eq!(line.annotations, vec![Annotation::FoundInUpstream(ids(&["y1"]))]);
    assert!(line.to_string().ends_with("\tfound in upstream [y1]"));
}

#[tokio::test]
async fn test_duplicates_still_count_as_effective() {
    let git = FakeGit::new(
        vec![
            FakeCommit::new("x2", "Add line again", "+L"),
            FakeCommit::new("x1", "Add line", "+L"),
        ],
        vec![FakeCommit::new("y1", "Unrelated", "+M")],
    );

    let report = run(git).await.expect("report");

    assert_eq!(report.summary.effective, 2);
    assert_eq!(
        report.line("x1").map(|l| l.annotations.clone()),
        Some(vec![Annotation::DuplicateOf(ids(&["x2"]))])
    );
    assert_eq!(
        report.line("x2").map(|l| l.annotations.clone()),
        Some(vec![Annotation::DuplicateOf(ids(&["x1"]))])
    );
}

#[tokio::test]
async fn test_short_hash_revert_within_branch() {
    let target = "abc123456789abcdef0123456789abcdef012345";
    let git = FakeGit::new(
        vec![
            FakeCommit::new("r1", "Revert \"Add feature\"", "-F")
                .body("Reverts commit abc123 because it broke the build."),
            FakeCommit::new(target, "Add feature", "+F"),
        ],
        Vec::new(),
    );

    let report = run(git).await.expect("report");

    assert_eq!(report.summary.reverted_from_branch, 1);
    assert_eq!(report.summary.reverts_from_upstream, 0);
    assert_eq!(
        report.line(target).map(|l| l.annotations.clone()),
        Some(vec![Annotation::RevertedBy("r1".to_string())])
    );
    let reverter = report.line("r1").expect("r1 line");
    assert_eq!(
        reverter.annotations,
        vec![Annotation::RevertsBranch(target.to_string())]
    );
    assert!(reverter
        .to_string()
        .ends_with(&format!("reverts branch {}", target)));
}

#[tokio::test]
async fn test_revert_of_upstream_commit() {
    let git = FakeGit::new(
        vec![FakeCommit::new("r1", "Revert upstream change", "-U").body("This reverts commit beef0042.")],
        vec![FakeCommit::new("beef00421234", "Upstream change", "+U")],
    );

    let report = run(git).await.expect("report");

    assert_eq!(report.summary.reverts_from_upstream, 1);
    assert_eq!(
        report.line("r1").map(|l| l.annotations.clone()),
        Some(vec![Annotation::RevertsUpstream("beef00421234".to_string())])
    );
}

#[tokio::test]
async fn test_branch_revert_target_wins_over_upstream() {
    let git = FakeGit::new(
        vec![
            FakeCommit::new("r1", "Revert", "-B").body("This reverts commit cafe01."),
            FakeCommit::new("cafe01bb", "Branch side", "+B"),
        ],
        vec![FakeCommit::new("cafe01aa", "Upstream side", "+A")],
    );

    let report = run(git).await.expect("report");

    assert_eq!(report.summary.reverted_from_branch, 1);
    assert_eq!(report.summary.reverts_from_upstream, 0);
    assert_eq!(
        report.line("r1").map(|l| l.annotations.clone()),
        Some(vec![Annotation::RevertsBranch("cafe01bb".to_string())])
    );
}

#[tokio::test]
async fn test_unknown_revert_target() {
    let git = FakeGit::new(
        vec![FakeCommit::new("r1", "Revert old thing", "-O").body("This reverts commit 0ddba11.")],
        Vec::new(),
    );

    let report = run(git).await.expect("report");

    assert_eq!(
        report.line("r1").map(|l| l.annotations.clone()),
        Some(vec![Annotation::RevertsUnknown("0ddba11".to_string())])
    );
}

#[tokio::test]
async fn test_empty_commit_is_excluded_from_matching() {
    let git = FakeGit::new(
        vec![
            FakeCommit::new("e2", "Also empty", ""),
            FakeCommit::new("e1", "Whitespace only", ""),
            FakeCommit::new("x1", "Real change", "+R"),
        ],
        vec![FakeCommit::new("u1", "Empty upstream", "")],
    );

    let report = run(git).await.expect("report");

    assert_eq!(report.summary.empty, 2);
    assert_eq!(report.summary.found_upstream, 0);
    assert_eq!(report.summary.effective, 1);
    for commit in ["e1", "e2"] {
        assert_eq!(
            report.line(commit).map(|l| l.annotations.clone()),
            Some(vec![Annotation::EmptyCommit])
        );
    }
}

#[tokio::test]
async fn test_report_is_oldest_first_and_idempotent() {
    let make = || {
        FakeGit::new(
            vec![
                FakeCommit::new("c3", "Third", "+3"),
                FakeCommit::new("c2", "Second", "+2"),
                FakeCommit::new("c1", "First", "+1"),
                FakeCommit::new("c0", "First again", "+1"),
            ],
            vec![
                FakeCommit::new("u2", "Second upstream", "+2"),
                FakeCommit::new("u1", "Second upstream again", "+2"),
            ],
        )
    };

    let first = run(make()).await.expect("report").to_string();
    let second = run(make()).await.expect("report").to_string();
    assert_eq!(first, second);

    let expected = "total to apply: 4\n\
                    empty commits: 0\n\
                    found in upstream: 1\n\
                    reverted from branch: 0\n\
                    reverts from upstream: 0\n\
                    total to apply without found and empty: 3\n\
                    --------------------------------------------------\n\
                    \n\
                    c0\tMon Jan 1 00:00:00 2024\tdev@example.com\tFirst again\tduplicate of [c1]\n\
                    c1\tMon Jan 1 00:00:00 2024\tdev@example.com\tFirst\tduplicate of [c0]\n\
                    c2\tMon Jan 1 00:00:00 2024\tdev@example.com\tSecond\tfound in upstream [u2, u1]\n\
                    c3\tMon Jan 1 00:00:00 2024\tdev@example.com\tThird\n";
    assert_eq!(first, expected);
}

#[tokio::test]
async fn test_gateway_failure_aborts_the_run() {
    let git = FakeGit::new(
        vec![
            FakeCommit::new("x2", "Fine", "+2"),
            FakeCommit::new("x1", "Broken", "+1"),
        ],
        Vec::new(),
    )
    .without_patch("x1");

    let result = run(git).await;

    match result {
        Err(AppError::Git(GitError::CommandFailed { command, .. })) => {
            assert_eq!(command, "git show x1");
        }
        other => panic!("expected a gateway failure, got {:?}", other.map(|r| r.to_string())),
    }
}

#[tokio::test]
async fn test_unknown_reference_is_fatal() {
    let git = FakeGit::new(Vec::new(), Vec::new());
    let result = App::with_gateway(git, ServiceConfig::new(), CancellationToken::new())
        .run("no-such-branch", UPSTREAM)
        .await;

    assert!(matches!(
        result,
        Err(AppError::Git(GitError::RevisionNotFound(name))) if name == "no-such-branch"
    ));
}

#[tokio::test]
async fn test_cancelled_app_produces_no_report() {
    let git = FakeGit::new(vec![FakeCommit::new("x1", "Change", "+1")], Vec::new());
    let app = App::with_gateway(git, ServiceConfig::new(), CancellationToken::new());
    app.cancel();

    assert!(matches!(app.run(BRANCH, UPSTREAM).await, Err(AppError::Cancelled)));
}

// Real git

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "commit.gpgsign=false", "-c", "core.autocrlf=false"])
        .args(args)
        .env("GIT_AUTHOR_NAME", "Dev")
        .env("GIT_AUTHOR_EMAIL", "dev@example.com")
        .env("GIT_COMMITTER_NAME", "Dev")
        .env("GIT_COMMITTER_EMAIL", "dev@example.com")
        .env("GIT_AUTHOR_DATE", "2024-01-01T00:00:00+0000")
        .env("GIT_COMMITTER_DATE", "2024-01-01T00:00:00+0000")
        .output()
        .expect("git runs");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn commit_file(dir: &Path, name: &str, content: &str, message: &str) -> String {
    std::fs::write(dir.join(name), content).expect("write file");
    git(dir, &["add", name]);
    git(dir, &["commit", "-q", "-m", message]);
    git(dir, &["rev-parse", "HEAD"])
}

#[tokio::test]
async fn test_against_real_repository() {
    if !git_available() {
        return;
    }

    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path();
    git(dir, &["init", "-q"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    commit_file(dir, "base.txt", "base\n", "Base");

    git(dir, &["checkout", "-q", "-b", "topic"]);
    let picked = commit_file(dir, "shared.txt", "L\n", "Add shared line");
    git(dir, &["commit", "-q", "--allow-empty", "-m", "Nothing here"]);
    let empty = git(dir, &["rev-parse", "HEAD"]);
    let feature = commit_file(dir, "feature.txt", "feature\n", "Add feature");
    git(dir, &["revert", "--no-edit", &feature]);
    let revert = git(dir, &["rev-parse", "HEAD"]);

    git(dir, &["checkout", "-q", "main"]);
    let upstream_copy = commit_file(dir, "shared.txt", "L\n", "Shared line, upstream flavour");

    let config = ServiceConfig::new().with_repo_path(dir).with_git_concurrency(2);
    let report = App::new(config, CancellationToken::new())
        .run("topic", "main")
        .await
        .expect("report");

    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.empty, 1);
    assert_eq!(report.summary.found_upstream, 1);
    assert_eq!(report.summary.reverted_from_branch, 1);
    assert_eq!(report.summary.effective, 2);

    let order: Vec<&str> = report.lines.iter().map(|l| l.commit.as_str()).collect();
    assert_eq!(order, [picked.as_str(), empty.as_str(), feature.as_str(), revert.as_str()]);

    let picked_line = report.line(&picked).expect("picked line");
    assert_eq!(picked_line.author, "dev@example.com");
    assert_eq!(picked_line.date, "Mon Jan 1 00:00:00 2024");
    assert_eq!(picked_line.subject, "Add shared line");
    assert_eq!(
        picked_line.annotations,
        vec![Annotation::FoundInUpstream(vec![upstream_copy])]
    );
    assert_eq!(
        report.line(&empty).map(|l| l.annotations.clone()),
        Some(vec![Annotation::EmptyCommit])
    );
    assert_eq!(
        report.line(&feature).map(|l| l.annotations.clone()),
        Some(vec![Annotation::RevertedBy(revert.clone())])
    );
    assert_eq!(
        report.line(&revert).map(|l| l.annotations.clone()),
        Some(vec![Annotation::RevertsBranch(feature.clone())])
    );
}
