//! Report builder
//!
//! One line per branch commit, oldest first (the order a rebase applies
//! them), preceded by the aggregate counters.

mod render;

use crate::analysis::{Correlation, Summary};
use crate::model::{CommitRef, CommitSet, RevertRef};

/// A note attached to a report line. Variants are declared in the order
/// they are rendered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Annotation {
    FoundInUpstream(Vec<CommitRef>),
    EmptyCommit,
    DuplicateOf(Vec<CommitRef>),
    RevertedBy(CommitRef),
    RevertsUpstream(CommitRef),
    RevertsBranch(CommitRef),
    RevertsUnknown(String),
}

/// One annotated branch commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub commit: CommitRef,
    pub date: String,
    pub author: String,
    pub subject: String,
    pub annotations: Vec<Annotation>,
}

/// The full report for one branch/upstream pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub summary: Summary,
    pub lines: Vec<ReportLine>,
}

impl Report {
    /// Assemble the report from a correlated branch set
    pub fn build(branch: &CommitSet, correlation: &Correlation) -> Self {
        let lines = branch
            .iter()
            .rev()
            .map(|(commit, info)| {
                let mut annotations = Vec::new();

                if let Some(upstream) = correlation.found_upstream.get(commit) {
                    annotations.push(Annotation::FoundInUpstream(upstream.clone()));
                }
                if info.is_empty() {
                    annotations.push(Annotation::EmptyCommit);
                }
                if let Some(others) = correlation.duplicates.get(commit) {
                    annotations.push(Annotation::DuplicateOf(others.clone()));
                }
                if let Some(reverter) = correlation.reverts.reverted_from_branch.get(commit) {
                    annotations.push(Annotation::RevertedBy(reverter.clone()));
                }
                match &info.reverts {
                    RevertRef::Absent => {}
                    RevertRef::Upstream(target) => {
                        annotations.push(Annotation::RevertsUpstream(target.clone()))
                    }
                    RevertRef::Branch(target) => {
                        annotations.push(Annotation::RevertsBranch(target.clone()))
                    }
                    RevertRef::Unresolved(token) => {
                        annotations.push(Annotation::RevertsUnknown(token.clone()))
                    }
                }

                ReportLine {
                    commit: commit.clone(),
                    date: info.date.clone(),
                    author: info.author.clone(),
                    subject: info.subject.clone(),
                    annotations,
                }
            })
            .collect();

        Self {
            summary: correlation.summary,
            lines,
        }
    }

    /// Look up the line for a commit
    pub fn line(&self, commit: &str) -> Option<&ReportLine> {
        self.lines.iter().find(|line| line.commit == commit)
    }
}
