use std::fmt;

use crate::analysis::Summary;
use crate::report::{Annotation, Report, ReportLine};

const SEPARATOR: &str = "--------------------------------------------------";

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total to apply: {}", self.total)?;
        writeln!(f, "empty commits: {}", self.empty)?;
        writeln!(f, "found in upstream: {}", self.found_upstream)?;
        writeln!(f, "reverted from branch: {}", self.reverted_from_branch)?;
        writeln!(f, "reverts from upstream: {}", self.reverts_from_upstream)?;
        writeln!(
            f,
            "total to apply without found and empty: {}",
            self.effective
        )
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::FoundInUpstream(commits) => {
                write!(f, "found in upstream [{}]", commits.join(", "))
            }
            Annotation::EmptyCommit => f.write_str("empty commit"),
            Annotation::DuplicateOf(commits) => write!(f, "duplicate of [{}]", commits.join(", ")),
            Annotation::RevertedBy(commit) => write!(f, "reverted by {}", commit),
            Annotation::RevertsUpstream(commit) => write!(f, "reverts upstream {}", commit),
            Annotation::RevertsBranch(commit) => write!(f, "reverts branch {}", commit),
            Annotation::RevertsUnknown(token) => write!(f, "reverts unknown {}", token),
        }
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.commit, self.date, self.author, self.subject
        )?;
        for (i, annotation) in self.annotations.iter().enumerate() {
            let sep = if i == 0 { "\t" } else { "; " };
            write!(f, "{}{}", sep, annotation)?;
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)?;
        writeln!(f, "{}", SEPARATOR)?;
        writeln!(f)?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
