//! Correlation of branch-only commits against upstream-only commits.
//!
//! The stages run in a fixed order and each one only reads what the
//! previous stages produced:
//!
//! 1. fingerprint index of the branch set, inverted into duplicate groups
//! 2. fingerprint index of the upstream set
//! 3. revert resolution, which rewrites each branch commit's [`RevertRef`]
//! 4. upstream presence of every branch commit
//! 5. aggregate counters
//!
//! Every list produced here follows the chronological order of the set it
//! came from, so two runs over the same ranges give identical results.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::model::{CommitRef, CommitSet, RevertRef};

/// Fingerprint to the commits carrying it, empty fingerprints excluded
pub type FingerprintIndex = BTreeMap<String, Vec<CommitRef>>;

/// Commit to the other commits of its set sharing its fingerprint
pub type DuplicateMap = HashMap<CommitRef, Vec<CommitRef>>;

/// Branch commit to the upstream commits sharing its fingerprint
pub type FoundUpstreamMap = HashMap<CommitRef, Vec<CommitRef>>;

/// Outcome of revert resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevertLinks {
    /// Reverted branch commit to the branch commit reverting it
    pub reverted_from_branch: HashMap<CommitRef, CommitRef>,
    /// Branch commits whose revert target lives upstream
    pub reverts_from_upstream: HashSet<CommitRef>,
}

/// Aggregate counters over the branch set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub empty: usize,
    pub found_upstream: usize,
    pub reverted_from_branch: usize,
    pub reverts_from_upstream: usize,
    /// Commits still to apply: total minus found upstream minus empty.
    /// Duplicates are not subtracted.
    pub effective: usize,
}

/// Everything the report needs besides the commit set itself
#[derive(Debug, Clone, Default)]
pub struct Correlation {
    pub duplicates: DuplicateMap,
    pub found_upstream: FoundUpstreamMap,
    pub reverts: RevertLinks,
    pub summary: Summary,
}

/// Run all stages. Rewrites the revert references of `branch` in place.
pub fn correlate(branch: &mut CommitSet, upstream: &CommitSet) -> Correlation {
    let branch_index = fingerprint_index(branch);
    let duplicates = duplicates(&branch_index);
    debug!(groups = branch_index.len(), duplicates = duplicates.len(), "Indexed branch fingerprints");

    let upstream_index = fingerprint_index(upstream);
    debug!(groups = upstream_index.len(), "Indexed upstream fingerprints");

    let reverts = resolve_reverts(branch, upstream);

    let presence = upstream_presence(branch, &upstream_index);

    let summary = summarize(branch.len(), presence.empty, &presence.found, &reverts);

    Correlation {
        duplicates,
        found_upstream: presence.found,
        reverts,
        summary,
    }
}

/// Group the set's commits by fingerprint, in list order
pub fn fingerprint_index(set: &CommitSet) -> FingerprintIndex {
    let mut index = FingerprintIndex::new();
    for (commit, info) in set.iter() {
        if info.is_empty() {
            continue;
        }
        index
            .entry(info.fingerprint.clone())
            .or_default()
            .push(commit.clone());
    }
    index
}

/// Every member of a group larger than one maps to the rest of its group
pub fn duplicates(index: &FingerprintIndex) -> DuplicateMap {
    let mut duplicates = DuplicateMap::new();
    for group in index.values().filter(|group| group.len() > 1) {
        for commit in group {
            let others = group.iter().filter(|c| *c != commit).cloned().collect();
            duplicates.insert(commit.clone(), others);
        }
    }
    duplicates
}

/// Resolve every branch commit's revert token, preferring branch targets.
///
/// A token matches a set by exact id first, then by the first id in list
/// order it prefixes. When several branch commits revert the same target
/// the one seen last in list order is recorded.
pub fn resolve_reverts(branch: &mut CommitSet, upstream: &CommitSet) -> RevertLinks {
    let resolutions: Vec<(CommitRef, RevertRef)> = branch
        .iter()
        .filter_map(|(commit, info)| {
            let token = info.reverts.token()?;
            let resolved = if let Some(target) = branch.resolve(token) {
                RevertRef::Branch(target.clone())
            } else if let Some(target) = upstream.resolve(token) {
                RevertRef::Upstream(target.clone())
            } else {
                debug!(commit = %commit, token, "Revert target not found");
                return None;
            };
            Some((commit.clone(), resolved))
        })
        .collect();

    let mut links = RevertLinks::default();
    for (commit, resolved) in resolutions {
        match &resolved {
            RevertRef::Branch(target) => {
                if let Some(previous) = links
                    .reverted_from_branch
                    .insert(target.clone(), commit.clone())
                {
                    warn!(
                        target = %target,
                        kept = %commit,
                        dropped = %previous,
                        "Several branch commits revert the same commit; reporting only one"
                    );
                }
            }
            RevertRef::Upstream(_) => {
                links.reverts_from_upstream.insert(commit.clone());
            }
            RevertRef::Absent | RevertRef::Unresolved(_) => {}
        }
        if let Some(info) = branch.get_mut(&commit) {
            info.reverts = resolved;
        }
    }
    links
}

/// Result of the upstream presence stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamPresence {
    pub found: FoundUpstreamMap,
    pub empty: usize,
}

/// Classify each branch commit as empty, found upstream, or novel
pub fn upstream_presence(branch: &CommitSet, upstream_index: &FingerprintIndex) -> UpstreamPresence {
    let mut presence = UpstreamPresence::default();
    for (commit, info) in branch.iter() {
        if info.is_empty() {
            presence.empty += 1;
        } else if let Some(matches) = upstream_index.get(&info.fingerprint) {
            presence.found.insert(commit.clone(), matches.clone());
        }
    }
    presence
}

pub fn summarize(total: usize, empty: usize, found: &FoundUpstreamMap, reverts: &RevertLinks) -> Summary {
    Summary {
        total,
        empty,
        found_upstream: found.len(),
        reverted_from_branch: reverts.reverted_from_branch.len(),
        reverts_from_upstream: reverts.reverts_from_upstream.len(),
        effective: total - found.len() - empty,
    }
}
