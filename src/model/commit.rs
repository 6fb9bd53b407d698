use std::collections::{HashMap, HashSet};

/// Full object id of a commit, as printed by git
pub type CommitRef = String;

/// Where a commit's "reverts <token>" marker points
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RevertRef {
    /// No revert marker in the message
    #[default]
    Absent,
    /// Marker found but the token matched neither commit set
    Unresolved(String),
    /// Token resolved to a branch-only commit
    Branch(CommitRef),
    /// Token resolved to an upstream-only commit
    Upstream(CommitRef),
}

impl RevertRef {
    /// The raw token still awaiting resolution, if any
    pub fn token(&self) -> Option<&str> {
        match self {
            RevertRef::Unresolved(token) => Some(token),
            _ => None,
        }
    }
}

/// Everything derived from one commit's patch text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitInfo {
    pub author: String,
    pub date: String,
    pub subject: String,
    /// Patch identity; empty when the commit has no content change
    pub fingerprint: String,
    pub reverts: RevertRef,
}

impl CommitInfo {
    /// Whether the commit carries no derivable content change
    pub fn is_empty(&self) -> bool {
        self.fingerprint.is_empty()
    }
}

/// One side of the branch/upstream difference, in the order git listed it
#[derive(Debug, Clone, Default)]
pub struct CommitSet {
    refs: Vec<CommitRef>,
    infos: HashMap<CommitRef, CommitInfo>,
}

impl CommitSet {
    /// Build a set from the listed refs and the collected info for each.
    ///
    /// Refs without collected info are dropped; the collector guarantees
    /// there are none.
    pub fn new(refs: Vec<CommitRef>, mut infos: HashMap<CommitRef, CommitInfo>) -> Self {
        let refs: Vec<CommitRef> = refs.into_iter().filter(|r| infos.contains_key(r)).collect();
        let listed: HashSet<&CommitRef> = refs.iter().collect();
        infos.retain(|r, _| listed.contains(r));
        Self { refs, infos }
    }

    /// Refs in chronological list order (newest first, as git lists them)
    pub fn refs(&self) -> &[CommitRef] {
        &self.refs
    }

    pub fn get(&self, commit: &str) -> Option<&CommitInfo> {
        self.infos.get(commit)
    }

    pub(crate) fn get_mut(&mut self, commit: &str) -> Option<&mut CommitInfo> {
        self.infos.get_mut(commit)
    }

    pub fn contains(&self, commit: &str) -> bool {
        self.infos.contains_key(commit)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Iterate refs with their info in list order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&CommitRef, &CommitInfo)> {
        self.refs
            .iter()
            .filter_map(|r| self.infos.get(r).map(|info| (r, info)))
    }

    /// Resolve a possibly abbreviated token to a full ref in this set.
    ///
    /// An exact match wins; otherwise the first ref in list order that
    /// starts with the token. Ambiguous prefixes are not disambiguated.
    pub fn resolve(&self, token: &str) -> Option<&CommitRef> {
        let token = token.to_ascii_lowercase();
        if token.is_empty() {
            return None;
        }
        if let Some((commit, _)) = self.infos.get_key_value(token.as_str()) {
            return Some(commit);
        }
        self.refs.iter().find(|r| r.starts_with(token.as_str()))
    }
}
