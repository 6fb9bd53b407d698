mod commit;

pub use commit::{CommitInfo, CommitRef, CommitSet, RevertRef};
