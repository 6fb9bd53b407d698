mod git;
mod traits;

pub use git::GitService;
pub use traits::GitOperations;
