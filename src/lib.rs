//! rebase-list - Plan a rebase of a long-lived branch onto upstream
//!
//! For every commit that exists only on the branch, this library works out
//! whether an equivalent change is already upstream, whether it duplicates
//! another branch commit, and whether it reverts some other commit. Nothing
//! in the repository is modified.
//!
//! # Architecture
//!
//! - [`service`]: the git gateway ([`GitOperations`] and [`GitService`])
//! - [`analysis`]: per-commit fingerprinting and metadata extraction, the
//!   bounded worker pool, and the correlation engine
//! - [`report`]: the annotated, oldest-first report
//! - [`app`]: the staged pipeline tying these together
//!
//! # Example
//!
//! ```rust,no_run
//! use rebase_list::{App, ServiceConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> rebase_list::AppResult<()> {
//!     let app = App::new(ServiceConfig::default(), CancellationToken::new());
//!     let report = app.run("my-branch", "origin/main").await?;
//!     print!("{report}");
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;
pub mod service;

// Re-export commonly used types at the crate root
pub use analysis::{Correlation, RevertLinks, Summary};
pub use app::App;
pub use config::{ServiceConfig, Timeouts};
pub use error::{AppError, AppResult, GitError};
pub use model::{CommitInfo, CommitRef, CommitSet, RevertRef};
pub use report::{Annotation, Report, ReportLine};
pub use service::{GitOperations, GitService};
