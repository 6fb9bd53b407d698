use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use tokio_util::sync::CancellationToken;

use rebase_list::{logging, App, AppError, AppResult, ServiceConfig, Timeouts};

/// Calculate the commit list from the branch that should be applied to
/// upstream for rebasing
#[derive(Parser, Debug)]
#[command(name = "rebase-list", version, about, long_about = None)]
struct Args {
    /// The branch
    #[arg(short, long)]
    branch: String,

    /// Upstream
    #[arg(short, long)]
    upstream: String,

    /// Repository to inspect
    #[arg(short = 'C', long, default_value = ".")]
    repo: PathBuf,

    /// Number of commits analyzed concurrently [default: available cores]
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Seconds before a single git command is abandoned
    #[arg(long, default_value_t = 120)]
    timeout: u64,
}

impl Args {
    fn service_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::new()
            .with_repo_path(&self.repo)
            .with_timeouts(Timeouts::new().with_git_command(Duration::from_secs(self.timeout)));
        if let Some(jobs) = self.jobs {
            config = config.with_git_concurrency(jobs);
        }
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logging is optional - the report does not depend on it
    let _ = logging::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_cancelled() => {
            eprintln!("{err}: no report produced");
            ExitCode::from(130)
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> AppResult<()> {
    let args = Args::parse();
    let cancel_token = CancellationToken::new();
    let app = App::new(args.service_config(), cancel_token.clone());

    let report = tokio::select! {
        report = app.run(&args.branch, &args.upstream) => report?,
        _ = tokio::signal::ctrl_c() => {
            cancel_token.cancel();
            return Err(AppError::Cancelled);
        }
    };

    print!("{report}");
    Ok(())
}
