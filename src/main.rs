//! git-promote - promote whitelisted paths into an upstream pull request
//!
//! CLI binary driving the promotion workflow.

use clap::{Parser, Subcommand};
use git_promote::types::Platform;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{AuthAction, PromoteOptions, Stylize};

#[derive(Parser)]
#[command(name = "git-promote")]
#[command(about = "Promote whitelisted paths from a local branch into an upstream pull request")]
#[command(version)]
struct Cli {
    /// Path to the git repository (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Configuration file (overrides $GIT_PROMOTE_CONFIG and the default lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Promote a source branch into a target branch (default)
    Promote {
        /// Target branch (skips the prompt)
        #[arg(short, long)]
        target: Option<String>,

        /// Source branch (skips the prompt)
        #[arg(short, long)]
        source: Option<String>,

        /// Accept the change preview without confirmation
        #[arg(short, long)]
        yes: bool,

        /// Open the review request in the browser when done
        #[arg(long)]
        open: bool,
    },

    /// Show the configured target branches and their whitelists
    Policies,

    /// List stored review-request records
    Records {
        /// Delete records of requests that are no longer open
        #[arg(long)]
        prune: bool,
    },

    /// Authentication management
    Auth {
        #[command(subcommand)]
        platform: AuthPlatform,
    },
}

#[derive(Subcommand)]
enum AuthPlatform {
    /// GitHub authentication
    Github {
        #[command(subcommand)]
        action: AuthCommand,
    },
    /// GitLab authentication
    Gitlab {
        #[command(subcommand)]
        action: AuthCommand,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum AuthCommand {
    /// Test authentication
    Test,
    /// Show authentication setup instructions
    Setup,
}

impl From<AuthCommand> for AuthAction {
    fn from(cmd: AuthCommand) -> Self {
        match cmd {
            AuthCommand::Test => Self::Test,
            AuthCommand::Setup => Self::Setup,
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "git_promote=debug",
        _ => "git_promote=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn dispatch(cli: Cli) -> git_promote::error::Result<()> {
    let path = cli.path.unwrap_or_else(|| PathBuf::from("."));
    let config = cli.config.as_deref();

    match cli.command {
        None => cli::run_promote(&path, config, &PromoteOptions::default()).await,
        Some(Commands::Promote {
            target,
            source,
            yes,
            open,
        }) => {
            let options = PromoteOptions {
                target,
                source,
                yes,
                open,
            };
            cli::run_promote(&path, config, &options).await
        }
        Some(Commands::Policies) => cli::run_policies(&path, config).await,
        Some(Commands::Records { prune }) => cli::run_records(&path, config, prune).await,
        Some(Commands::Auth { platform }) => match platform {
            AuthPlatform::Github { action } => cli::run_auth(Platform::GitHub, action.into()).await,
            AuthPlatform::Gitlab { action } => cli::run_auth(Platform::GitLab, action.into()).await,
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.kind() {
                Some(kind) => anstream::eprintln!("{}: {err}", format!("error[{kind}]").error().for_stderr()),
                // Unkinded errors are internal faults: show everything
                None => anstream::eprintln!("{}: {:?}", "internal error".error().for_stderr(), anyhow::Error::from(err)),
            }
            ExitCode::FAILURE
        }
    }
}
