//! Auth command - check the credentials used to file review requests

use crate::cli::style::{check, Stylize};
use anstream::println;
use git_promote::auth::{get_github_auth, get_gitlab_auth, test_github_auth, test_gitlab_auth};
use git_promote::error::Result;
use git_promote::types::Platform;

/// What to do for a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    /// Check the token against the API
    Test,
    /// Print setup instructions
    Setup,
}

/// Run the auth test command
async fn run_auth_test(platform: Platform) -> Result<()> {
    match platform {
        Platform::GitHub => {
            println!("Testing GitHub authentication...");
            let config = get_github_auth().await?;
            let username = test_github_auth(&config).await?;
            println!("{} Authenticated as {}", check(), username.accent());
            println!("  {} {}", "token from".muted(), config.source);
        }
        Platform::GitLab => {
            println!("Testing GitLab authentication...");
            let config = get_gitlab_auth(None).await?;
            let username = test_gitlab_auth(&config).await?;
            println!("{} Authenticated as {}", check(), username.accent());
            println!("  {} {}", "token from".muted(), config.source);
            println!("  {} {}", "host".muted(), config.host);
        }
    }
    Ok(())
}

/// Run the auth setup command (show instructions)
fn run_auth_setup(platform: Platform) {
    match platform {
        Platform::GitHub => {
            println!("GitHub Authentication Setup");
            println!("===========================");
            println!();
            println!("Option 1: GitHub CLI (recommended)");
            println!("  Install: https://cli.github.com/");
            println!("  Run: gh auth login");
            println!();
            println!("Option 2: Environment variable");
            println!("  Set GITHUB_TOKEN or GH_TOKEN (needs the `repo` scope to request reviewers)");
            println!();
            println!("For GitHub Enterprise:");
            println!("  Set GH_HOST to your instance hostname");
        }
        Platform::GitLab => {
            println!("GitLab Authentication Setup");
            println!("===========================");
            println!();
            println!("Option 1: GitLab CLI (glab)");
            println!("  Install: https://gitlab.com/gitlab-org/cli");
            println!("  Run: glab auth login");
            println!();
            println!("Option 2: Environment variable");
            println!("  Set GITLAB_TOKEN or GL_TOKEN (needs the `api` scope)");
            println!();
            println!("For self-hosted GitLab:");
            println!("  Set GITLAB_HOST to your instance hostname");
        }
    }
}

/// Run an auth action
pub async fn run_auth(platform: Platform, action: AuthAction) -> Result<()> {
    match action {
        AuthAction::Test => run_auth_test(platform).await,
        AuthAction::Setup => {
            run_auth_setup(platform);
            Ok(())
        }
    }
}
