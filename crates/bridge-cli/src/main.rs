//! Binary entry point for the issue bridge.

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use bridge_core::link_key::RepoRef;
use bridge_sync::{run_bridge_server, BridgeConfig};

#[derive(Debug, Parser)]
#[command(
    name = "issue-bridge",
    about = "Mirrors GitHub issues into a YouTrack project",
    version
)]
struct Cli {
    #[arg(
        long,
        env = "GITHUB_TOKEN",
        help = "GitHub API token used for issue listing and profile lookups."
    )]
    github_token: String,

    #[arg(
        long,
        env = "GITHUB_API_BASE",
        default_value = "https://api.github.com",
        help = "GitHub API base URL."
    )]
    github_api_base: String,

    #[arg(
        long,
        env = "GITHUB_REPO",
        help = "Upstream repository in owner/repo format."
    )]
    github_repo: String,

    #[arg(
        long,
        env = "YOUTRACK_URL",
        help = "YouTrack base URL, without the /api suffix."
    )]
    youtrack_url: String,

    #[arg(long, env = "YOUTRACK_TOKEN", help = "YouTrack permanent token.")]
    youtrack_token: String,

    #[arg(
        long,
        env = "YOUTRACK_PROJECT",
        help = "Name of the YouTrack project receiving mirrored issues."
    )]
    youtrack_project: String,

    #[arg(
        long,
        env = "BRIDGE_BIND",
        default_value = "127.0.0.1:8477",
        help = "Webhook listen address."
    )]
    bind: String,

    #[arg(
        long,
        env = "BRIDGE_SKIP_INITIAL_IMPORT",
        help = "Skip the startup backfill and only process webhook events."
    )]
    skip_initial_import: bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = BridgeConfig {
        github_api_base: cli.github_api_base,
        github_token: cli.github_token,
        repo: RepoRef::parse(&cli.github_repo)?,
        youtrack_url: cli.youtrack_url,
        youtrack_token: cli.youtrack_token,
        youtrack_project: cli.youtrack_project,
        bind: cli.bind,
        skip_initial_import: cli.skip_initial_import,
    };
    run_bridge_server(config).await
}
