mod app;
mod config;
mod domain;
mod error;
mod logging;
mod repo;
mod store;
mod ui;

use std::io::stdout;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use tokio::runtime::Runtime;
use tracing::info;

use app::{App, profile_base_for};
use config::GithubConfig;
use repo::ReviewSource;
use repo::github::{GithubClient, auth};
use repo::memory::StaticReviewSource;
use store::Store;

#[derive(Parser, Debug)]
#[command(author, version, about = "revtimes: how often each person is requested as a reviewer", long_about = None)]
struct Args {
    /// Repository owner (user or organization)
    #[arg(long, env = "REPO_OWNER")]
    owner: Option<String>,

    /// Repository name
    #[arg(long, env = "REPO_NAME")]
    repo: Option<String>,

    /// API token; falls back to GITHUB_TOKEN, then `gh auth token`
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API base URL, for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL")]
    api_base: Option<String>,

    /// Fetch once, print `login — count` rows and exit
    #[arg(long, default_value_t = false)]
    print: bool,

    /// With --print, emit JSON instead of text rows
    #[arg(long, default_value_t = false, requires = "print")]
    json: bool,

    /// Use built-in sample data instead of the GitHub API
    #[arg(long, default_value_t = false)]
    demo: bool,

    /// Tick interval of render loop in milliseconds
    #[arg(long, default_value_t = 120)]
    tick_ms: u64,

    /// Log file for the interactive UI (default: OS data dir)
    #[arg(long)]
    log_file: Option<std::path::PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print {
        logging::init_stderr();
    } else {
        let path = match args.log_file.clone() {
            Some(path) => path,
            None => logging::default_log_path()?,
        };
        logging::init_file(&path)?;
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow!("failed to build tokio runtime: {e}"))?;

    if args.demo {
        info!("running with demo data");
        let title = "demo/sample".to_string();
        return launch(&args, &rt, StaticReviewSource::demo(), title, "https://github.com");
    }

    let cfg = build_github_config(&args)?;
    info!(repo = %cfg.slug(), api = %cfg.api_base, "configured");
    // octocrab wants a runtime context when it builds its HTTP stack.
    let client = {
        let _guard = rt.enter();
        GithubClient::new(&cfg)?
    };
    let profile_base = profile_base_for(&cfg.api_base);
    launch(&args, &rt, client, cfg.slug(), &profile_base)
}

fn build_github_config(args: &Args) -> Result<GithubConfig> {
    let token = auth::resolve_token(args.token.as_deref())?;
    GithubConfig::new(
        args.owner.as_deref(),
        args.repo.as_deref(),
        token,
        args.api_base.as_deref(),
    )
}

fn launch<S: ReviewSource>(
    args: &Args,
    rt: &Runtime,
    source: S,
    title: String,
    profile_base: &str,
) -> Result<()> {
    let mut store = Store::new(source, rt.handle().clone());

    if args.print {
        if let Err(failure) = rt.block_on(store.refresh()) {
            bail!(failure);
        }
        let mut out = stdout().lock();
        return if args.json {
            ui::plain::write_json(&mut out, store.state())
        } else {
            ui::plain::write_rows(&mut out, store.state())
        };
    }

    let _guard = rt.enter();
    let mut app = App::new(store, title, profile_base);
    app.set_status("Press 'g' to fetch review requests");
    ui::run(app, Duration::from_millis(args.tick_ms))
}
