use std::{future::Future, path::PathBuf, pin::Pin, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use trialview_engine::{FsStatusProvider, SessionConfig, StatusProvider, TrialSession, TrialView};
use trialview_types::{DisplayState, Selection, TrialStatus};
use url::Url;
use trialview_util::{ViewerConfig, default_config_path};

/// Inspect motion-capture trials queued for processing.
#[derive(Parser, Debug)]
#[command(name = "trialview", author, version, about, long_about = None)]
struct Cli {
    /// Directory containing one sub-directory per trial
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Config file (defaults to $TRIALVIEW_CONFIG_PATH or the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Per-fetch timeout in milliseconds; 0 disables it
    #[arg(long, global = true, value_name = "MILLIS")]
    fetch_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List trials with their processing status
    List,
    /// Show one trial (`?show-trial=<n>`, a viewer URL, or a bare index)
    Show {
        target: String,
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Queue a trial that is ready to process
    Process { index: usize },
    /// Re-render a trial whenever its status or artifacts change
    Watch { target: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let root = resolve_root(&cli, &config)?;
    let provider = Arc::new(
        FsStatusProvider::open(&root)
            .await
            .with_context(|| format!("failed to open trials root {}", root.display()))?,
    );
    debug!(root = %provider.root().display(), trial_count = provider.list_trials().len(), "trials root opened");

    match cli.command {
        Command::List => list_trials(&*provider),
        Command::Show { target, json } => show_trial(provider, &config, &target, json).await,
        Command::Process { index } => process_trial(provider, &config, index).await,
        Command::Watch { target } => watch_trial(provider, &config, &target).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<ViewerConfig> {
    let path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load_from_path(path),
        None => ViewerConfig::load(),
    }
    .with_context(|| format!("failed to load config {}", path.display()))?;
    if let Some(fetch_timeout_ms) = cli.fetch_timeout_ms {
        config.fetch_timeout_ms = fetch_timeout_ms;
    }
    debug!(path = %path.display(), ?config, "configuration loaded");
    Ok(config)
}

fn resolve_root(cli: &Cli, config: &ViewerConfig) -> Result<PathBuf> {
    match cli.root.clone().or_else(|| config.trials_root()) {
        Some(root) => Ok(root),
        None => bail!("no trials root configured; pass --root or set trials_root in the config file"),
    }
}

/// Accepts a query string (`?show-trial=3`), a full viewer URL, or a bare
/// index.
fn parse_target(target: &str) -> Result<Selection> {
    let target = target.trim();
    if target.starts_with('?') {
        return Ok(Selection::from_query(target));
    }
    if target.contains("://") {
        let url = Url::parse(target).with_context(|| format!("invalid trial URL {target}"))?;
        return Ok(Selection::from_url(&url));
    }
    Ok(Selection {
        visible: true,
        trial_index: target.parse().ok(),
    })
}

fn list_trials(provider: &dyn StatusProvider) -> Result<()> {
    let trials = provider.list_trials();
    if trials.is_empty() {
        println!("No trials found");
        return Ok(());
    }
    println!(
        "{:<18}{:<14}{:>12}  {:<20} KEY",
        "QUERY", "STATUS", "SIZE", "LAST MODIFIED"
    );
    for (index, trial) in trials.iter().enumerate() {
        println!(
            "{:<18}{:<14}{:>12}  {:<20} {}",
            Selection::show(index).to_query(),
            provider.get_status(&trial.key),
            trial.size,
            trial.last_modified.format("%Y-%m-%d %H:%M:%S").to_string(),
            trial.key
        );
    }
    Ok(())
}

async fn show_trial(provider: Arc<FsStatusProvider>, config: &ViewerConfig, target: &str, json: bool) -> Result<()> {
    let selection = parse_target(target)?;
    let mut session = TrialSession::new(provider, SessionConfig::from(config));
    let state = session.observe(&selection);
    if state.is_hidden() && !json {
        println!("No trial to show for {target}");
        return Ok(());
    }
    session.settle().await;

    let view = TrialView::from_state(&state, session.artifacts());
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else if let Some(view) = view {
        print!("{view}");
    }
    Ok(())
}

async fn process_trial(provider: Arc<FsStatusProvider>, config: &ViewerConfig, index: usize) -> Result<()> {
    let mut session = TrialSession::new(provider.clone(), SessionConfig::from(config));
    let state = session.observe(&Selection::show(index));
    let Some(trial) = state.trial().cloned() else {
        bail!("no trial at index {index}");
    };

    match session.process(&state) {
        Some(handle) => {
            handle.await.context("processing request task failed")?;
            provider.refresh().await?;
            println!("{}: {}", trial.key, provider.get_status(&trial.key));
        }
        None => println!(
            "{} is {}; only trials that are {} can be queued",
            trial.key,
            state.status().unwrap_or_default(),
            TrialStatus::CouldProcess
        ),
    }
    Ok(())
}

async fn watch_trial(provider: Arc<FsStatusProvider>, config: &ViewerConfig, target: &str) -> Result<()> {
    let selection = parse_target(target)?;
    let mut session = TrialSession::new(provider.clone(), SessionConfig::from(config));
    let mut interval = tokio::time::interval(config.watch_interval());
    let mut last_rendered: Option<String> = None;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {}
        }
        if let Err(error) = provider.refresh().await {
            warn!(error = %error, "failed to refresh trial snapshot");
            continue;
        }
        let state = session.observe(&selection);
        if !settle_until_shutdown(&mut session, shutdown.as_mut()).await {
            break;
        }
        let rendered = render(&state, &session);
        if last_rendered.as_ref() != Some(&rendered) {
            print!("{rendered}");
            last_rendered = Some(rendered);
        }
    }
    info!("watch stopped");
    Ok(())
}

/// Waits for pending fetches unless `shutdown` fires first. Returns `false`
/// on shutdown.
async fn settle_until_shutdown<F: Future>(session: &mut TrialSession, shutdown: Pin<&mut F>) -> bool {
    tokio::select! {
        _ = shutdown => false,
        _ = session.settle() => true,
    }
}

fn render(state: &DisplayState, session: &TrialSession) -> String {
    match TrialView::from_state(state, session.artifacts()) {
        Some(view) => format!("{view}\n"),
        None => "(hidden)\n".to_string(),
    }
}
