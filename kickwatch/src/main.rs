mod cli;
mod output;

use std::io::{IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use kick_api::KickClient;
use kickwatch::config::{AppConfig, Roster};
use kickwatch::domain::AggregateSnapshot;
use kickwatch::logging;
use kickwatch::monitor::{
    ChannelFetcher, FetchOptions, MonitorConfig, MonitorEvent, StatusMonitor, aggregate,
};
use kickwatch::notification::{
    JsonFilePreferenceStore, LogSink, NotificationSink, OptInSink, PreferenceStore, WebhookSink,
};
use kickwatch::view::{self, ViewOptions, ViewState};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::{Args, Commands, NotifyAction, OutputFormat};
use crate::output::OutputManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;

    let (logging, _guard) = logging::init_logging(
        logging::startup_filter(args.verbose, args.quiet),
        config.log_dir.as_deref(),
    )?;
    if !args.verbose && !args.quiet {
        logging.apply_configured_filter(config.log_filter.as_deref());
    }
    debug!(roster = %config.roster_path.display(), "Configuration loaded");

    let output = OutputManager::new(std::io::stdout().is_terminal());

    match args.command {
        Commands::Config => {
            print!("{}", config.show()?);
        }
        Commands::Check { view, output: format } => {
            let roster = Roster::load(&config.roster_path)?;
            let snapshot = aggregate(&build_fetcher(&config)?, &roster).await;
            render(&output, &snapshot, None, &view.state(), &view.options(), format)?;
        }
        Commands::Links { view } => {
            let roster = Roster::load(&config.roster_path)?;
            let snapshot = aggregate(&build_fetcher(&config)?, &roster).await;
            let channels = view::apply(&snapshot.channels, &view.state(), &view.options());
            println!("{}", view::share_text(&channels));
        }
        Commands::Tags => {
            let roster = Roster::load(&config.roster_path)?;
            let snapshot = aggregate(&build_fetcher(&config)?, &roster).await;
            let counts = view::tag_counts(&roster, &snapshot);
            print!("{}", output.format_tags(&counts, &view::all_tags(&roster)));
        }
        Commands::Notify { username, action } => {
            let roster = Roster::load(&config.roster_path)?;
            let username = kick_api::extract_username(&username);
            if roster.find(&username).is_none() {
                bail!("{username} is not in the roster");
            }

            let store = JsonFilePreferenceStore::new(&config.preferences_path);
            store.seed_defaults(&roster)?;
            let enabled = match action {
                Some(NotifyAction::On) => {
                    store.set(&username, true)?;
                    true
                }
                Some(NotifyAction::Off) => {
                    store.set(&username, false)?;
                    false
                }
                Some(NotifyAction::Toggle) => store.toggle(&username)?,
                None => store.get(&username)?,
            };
            println!(
                "{username}: notifications {}",
                if enabled { "on" } else { "off" }
            );
        }
        Commands::Watch { view, output: format } => {
            let roster = Roster::load(&config.roster_path)?;
            watch(&config, roster, &output, view.state(), view.options(), format, &logging).await?;
        }
    }

    Ok(())
}

fn build_fetcher(config: &AppConfig) -> anyhow::Result<ChannelFetcher<KickClient>> {
    let client = kick_api::create_client_builder(config.request_timeout())
        .build()
        .context("failed to build HTTP client")?;
    let api = KickClient::with_base_url(client, &config.api_base_url)?;
    Ok(ChannelFetcher::with_options(
        api,
        FetchOptions {
            site_base_url: config.site_base_url.clone(),
            recent_videos_lookup: config.recent_videos_lookup,
        },
    ))
}

fn render(
    output: &OutputManager,
    snapshot: &AggregateSnapshot,
    stale_error: Option<&str>,
    state: &ViewState,
    options: &ViewOptions,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let channels = view::apply(&snapshot.channels, state, options);
    let text = output.format_view(&channels, snapshot.checked_at, stale_error, format)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}

async fn watch(
    config: &AppConfig,
    roster: Roster,
    output: &OutputManager,
    state: ViewState,
    options: ViewOptions,
    format: OutputFormat,
    logging: &Arc<logging::LoggingConfig>,
) -> anyhow::Result<()> {
    let preferences = Arc::new(JsonFilePreferenceStore::new(&config.preferences_path));
    let seeded = preferences.seed_defaults(&roster)?;
    debug!(seeded, "Seeded notification preferences");

    let sink: Arc<dyn NotificationSink> = match &config.webhook {
        Some(webhook) if webhook.enabled => Arc::new(OptInSink::new(
            WebhookSink::new(webhook.clone())?,
            Arc::clone(&preferences),
        )),
        _ => Arc::new(OptInSink::new(LogSink, Arc::clone(&preferences))),
    };

    let monitor = Arc::new(StatusMonitor::new(
        build_fetcher(config)?,
        roster,
        sink,
        MonitorConfig::from(config),
    ));

    let cancel = CancellationToken::new();
    logging.start_retention_cleanup(cancel.clone());

    let mut events = monitor.subscribe_events();
    let runner = {
        let monitor = Arc::clone(&monitor);
        let cancel = cancel.clone();
        tokio::spawn(async move { monitor.run(cancel).await })
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                cancel.cancel();
                break;
            }
            event = events.recv() => match event {
                Ok(MonitorEvent::SnapshotUpdated { snapshot }) => {
                    render(output, &snapshot, None, &state, &options, format)?;
                }
                Ok(MonitorEvent::PollFailed { message, .. }) => {
                    match monitor.snapshot() {
                        Some(snapshot) => {
                            render(output, &snapshot, Some(&message), &state, &options, format)?;
                        }
                        None => warn!("No data yet: {}", message),
                    }
                }
                Ok(event @ MonitorEvent::StreamerLive { .. }) => {
                    debug!("{}", event.description());
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Renderer fell behind, skipped events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    runner.await.context("monitor task panicked")?;
    Ok(())
}
