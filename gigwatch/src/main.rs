//! gigwatch - concert tracker CLI
//!
//! Keeps a band library with favorites, asks an AI service for upcoming
//! concerts, and tracks reminders and ticket purchases locally.

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gigwatch::config::{resolve_gemini_api_key, resolve_gemini_model};
use gigwatch::db::{init_database_pool, LibraryStore};
use gigwatch::models::{Concert, ConcertFilter};
use gigwatch::services::{
    GeminiClient, ImportSelection, ImportSource, LogNotifier, NotificationPermission, Notifier,
    ReminderScheduler,
};
use gigwatch::{RefreshOutcome, Tracker};
use gigwatch_common::config::{
    CompiledDefaults, LoggingConfig, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use gigwatch_common::events::{EventBus, TrackerEvent};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

use cli::{Args, BandsCommand, Command, ImportCommand, SelectionArgs};

const MODULE_NAME: &str = "gigwatch";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = RootFolderResolver::new(MODULE_NAME).with_cli_override(args.root_folder.clone());
    let toml_config = resolver.load_config();

    init_tracing(&toml_config.logging)?;

    info!(
        "Starting gigwatch v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = resolver.resolve_with(&toml_config);
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;

    let db_path = initializer.database_path();
    if initializer.database_exists() {
        info!("Database: {}", db_path.display());
    } else {
        info!("Creating new database: {}", db_path.display());
    }
    let pool = init_database_pool(&db_path).await?;

    let api_key = match resolve_gemini_api_key(&toml_config) {
        Ok(key) => Some(key),
        Err(e) => {
            warn!("{}", e);
            None
        }
    };
    let gateway = GeminiClient::new(api_key, Some(resolve_gemini_model(&toml_config)))
        .context("Failed to create Gemini client")?;
    info!("AI model: {}", gateway.model());

    let event_bus = EventBus::new(100);
    let mut tracker = Tracker::load(LibraryStore::new(pool), Arc::new(gateway), event_bus)
        .await
        .context("Failed to load tracker state")?;

    run(&mut tracker, args.command, &toml_config).await?;

    tracker.shutdown();
    Ok(())
}

/// Console (stderr) plus optional log file; `RUST_LOG` overrides the TOML level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new(CompiledDefaults::for_current_platform().log_level));

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

async fn run(tracker: &mut Tracker, command: Command, toml_config: &TomlConfig) -> Result<()> {
    match command {
        Command::Bands(BandsCommand::List) => print_bands(tracker),

        Command::Bands(BandsCommand::Add { names }) => {
            let added = tracker.add_bands(names).await?;
            println!("Added {} band(s)", added);
        }

        Command::Bands(BandsCommand::Remove { name }) => {
            tracker.remove_band(&name).await?;
            println!("Removed {}", name);
        }

        Command::Bands(BandsCommand::Favorite { name }) => {
            let favorite = tracker.toggle_favorite(&name).await?;
            println!(
                "{} is {}",
                name,
                if favorite { "now a favorite" } else { "no longer a favorite" }
            );
        }

        Command::Import(import) => {
            let (source, selection_args) = match import {
                ImportCommand::Text { text, selection } => (ImportSource::Text(text), selection),
                ImportCommand::Url { url, selection } => (ImportSource::Url(url), selection),
                ImportCommand::Folder { path, selection } => (ImportSource::Folder(path), selection),
            };
            import_bands(tracker, &source, &selection_args).await?;
        }

        Command::Refresh => match tracker.refresh().await? {
            RefreshOutcome::Updated { count } => println!("Found {} concert(s)", count),
            RefreshOutcome::Empty => println!("No upcoming concerts found"),
            RefreshOutcome::NoBands => println!("Your library is empty, add some bands first"),
        },

        Command::Concerts { status, country } => {
            tracker.set_status_filter(status).await?;
            tracker.set_country_filter(country.as_deref().unwrap_or("")).await?;
            print_concerts(&tracker.visible_concerts(gigwatch_common::time::now()), &tracker.state().filter);
        }

        Command::Countries => {
            for country in tracker.countries() {
                println!("{}", country);
            }
        }

        Command::Remind { concert_id, days } => {
            tracker.set_reminder(&concert_id, days.0).await?;
            match days.0 {
                Some(days) => println!("Reminder set {} day(s) before", days),
                None => println!("Reminder cleared"),
            }
        }

        Command::Purchased { concert_id } => {
            let purchased = tracker.toggle_purchased(&concert_id).await?;
            println!(
                "Ticket {}",
                if purchased { "marked as purchased" } else { "unmarked" }
            );
        }

        Command::Watch { refresh, reload_secs } => {
            watch(tracker, refresh, Duration::from_secs(reload_secs), toml_config).await?
        }
    }

    Ok(())
}

async fn import_bands(tracker: &mut Tracker, source: &ImportSource, args: &SelectionArgs) -> Result<()> {
    let mut selection: ImportSelection = tracker.discover_bands(source).await?;
    if selection.is_empty() {
        println!("No bands found");
        return Ok(());
    }

    for name in &args.exclude {
        if selection.is_selected(name) {
            selection.toggle(name);
        }
    }

    for name in selection.found() {
        let mark = if selection.is_selected(name) { "x" } else { " " };
        println!("[{}] {}", mark, name);
    }

    if args.dry_run {
        println!("{} of {} selected (dry run)", selection.selected_count(), selection.found().len());
        return Ok(());
    }

    let added = tracker.import_selection(&selection).await?;
    println!("Added {} new band(s)", added);
    Ok(())
}

async fn watch(
    tracker: &mut Tracker,
    refresh: bool,
    reload_every: Duration,
    toml_config: &TomlConfig,
) -> Result<()> {
    let notifier = LogNotifier::from_config(toml_config.notifications.enabled);
    if notifier.request_permission() != NotificationPermission::Granted {
        println!("Notifications are disabled; no reminders will be delivered");
    }

    let mut events = tracker.event_bus().subscribe();
    let scheduler = ReminderScheduler::new(Arc::new(notifier)).with_event_bus(tracker.event_bus().clone());
    let scheduled = tracker.attach_scheduler(scheduler);
    println!("{} reminder(s) scheduled, press Ctrl+C to stop", scheduled);

    if refresh {
        if let Err(e) = tracker.refresh().await {
            println!("Refresh failed: {}", e);
        }
    }

    let mut reload_tick = tokio::time::interval(reload_every);
    reload_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    reload_tick.tick().await;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
            _ = reload_tick.tick() => match tracker.reload().await {
                Ok(true) => info!("Library changed on disk, reminders replanned"),
                Ok(false) => {}
                Err(e) => warn!("Failed to reload library: {}", e),
            },
            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event listener lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

fn print_event(event: &TrackerEvent) {
    match event {
        TrackerEvent::ReminderFired { band_name, .. } => info!("Reminder delivered for {}", band_name),
        TrackerEvent::RemindersScheduled { scheduled, .. } => println!("{} reminder(s) scheduled", scheduled),
        TrackerEvent::ConcertsRefreshed { concert_count, .. } => println!("{} concert(s) loaded", concert_count),
        TrackerEvent::RefreshFailed { message, .. } => println!("Refresh failed: {}", message),
        TrackerEvent::BandsChanged { band_count, .. } => println!("Library now has {} band(s)", band_count),
    }
}

fn print_bands(tracker: &Tracker) {
    let bands = &tracker.state().bands;
    if bands.is_empty() {
        println!("Your library is empty");
        return;
    }
    for band in bands {
        println!("{} {}", if band.is_favorite { "*" } else { " " }, band.name);
    }
}

fn print_concerts(concerts: &[&Concert], filter: &ConcertFilter) {
    if concerts.is_empty() {
        match &filter.country {
            Some(country) => println!("No concerts match '{}' in {}", filter.status, country),
            None => println!("No concerts match '{}'", filter.status),
        }
        return;
    }

    for concert in concerts {
        let mut flags = Vec::new();
        if concert.is_favorite {
            flags.push("favorite".to_string());
        }
        if concert.ticket_purchased {
            flags.push("ticket".to_string());
        }
        if let Some(days) = concert.reminder_days {
            flags.push(format!("remind {}d", days));
        }

        println!(
            "{}  {}  {} @ {}, {} ({}){}",
            concert.id,
            concert.date,
            concert.band_name,
            concert.venue,
            concert.city,
            concert.country,
            if flags.is_empty() { String::new() } else { format!("  [{}]", flags.join(", ")) }
        );
        if !concert.ticket_url.is_empty() {
            println!("    {}", concert.ticket_url);
        }
    }
}
