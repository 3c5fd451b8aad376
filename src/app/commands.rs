//! Subcommand implementations
//!
//! Each command works against an [`AppContext`] so it can be driven from
//! tests with an in-memory store and an arbitrary input reader.

use crate::app::cli::display::{print_records, print_stats};
use crate::app::cli::{AppConfig, Command, StoreLocation};
use crate::core::error_handling::ContextualError;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::styles::StyleRole;
use crate::core::time::{Clock, SystemClock};
use crate::core::version;
use crate::dedup::{Decision, Deduplicator};
use crate::notifications::api::{
    publish_best_effort, Event, EventFilter, ScanEventType, SharedNotificationManager, SyncEvent,
    SyncEventType,
};
use crate::session::{parse_line, ScanOutcome, ScanPipeline};
use crate::store::{JsonFileScanStore, MemoryScanStore, RecordId, ScanStore, StoreError};
use crate::sync::{HttpTransport, NetworkError, SyncCoordinator, SyncResult};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const EVENT_PRINTER_ID: &str = "cli-printer";

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Failed to read scan input: {0}")]
    Input(#[from] std::io::Error),

    #[error("No scan with id {id}")]
    NotFound { id: RecordId },

    #[error("{summary}")]
    SyncFailed { summary: String },
}

impl ContextualError for CommandError {
    fn is_user_actionable(&self) -> bool {
        match self {
            CommandError::Store(e) => e.is_user_actionable(),
            CommandError::Network(e) => e.is_user_actionable(),
            CommandError::Input(_) => false,
            CommandError::NotFound { .. } | CommandError::SyncFailed { .. } => true,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            CommandError::Store(e) => e.user_message(),
            CommandError::Network(e) => e.user_message(),
            CommandError::SyncFailed { summary } => Some(summary),
            _ => None,
        }
    }
}

/// Everything a command needs
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn ScanStore>,
    pub notifications: SharedNotificationManager,
    pub use_color: bool,
}

/// Counters for one `scan` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub events: usize,
    pub recorded: usize,
    pub new_codes: usize,
    pub busy: usize,
    pub duplicates: usize,
    pub invalid_lines: usize,
    pub interrupted: bool,
}

impl ScanSummary {
    fn count(&mut self, outcome: &ScanOutcome) {
        self.events += 1;
        match outcome {
            ScanOutcome::Recorded { first_seen, .. } => {
                self.recorded += 1;
                if *first_seen {
                    self.new_codes += 1;
                }
            }
            ScanOutcome::Rejected(Decision::RejectBusy) => self.busy += 1,
            ScanOutcome::Rejected(Decision::RejectDuplicate) => self.duplicates += 1,
            ScanOutcome::Rejected(Decision::Accept) => {}
        }
    }
}

pub async fn open_store(location: &StoreLocation) -> Result<Arc<dyn ScanStore>, StoreError> {
    let store: Arc<dyn ScanStore> = match location {
        StoreLocation::Memory => Arc::new(MemoryScanStore::new()),
        StoreLocation::File(path) => Arc::new(JsonFileScanStore::open(path).await?),
    };
    log::debug!("Using scan store {}", store.describe());
    Ok(store)
}

pub fn build_sync_coordinator(config: &AppConfig) -> Result<SyncCoordinator, NetworkError> {
    if config.local_only {
        return Ok(SyncCoordinator::local_only(config.local_sync_delay));
    }
    let transport = HttpTransport::new(&config.base_url, config.http_timeout)?;
    log::debug!("Remote sync endpoint: {}", transport.endpoint());
    Ok(SyncCoordinator::remote(Arc::new(transport)))
}

/// Print every notification message until the printer is unsubscribed
pub async fn spawn_event_printer(
    notifications: &SharedNotificationManager,
    use_color: bool,
) -> JoinHandle<()> {
    let mut receiver = notifications.lock().await.subscribe(
        EVENT_PRINTER_ID.to_string(),
        EventFilter::All,
        "app:commands".to_string(),
    );

    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            let Some(message) = event.message() else {
                continue;
            };
            let role = match &event {
                e if e.is_error() => StyleRole::Error,
                Event::Scan(scan) if scan.event_type == ScanEventType::NewCode => StyleRole::Valid,
                Event::Scan(_) => StyleRole::Accent,
                Event::Sync(_) => StyleRole::Literal,
                Event::System(_) => StyleRole::Dim,
            };
            println!("{}", role.paint(message, use_color));
        }
    })
}

/// Unsubscribe the printer and wait for it to drain
pub async fn stop_event_printer(notifications: &SharedNotificationManager, printer: JoinHandle<()>) {
    notifications.lock().await.unsubscribe(EVENT_PRINTER_ID);
    if let Err(e) = printer.await {
        log::warn!("Event printer ended abnormally: {}", e);
    }
}

/// Run one command against the context
pub async fn dispatch(ctx: &AppContext, command: &Command) -> Result<(), CommandError> {
    match command {
        Command::List { limit } => run_list(ctx, *limit).await,
        Command::Stats { all } => run_stats(ctx, *all).await,
        Command::Delete { id } => run_delete(ctx, *id).await,
        Command::Clear => run_clear(ctx).await,
        Command::Sync => {
            let coordinator = build_sync_coordinator(&ctx.config)?;
            let result = run_sync(ctx, &coordinator).await?;
            match result {
                SyncResult::Failed { .. } => Err(CommandError::SyncFailed {
                    summary: result.summary(),
                }),
                _ => Ok(()),
            }
        }
        Command::Version => {
            print_version(ctx.use_color);
            Ok(())
        }
        Command::Scan { input } => {
            // Kept alive for the whole run; dropping it closes the shutdown channel
            let (shutdown, shutdown_rx) = ShutdownCoordinator::new();
            shutdown.install_signal_handlers();

            let summary = match input {
                Some(path) => {
                    let file = tokio::fs::File::open(path).await?;
                    run_scan(ctx, BufReader::new(file), shutdown_rx).await?
                }
                None => run_scan(ctx, BufReader::new(tokio::io::stdin()), shutdown_rx).await?,
            };
            print_scan_summary(&summary, ctx.use_color);
            if shutdown.is_shutdown_requested() {
                log::debug!("Scan ended by signal");
            }
            Ok(())
        }
    }
}

/// Feed decode events from `reader` through the pipeline until EOF or shutdown
pub async fn run_scan<R>(
    ctx: &AppContext,
    reader: R,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<ScanSummary, CommandError>
where
    R: AsyncBufRead + Unpin,
{
    let pipeline = ScanPipeline::new(
        Deduplicator::new(ctx.config.dedup_config()),
        ctx.store.clone(),
        ctx.notifications.clone(),
    );
    let clock = SystemClock;
    let mut summary = ScanSummary::default();
    let mut lines = reader.lines();
    let mut line_number = 0usize;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown_rx.recv() => {
                log::info!("Shutdown requested, stopping scan input");
                summary.interrupted = true;
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        line_number += 1;

        let event = match parse_line(&line, line_number, &clock as &dyn Clock) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("{}", e);
                summary.invalid_lines += 1;
                continue;
            }
        };

        let outcome = pipeline.handle(event).await?;
        summary.count(&outcome);
    }

    log::info!(
        "Scan input finished: {} events, {} recorded, {} busy, {} duplicate, {} invalid",
        summary.events,
        summary.recorded,
        summary.busy,
        summary.duplicates,
        summary.invalid_lines
    );
    Ok(summary)
}

pub fn print_scan_summary(summary: &ScanSummary, use_color: bool) {
    println!(
        "{} {} recorded ({} new), {} ignored while busy, {} duplicates{}",
        StyleRole::Key.paint("Scan summary:", use_color),
        summary.recorded,
        summary.new_codes,
        summary.busy,
        summary.duplicates,
        if summary.invalid_lines > 0 {
            format!(", {} invalid lines", summary.invalid_lines)
        } else {
            String::new()
        }
    );
}

pub async fn run_list(ctx: &AppContext, limit: Option<usize>) -> Result<(), CommandError> {
    let mut records = ctx.store.list().await?;
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    print_records(&records, ctx.use_color);
    Ok(())
}

pub async fn run_stats(ctx: &AppContext, include_empty: bool) -> Result<(), CommandError> {
    let stats = ctx.store.compute_stats().await?;
    print_stats(&stats, include_empty, ctx.use_color);
    Ok(())
}

pub async fn run_delete(ctx: &AppContext, id: RecordId) -> Result<(), CommandError> {
    if !ctx.store.delete_by_id(id).await? {
        return Err(CommandError::NotFound { id });
    }
    println!("Deleted scan {}", id);
    Ok(())
}

pub async fn run_clear(ctx: &AppContext) -> Result<(), CommandError> {
    let removed = ctx.store.clear_all().await?;
    println!("Removed {} scan{}", removed, if removed == 1 { "" } else { "s" });
    Ok(())
}

/// Sync the whole store and publish the outcome
pub async fn run_sync(
    ctx: &AppContext,
    coordinator: &SyncCoordinator,
) -> Result<SyncResult, CommandError> {
    let records = ctx.store.list().await?;

    if !records.is_empty() {
        publish_best_effort(
            &ctx.notifications,
            Event::Sync(SyncEvent::new(SyncEventType::Started, records.len())),
        )
        .await;
    }

    let result = coordinator.sync(&records).await;

    let event_type = match &result {
        SyncResult::NothingToSync | SyncResult::Succeeded(_) => SyncEventType::Completed,
        SyncResult::LocalModeNotice(_) => SyncEventType::LocalOnly,
        SyncResult::Failed { .. } => SyncEventType::Failed,
    };
    let count = match &result {
        SyncResult::LocalModeNotice(n) => *n,
        other => other.sent(),
    };
    publish_best_effort(
        &ctx.notifications,
        Event::Sync(SyncEvent::with_message(event_type, count, result.summary())),
    )
    .await;

    Ok(result)
}

pub fn print_version(use_color: bool) {
    println!(
        "{} {}",
        StyleRole::Header.paint("scanlog", use_color),
        version::package_version()
    );
    println!(
        "{} {} ({})",
        StyleRole::Key.paint("Build:", use_color),
        version::build_time(),
        version::git_hash()
    );
    println!(
        "{} {}",
        StyleRole::Key.paint("Store format:", use_color),
        version::store_format_version()
    );
}
