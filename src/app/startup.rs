//! Application startup: arguments, configuration, logging, dispatch

use crate::app::cli::{AppConfig, Args, Command};
use crate::app::commands::{self, AppContext};
use crate::core::error_handling::{log_error_with_context, ContextualError};
use crate::core::logging::init_logging;
use crate::core::styles::{palette_to_clap, StyleRole};
use crate::core::version;
use crate::notifications::api::{
    new_shared_manager, publish_best_effort, Event, SystemEvent, SystemEventType,
};
use clap::{CommandFactory, FromArgMatches};
use std::io::IsTerminal;

/// Run the application and return the process exit code
pub async fn startup() -> i32 {
    let args = parse_args();

    let config = match AppConfig::resolve(&args).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{} {}",
                StyleRole::Error.paint("Error:", default_color(args.color_override())),
                e
            );
            return 2;
        }
    };
    let use_color = default_color(config.color);

    if let Err(e) = init_logging(
        config.log_level.as_deref(),
        config.log_format.as_deref(),
        config.log_file.as_ref().and_then(|p| p.to_str()),
        use_color,
    ) {
        eprintln!(
            "{} failed to initialise logging: {}",
            StyleRole::Error.paint("Error:", use_color),
            e
        );
        return 1;
    }

    log::info!(
        "scanlog {} starting ({})",
        version::package_version(),
        if config.local_only { "local-only" } else { "remote" }
    );
    if let Some(path) = &config.config_file {
        log::debug!("Configuration file: {}", path.display());
    }

    // Version needs neither a store nor notifications
    if args.command == Command::Version {
        commands::print_version(use_color);
        return 0;
    }

    let store = match commands::open_store(&config.store).await {
        Ok(store) => store,
        Err(e) => {
            log_error_with_context(&e, "Opening scan store");
            report(&e, use_color);
            return 1;
        }
    };

    let notifications = new_shared_manager();
    let printer = commands::spawn_event_printer(&notifications, use_color).await;
    publish_best_effort(
        &notifications,
        Event::System(SystemEvent::new(SystemEventType::Startup)),
    )
    .await;

    let ctx = AppContext {
        config,
        store,
        notifications: notifications.clone(),
        use_color,
    };
    let result = commands::dispatch(&ctx, &args.command).await;

    publish_best_effort(
        &notifications,
        Event::System(SystemEvent::new(SystemEventType::Shutdown)),
    )
    .await;
    commands::stop_event_printer(&notifications, printer).await;

    match result {
        Ok(()) => 0,
        Err(e) => {
            log_error_with_context(&e, command_context(&args.command));
            report(&e, use_color);
            1
        }
    }
}

fn parse_args() -> Args {
    let raw: Vec<String> = std::env::args().collect();
    let forced = if raw.iter().any(|a| a == "--no-color") {
        Some(false)
    } else if raw.iter().any(|a| a == "--color") {
        Some(true)
    } else {
        None
    };

    let matches = Args::command()
        .styles(palette_to_clap(default_color(forced)))
        .get_matches_from(raw);
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

/// Explicit setting, else color only on a terminal without NO_COLOR
fn default_color(setting: Option<bool>) -> bool {
    setting.unwrap_or_else(|| {
        std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
    })
}

fn command_context(command: &Command) -> &'static str {
    match command {
        Command::Scan { .. } => "Scanning",
        Command::List { .. } => "Listing scans",
        Command::Stats { .. } => "Computing statistics",
        Command::Delete { .. } => "Deleting scan",
        Command::Clear => "Clearing scans",
        Command::Sync => "Syncing scans",
        Command::Version => "Showing version",
    }
}

fn report<E: ContextualError + std::fmt::Display>(error: &E, use_color: bool) {
    let message = match error.user_message() {
        Some(msg) if error.is_user_actionable() => msg.to_string(),
        _ => error.to_string(),
    };
    eprintln!("{} {}", StyleRole::Error.paint("Error:", use_color), message);
}
