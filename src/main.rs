// chmctl - CHM management API client
// Main entry point

use anyhow::{Context, Result};
use chmctl::app::App;
use chmctl::config::Config;
use chmctl::error::ApiError;
use chmctl::monitor::{MonitorEvent, ServiceState};
use chmctl::protocol::{HostId, ResultKind, ServiceAction, ServiceKind, ServiceProtocol};
use chmctl::render;
use chmctl::resilience::{Backoff, RetryPolicy};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "chmctl")]
#[command(author, version, about = "Monitor and control services through the CHM management API", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Management API base URL (overrides config and environment)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List managed services and the actions each accepts
    Services,

    /// List hosts known to the backend
    Hosts,

    /// Show the status of a service on a host
    Status {
        #[arg(value_enum)]
        service: ServiceKind,
        #[arg(long)]
        host: HostId,
        /// Log entries shown per collection
        #[arg(long)]
        logs: Option<usize>,
        /// Print the raw status record as JSON
        #[arg(long)]
        json: bool,
        /// Attempts before giving up
        #[arg(long)]
        retries: Option<usize>,
    },

    /// Ask the backend to apply an action to a service
    Action {
        #[arg(value_enum)]
        service: ServiceKind,
        #[arg(value_enum)]
        action: ServiceAction,
        #[arg(long)]
        host: HostId,
        /// Re-fetch the status after the action is accepted
        #[arg(long)]
        confirm: bool,
    },

    /// Poll a service until interrupted
    Watch {
        #[arg(value_enum)]
        service: ServiceKind,
        #[arg(long)]
        host: HostId,
        /// Seconds between polls
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Status of a service across every registered host
    Overview {
        #[arg(value_enum)]
        service: ServiceKind,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.clone())?;
    if let Some(base_url) = &cli.base_url {
        config.api_base_url = base_url.clone();
        config.validate()?;
    }

    // Initialize logging to file
    let log_path = config.log_path();
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false) // Disable ANSI colors in log file
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("chmctl starting, logging to {}", log_path.display());

    let app = App::new(config)?;
    let outcome = run(&app, cli.command).await;

    if let Some(hint) = app.session.hint() {
        eprintln!("{}", hint);
    }

    match outcome {
        Ok(code) => Ok(code),
        Err(error) => {
            tracing::error!("{:#}", error);
            eprintln!("Error: {:#}", error);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(app: &App, command: Command) -> Result<ExitCode> {
    match command {
        Command::Services => {
            print!("{}", render::services());
        }
        Command::Hosts => {
            let hosts = app.hosts().list().await?;
            print!("{}", render::hosts(&hosts));
        }
        Command::Status {
            service,
            host,
            logs,
            json,
            retries,
        } => {
            let protocol = app.service(service);
            let policy = match retries {
                Some(attempts) => RetryPolicy::new(attempts, Backoff::default()),
                None => app.config.retry_policy(),
            };

            if json {
                let record = policy
                    .run("status", || {
                        let protocol = protocol.clone();
                        let host = host.clone();
                        async move { protocol.status_json(&host, None).await }
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                let summary = policy
                    .run("status", || {
                        let protocol = protocol.clone();
                        let host = host.clone();
                        async move { protocol.status(&host, None).await }
                    })
                    .await?;
                print!("{}", render::status(&summary, logs.unwrap_or(app.config.log_lines)));
            }
        }
        Command::Action {
            service,
            action,
            host,
            confirm,
        } => {
            return run_action(app, service, action, host, confirm).await;
        }
        Command::Watch {
            service,
            host,
            interval,
        } => {
            let interval = Duration::from_secs(interval.unwrap_or(app.config.poll_interval_secs).max(1));
            let cancel = CancellationToken::new();

            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupted, stopping watch");
                    on_interrupt.cancel();
                }
            });

            println!("Watching {} on {} every {:?} (Ctrl-C to stop)", service, host, interval);
            let mut events = app.monitor(service, host).watch(interval, cancel);
            while let Some(event) = events.next().await {
                match event {
                    MonitorEvent::Refreshed(summary) => {
                        let state = ServiceState::from(summary.status);
                        println!("{}", render::monitor_line(&state, Some(&summary)));
                    }
                    MonitorEvent::Failed(message) => {
                        let state = ServiceState::Error(message);
                        println!("{}", render::monitor_line(&state, None));
                    }
                }
            }
        }
        Command::Overview { service } => {
            let hosts = app.hosts().list().await?;
            let protocol = app.service(service);
            let fetches = hosts.keys().map(|host| {
                let protocol = protocol.clone();
                async move { (host, protocol.status(host, None).await) }
            });

            for (host, outcome) in futures::future::join_all(fetches).await {
                match outcome {
                    Ok(summary) => println!(
                        "{} {:<38} {:<8} cpu {:.1}% mem {:.1}%",
                        render::state_icon(summary.status),
                        host,
                        summary.status,
                        summary.cpu,
                        summary.memory
                    ),
                    Err(error) => println!("! {:<38} {}", host, error),
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_action(
    app: &App,
    service: ServiceKind,
    action: ServiceAction,
    host: HostId,
    confirm: bool,
) -> Result<ExitCode> {
    let protocol: Arc<dyn ServiceProtocol> = app.service(service);
    let result = match protocol.action(&host, action, None).await {
        Ok(result) => result,
        Err(error @ ApiError::UnsupportedAction { .. }) => {
            eprintln!("{} (supported: {})", error, supported(service));
            return Ok(ExitCode::from(2));
        }
        Err(error) => return Err(error.into()),
    };

    println!("{}", render::action_result(protocol.name(), action, &host, &result));
    if result.kind == ResultKind::Err {
        return Ok(ExitCode::from(2));
    }

    if confirm {
        tokio::time::sleep(Duration::from_millis(app.config.confirm_delay_ms)).await;
        let mut monitor = app.monitor(service, host);
        let summary = monitor.refresh(None).await?;
        print!("{}", render::status(summary, app.config.log_lines));
    }
    Ok(ExitCode::SUCCESS)
}

fn supported(service: ServiceKind) -> String {
    service
        .actions()
        .iter()
        .map(|action| action.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
