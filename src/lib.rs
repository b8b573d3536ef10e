pub mod app;
pub mod error;
pub mod models;
pub mod settings;
pub mod setup;
pub mod summary;
pub mod timer;
pub mod utils;

use std::{env, fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;

use app::{
    driver::{run_shell, ShellInputs},
    App,
};
use models::SessionState;
use settings::SettingsStore;
use timer::{IntervalTicker, SystemClock};

const ENABLE_LOGS: bool = true;
const DEFAULT_SETTINGS_FILE: &str = "timely-settings.json";
const HEARTBEAT_EVERY_TICKS: u32 = 10;

fn load_session(path: &str) -> Result<SessionState> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read session from {path}"))?;
    serde_json::from_str(&contents).with_context(|| format!("Malformed session in {path}"))
}

fn session_arg() -> Result<Option<String>> {
    let mut args = env::args().skip(1);
    let mut session = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--session" => match args.next() {
                Some(path) => session = Some(path),
                None => bail!("--session needs a file path"),
            },
            other => bail!("unknown argument '{other}'"),
        }
    }
    Ok(session)
}

async fn forward_stdin(lines: mpsc::Sender<String>) {
    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match reader.next_line().await {
            Ok(Some(line)) => {
                if lines.send(line).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                log_error!("failed to read stdin: {}", err);
                break;
            }
        }
    }
}

/// Level used when `RUST_LOG` is unset. Debug mode needs debug output for
/// the per-tick heartbeat to show up.
fn default_log_filter(debug_mode: bool) -> &'static str {
    if debug_mode {
        "debug"
    } else {
        "info"
    }
}

pub fn run() -> Result<()> {
    let debug_mode = env::var("TIMELY_DEBUG").map(|v| v == "1").unwrap_or(false);

    // Initialize logging (RUST_LOG wins over the default level)
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(debug_mode)),
    )
    .init();

    log::info!("Timely starting up...");

    let settings_path = env::var("TIMELY_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let settings = SettingsStore::new(settings_path)?.get()?;
    let heartbeat = if debug_mode { 1 } else { HEARTBEAT_EVERY_TICKS };

    let session = match session_arg()? {
        Some(path) => Some(load_session(&path)?),
        None => None,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let result = runtime.block_on(async move {
        let (ticker, ticks) = IntervalTicker::new(settings.tick_interval());
        let clock = SystemClock::new();
        let mut app = match session {
            Some(session) => App::with_session(clock, ticker, session),
            None => App::new(clock, ticker),
        };
        app.set_shortcuts_enabled(settings.shortcuts_enabled);
        app.set_default_duration_minutes(settings.default_duration_minutes);

        let (line_tx, lines) = mpsc::channel(32);
        tokio::spawn(forward_stdin(line_tx));

        let cancel = CancellationToken::new();
        let ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c.cancel();
            }
        });

        let mut stdout = std::io::stdout();
        run_shell(
            &mut app,
            ShellInputs {
                lines,
                ticks,
                cancel,
            },
            &settings,
            heartbeat,
            &mut stdout,
        )
        .await
    });

    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_timeout(Duration::from_millis(100));
    log::info!("Timely shutting down");
    result
}
