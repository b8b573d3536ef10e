use std::io::Write;

use anyhow::Result;
use tokio::{sync::mpsc, time};
use tokio_util::sync::CancellationToken;

use crate::{
    log_debug, log_info,
    models::Phase,
    settings::TrackerSettings,
    timer::{Clock, TickSource},
};

use super::{
    commands::{self, Command, Outcome},
    App,
};

const ENABLE_LOGS: bool = true;

/// Event sources feeding the shell loop.
pub struct ShellInputs {
    pub lines: mpsc::Receiver<String>,
    pub ticks: mpsc::UnboundedReceiver<()>,
    pub cancel: CancellationToken,
}

/// Runs the application until `quit`, end of input or cancellation.
///
/// Everything happens on this one task: a command line and a tick are never
/// processed at the same time.
pub async fn run_shell<C, T, W>(
    app: &mut App<C, T>,
    inputs: ShellInputs,
    settings: &TrackerSettings,
    heartbeat_every_ticks: u32,
    out: &mut W,
) -> Result<()>
where
    C: Clock + Clone + 'static,
    T: TickSource + Clone + 'static,
    W: Write,
{
    let ShellInputs {
        mut lines,
        mut ticks,
        cancel,
    } = inputs;

    if app.phase() == Phase::Loading {
        writeln!(out, "{}", app.render())?;
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = time::sleep(settings.loading_min()) => app.finish_loading(),
        }
        writeln!(out, "{}", app.render())?;
        writeln!(out, "Type 'help' for commands.")?;
    }

    let heartbeat_every = heartbeat_every_ticks.max(1);
    let mut tick_count: u32 = 0;

    loop {
        // Cancellation first, then ticks, so a queued tick is never lost
        // behind a closing input.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log_info!("shell cancelled");
                break;
            }
            Some(()) = ticks.recv() => {
                let before = app.phase();
                app.tick();
                tick_count = tick_count.wrapping_add(1);

                if tick_count % heartbeat_every == 0 {
                    if let Some(engine) = app.engine() {
                        log_debug!(
                            "heartbeat: {}s in current run, {}s in session",
                            engine.time_elapsed(),
                            engine.session_elapsed_secs(app.session())
                        );
                    }
                }
                if before == Phase::Activity && app.phase() == Phase::Completed {
                    writeln!(out, "{}", app.render())?;
                }
            }
            line = lines.recv() => {
                let Some(line) = line else {
                    log_info!("input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let outcome = Command::parse(&line)
                    .and_then(|command| commands::execute(app, command));
                match outcome {
                    Ok(Outcome::Output(text)) => writeln!(out, "{text}")?,
                    Ok(Outcome::Quit) => break,
                    Err(err) => writeln!(out, "error: {err:#}")?,
                }
            }
        }
        out.flush()?;
    }

    Ok(())
}
