//! Watch command: run the refresh scheduler and re-render on every publish.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use tokio_stream::StreamExt;
use tracing::debug;

use venuecam_core::{DashboardSnapshot, Monitor, MonitorConfig};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::dashboard;

/// Redraw in place only for an interactive table view; structured formats
/// append one document per publish.
fn redraw_in_place(global: &GlobalOpts) -> bool {
    matches!(global.output, OutputFormat::Table) && io::stdout().is_terminal()
}

fn draw(
    snapshot: &DashboardSnapshot,
    args: &WatchArgs,
    global: &GlobalOpts,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), CliError> {
    let out = dashboard::render(&dashboard::filtered(snapshot, args.area), now, global)?;
    if redraw_in_place(global) && !global.quiet {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "\x1b[2J\x1b[H");
        let _ = stdout.flush();
    }
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    mut config: MonitorConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(secs) = args.interval {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        config.refresh_interval = Duration::from_secs(secs);
    }

    let monitor = Monitor::new(config)?;
    monitor.start().await?;

    // Yields the snapshot from the initial fetch first, then every publish.
    let mut snapshots = monitor.subscribe().into_stream();
    let mut clock = monitor.clock();
    let mut remaining = args.count;
    let mut shown: Option<Arc<DashboardSnapshot>> = None;

    let result = loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break Ok(()),
            next = snapshots.next() => {
                let Some(snapshot) = next else { break Ok(()) };
                let now = *clock.borrow_and_update();
                if let Err(e) = draw(&snapshot, &args, global, now) {
                    break Err(e);
                }
                shown = Some(snapshot);

                if let Some(ref mut n) = remaining {
                    *n = n.saturating_sub(1);
                    if *n == 0 {
                        break Ok(());
                    }
                }
            }
            // Between publishes, the clock only refreshes an interactive view.
            Ok(()) = clock.changed() => {
                let now = *clock.borrow_and_update();
                if let Some(ref snapshot) = shown {
                    if redraw_in_place(global) {
                        if let Err(e) = draw(snapshot, &args, global, now) {
                            debug!(error = %e, "clock redraw failed");
                        }
                    }
                }
            }
        }
    };

    monitor.shutdown().await;
    result
}
