//! Command dispatch: bridges CLI args -> core Monitor -> output formatting.

pub mod cameras;
pub mod config_cmd;
pub mod dashboard;
pub mod util;
pub mod watch;
pub mod zone;

use venuecam_core::MonitorConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: MonitorConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Dashboard(args) => dashboard::handle(config, args, global).await,
        Command::Watch(args) => watch::handle(config, args, global).await,
        Command::Cameras(args) => cameras::handle(config, args, global).await,
        // Handled before a backend config is resolved
        Command::Zone(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
