//! Zone command handlers. Purely local: no backend is contacted.

use venuecam_core::zone;

use crate::cli::{GlobalOpts, ZoneArgs, ZoneCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(args: ZoneArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ZoneCommand::Validate { area, input } => {
            let area = util::area(area);
            let text = util::read_input(&input)?;
            let geometry = zone::validate_text(area, &text)?;

            let out = output::render_single(
                &global.output,
                &geometry,
                |g| format!("Valid {} zone for {area}: {}", g.kind(), g.summary()),
                |_| "ok".into(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ZoneCommand::Template { area } => {
            let geometry = zone::template(util::area(area));
            let out = output::render_single(&global.output, &geometry, zone::serialize, |g| {
                serde_json::to_string(g).unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
