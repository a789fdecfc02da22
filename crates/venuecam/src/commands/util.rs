//! Shared helpers for command handlers.

use std::io::Read;
use std::path::Path;

use venuecam_core::AreaType;

use crate::cli::AreaArg;
use crate::error::CliError;

pub fn area(arg: AreaArg) -> AreaType {
    match arg {
        AreaArg::Entrance => AreaType::Entrance,
        AreaArg::Dining => AreaType::Dining,
        AreaArg::Cashier => AreaType::Cashier,
        AreaArg::Kitchen => AreaType::Kitchen,
    }
}

/// Whether `candidate` passes an optional `--area` filter.
pub fn area_matches(filter: Option<AreaArg>, candidate: AreaType) -> bool {
    filter.is_none_or(|a| area(a) == candidate)
}

/// Inline text, or stdin when `input` is `-`.
pub fn read_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(input.to_owned())
    }
}

/// Read a text file for `--*-file` flags.
pub fn read_text_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::Validation {
        field: "file".into(),
        reason: format!("cannot read {}: {e}", path.display()),
    })
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
