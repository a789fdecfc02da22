//! CLI configuration: thin wrapper around `venuecam_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --token, --timeout, --insecure).

use std::time::Duration;

use secrecy::SecretString;

use venuecam_core::{MonitorConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use venuecam_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for error hints.
pub fn available_profiles(config: &Config) -> String {
    let names = config.profile_names();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// Build a `MonitorConfig` from the config file, profile, and CLI overrides.
///
/// Without a matching profile, `--api-url` alone is enough; the file's
/// `[defaults]` still apply.
pub fn build_monitor_config(global: &GlobalOpts) -> Result<MonitorConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut config = match cfg.profiles.get(&profile_name) {
        Some(profile) => {
            let mut profile = profile.clone();
            if let Some(ref url) = global.api_url {
                profile.api_url.clone_from(url);
            }
            venuecam_config::profile_to_monitor_config(&profile, &profile_name, &cfg.defaults)?
        }
        None => {
            if global.profile.is_some() {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(&cfg),
                });
            }
            let url = global.api_url.as_deref().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            let profile = Profile::new(url);
            venuecam_config::profile_to_monitor_config(&profile, &profile_name, &cfg.defaults)?
        }
    };

    apply_overrides(&mut config, global);
    Ok(config)
}

fn apply_overrides(config: &mut MonitorConfig, global: &GlobalOpts) {
    if let Some(ref token) = global.token {
        config.token = Some(SecretString::from(token.clone()));
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
}
