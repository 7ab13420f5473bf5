//! CLI configuration: thin wrapper around `hydrobot_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--address, --server, --timeout).

use hydrobot_core::LinkConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use hydrobot_config::{Config, config_path, load_config, save_config_to};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Apply flag overrides onto a loaded config. Flags win over file and env.
pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref address) = global.address {
        cfg.device.address.clone_from(address);
    }
    if let Some(ref server) = global.server {
        cfg.detection.server.clone_from(server);
    }
    if let Some(timeout) = global.timeout {
        cfg.polling.timeout_secs = timeout;
    }
}

/// Load the config file, apply flags and translate to a `LinkConfig`.
pub fn resolve_link_config(global: &GlobalOpts) -> Result<LinkConfig, CliError> {
    let mut cfg = load_config()?;
    apply_overrides(&mut cfg, global);
    Ok(cfg.to_link_config()?)
}
