//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Serialize, Tabled)]
struct EntryRow {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn entry_rows(cfg: &Config) -> Vec<EntryRow> {
    cfg.entries()
        .into_iter()
        .map(|(key, value)| EntryRow { key, value })
        .collect()
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let mut cfg = config::load_config()?;
            config::apply_overrides(&mut cfg, global);

            let out = match global.output {
                // Structured formats get the real document shape.
                OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
                    output::render_single(&global.output, &cfg, |_| String::new(), |_| String::new())?
                }
                OutputFormat::Table | OutputFormat::Plain => output::render_list(
                    &global.output,
                    &entry_rows(&cfg),
                    |r| EntryRow {
                        key: r.key,
                        value: r.value.clone(),
                    },
                    |r| format!("{}={}", r.key, r.value),
                )?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let mut cfg = Config::default();
            config::apply_overrides(&mut cfg, global);
            cfg.to_link_config()?;
            config::save_config_to(&cfg, &path)?;

            if !global.quiet {
                eprintln!("Config written to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let path = config::config_path();
            let mut cfg = config::load_config()?;
            cfg.set(&key, &value)?;
            // Refuse to persist something the front-ends would reject.
            cfg.to_link_config()?;
            config::save_config_to(&cfg, &path)?;

            if !global.quiet {
                eprintln!("{key} = {}", value.trim());
            }
            Ok(())
        }
    }
}
