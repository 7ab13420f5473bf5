//! Detection command handler.

use chrono::Local;
use tracing::{debug, warn};

use hydrobot_core::{DetectionPoller, DetectionResult, DetectionState, LinkConfig};

use crate::cli::{DetectArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

fn banner(result: &DetectionResult, color: bool) -> String {
    if result.is_fire {
        output::alert(&format!("FIRE  score {:.2}", result.score), color)
    } else {
        format!("clear score {:.2}", result.score)
    }
}

fn plain(result: &DetectionResult) -> String {
    let label = if result.is_fire { "fire" } else { "clear" };
    format!("{label} {:.2}", result.score)
}

pub async fn handle(
    config: &LinkConfig,
    args: &DetectArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(hint) = hydrobot_config::server_advisory(&config.detection_server) {
        warn!(%hint, "detection server used as entered");
    }
    let poller = DetectionPoller::new(config)?;

    match args.watch {
        None => once(&poller, global).await,
        Some(count) => watch(&poller, count, global).await,
    }
}

async fn once(poller: &DetectionPoller, global: &GlobalOpts) -> Result<(), CliError> {
    let result = poller.detect_once().await?;
    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, &result, |r| banner(r, color), plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Stream attempts until `count` have completed (0 = forever) or Ctrl-C.
/// Failed attempts are printed and polling continues.
async fn watch(poller: &DetectionPoller, count: u64, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let mut rx = poller.subscribe();
    let mut printed = 0;
    poller.enable();

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let state = rx.borrow_and_update().clone();
        if state.attempts <= printed {
            continue;
        }
        printed = state.attempts;
        output::print_output(&watch_line(&state, &global.output, color)?, global.quiet);

        if count > 0 && printed >= count {
            break;
        }
    }

    poller.disable();
    Ok(())
}

fn watch_line(state: &DetectionState, format: &OutputFormat, color: bool) -> Result<String, CliError> {
    let line = match format {
        OutputFormat::Table => {
            let time = Local::now().format("%H:%M:%S");
            match state.last_error {
                Some(ref err) => format!("[{time}] {}  ({err})", banner(&state.result, color)),
                None => format!("[{time}] {}", banner(&state.result, color)),
            }
        }
        OutputFormat::Plain => plain(&state.result),
        // One document per attempt, so scripts can read line by line.
        OutputFormat::Json | OutputFormat::JsonCompact => {
            output::render_single(&OutputFormat::JsonCompact, state, |_| String::new(), |_| String::new())?
        }
        OutputFormat::Yaml => format!(
            "---\n{}",
            output::render_single(&OutputFormat::Yaml, state, |_| String::new(), |_| String::new())?
        ),
    };
    Ok(line)
}
