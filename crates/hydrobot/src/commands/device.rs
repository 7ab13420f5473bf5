//! Device command handlers: status, led, pump, stream.

use serde::Serialize;

use hydrobot_core::status_line;
use hydrobot_core::{Actuator, DeviceLink, DeviceStatus, LinkConfig, StreamProbe};

use crate::cli::{GlobalOpts, StreamArgs, SwitchState};
use crate::error::CliError;
use crate::output;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusView {
    address: String,
    #[serde(flatten)]
    status: DeviceStatus,
    line: String,
}

#[derive(Serialize)]
struct SwitchView {
    actuator: &'static str,
    on: bool,
    note: &'static str,
}

#[derive(Serialize)]
struct StreamView {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    probe: Option<StreamProbe>,
}

fn status_detail(view: &StatusView, color: bool) -> String {
    [
        format!("Address: {}", view.address),
        format!("IP:      {}", view.status.reported_ip),
        format!("Mode:    {}", view.status.mode),
        format!("LED:     {}", output::on_off(view.status.led_on, color)),
        format!("Pump:    {}", output::on_off(view.status.pump_on, color)),
    ]
    .join("\n")
}

fn stream_detail(view: &StreamView) -> String {
    let Some(ref probe) = view.probe else {
        return view.url.clone();
    };
    [
        format!("URL:          {}", view.url),
        format!("HTTP status:  {}", probe.status),
        format!(
            "Content-Type: {}",
            probe.content_type.as_deref().unwrap_or("-")
        ),
    ]
    .join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn status(config: &LinkConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let link = DeviceLink::new(config)?;
    let status = link.poll_status().await?;

    let view = StatusView {
        address: link.address(),
        line: status_line::ok_line(&status),
        status,
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| status_detail(v, color),
        |v| v.line.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn switch(
    config: &LinkConfig,
    actuator: Actuator,
    state: SwitchState,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let link = DeviceLink::new(config)?;

    let on = match state {
        SwitchState::On => true,
        SwitchState::Off => false,
        SwitchState::Toggle => {
            // Last-known state comes from the device, not from a previous run.
            link.poll_status().await?;
            !actuator.is_on(&link.state().device)
        }
    };
    link.command(actuator, on).await?;

    let view = SwitchView {
        actuator: match actuator {
            Actuator::Led => "led",
            Actuator::Pump => "pump",
        },
        on,
        note: status_line::command_note(actuator, on),
    };
    let out = output::render_single(
        &global.output,
        &view,
        |v| v.note.to_owned(),
        |v| if v.on { "on".into() } else { "off".into() },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn stream(
    config: &LinkConfig,
    args: &StreamArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let link = DeviceLink::new(config)?;
    let url = link.stream_url();

    let probe = if args.probe {
        let probe = link.probe_stream().await?;
        if !probe.is_multipart() {
            return Err(CliError::InvalidResponse {
                message: format!(
                    "{} is reachable but not an MJPEG stream (Content-Type: {})",
                    probe.url,
                    probe.content_type.as_deref().unwrap_or("none")
                ),
            });
        }
        Some(probe)
    } else {
        None
    };

    let view = StreamView { url, probe };
    let out = output::render_single(&global.output, &view, stream_detail, |v| v.url.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
