//! Human-readable status line shown under the camera controls.
//!
//! Operator-facing text is Portuguese, matching the device's hotspot
//! documentation and the rest of the app.

use crate::model::{Actuator, DeviceStatus};

/// Shown before the first poll completes.
pub const PLACEHOLDER: &str = "\u{2014}";

/// Shown when `/status` fails for any reason.
pub const CONNECTION_ADVISORY: &str = "Falha ao conectar. Confira o Wi-Fi HYDROBOT-CAM e o IP.";

const SEPARATOR: &str = " \u{2022} ";

/// `OK • ip:{ip} • mode:{mode} • led:{on|off} • pump:{on|off}`
pub fn ok_line(status: &DeviceStatus) -> String {
    format!(
        "OK{SEPARATOR}ip:{}{SEPARATOR}mode:{}{SEPARATOR}led:{}{SEPARATOR}pump:{}",
        status.reported_ip,
        status.mode,
        on_off(status.led_on),
        on_off(status.pump_on),
    )
}

/// Note prepended to the status line after a successful command.
pub fn command_note(actuator: Actuator, on: bool) -> &'static str {
    match (actuator, on) {
        (Actuator::Led, true) => "LED ligado",
        (Actuator::Led, false) => "LED desligado",
        (Actuator::Pump, true) => "Bomba ligada",
        (Actuator::Pump, false) => "Bomba desligada",
    }
}

/// Replaces the status line after a failed command.
pub fn command_failure(actuator: Actuator) -> &'static str {
    match actuator {
        Actuator::Led => "Erro ao alternar LED.",
        Actuator::Pump => "Erro ao alternar bomba.",
    }
}

/// Prefix `line` with `note`, replacing a previous command note if present.
pub fn with_command_note(line: &str, note: &str) -> String {
    format!("{note}{SEPARATOR}{}", strip_command_note(line))
}

/// Remove one leading command note (`LED …` / `Bomba …`) from a line.
fn strip_command_note(line: &str) -> &str {
    if line.starts_with("LED ") || line.starts_with("Bomba ") {
        if let Some((_, rest)) = line.split_once(SEPARATOR) {
            return rest;
        }
    }
    line
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn status() -> DeviceStatus {
        DeviceStatus {
            reported_ip: "192.168.4.1".into(),
            mode: "ap".into(),
            led_on: true,
            pump_on: false,
        }
    }

    #[test]
    fn ok_line_format() {
        assert_eq!(
            ok_line(&status()),
            "OK \u{2022} ip:192.168.4.1 \u{2022} mode:ap \u{2022} led:on \u{2022} pump:off"
        );
    }

    #[test]
    fn command_note_replaces_previous_note() {
        let line = ok_line(&status());
        let once = with_command_note(&line, command_note(Actuator::Led, true));
        assert!(once.starts_with("LED ligado \u{2022} OK"));

        let twice = with_command_note(&once, command_note(Actuator::Pump, false));
        assert_eq!(twice, format!("Bomba desligada \u{2022} {line}"));
    }

    #[test]
    fn note_on_plain_message() {
        assert_eq!(
            with_command_note(PLACEHOLDER, "LED desligado"),
            "LED desligado \u{2022} \u{2014}"
        );
    }
}
