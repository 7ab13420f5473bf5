//! Small inline indicators: actuator pills and the detection banner.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use hydrobot_core::{DetectionState, PollerPhase};

use crate::theme;

/// ` LED ON ` / ` Bomba OFF ` pill.
pub fn switch_pill(label: &str, on: bool) -> Span<'static> {
    let state = if on { "ON" } else { "OFF" };
    Span::styled(format!(" {label} {state} "), theme::switch_style(on))
}

/// One-line detection banner.
pub fn detection_banner(state: &DetectionState) -> Line<'static> {
    if state.phase == PollerPhase::Idle {
        return Line::from(Span::styled("Detecção desligada", theme::key_hint()));
    }

    let score = state.result.score;
    let mut spans = if state.result.is_fire {
        vec![Span::styled(
            format!(" FOGO DETECTADO  score {score:.2} "),
            theme::fire_banner(),
        )]
    } else {
        vec![Span::styled(
            format!("Sem fogo  score {score:.2}"),
            Style::default().fg(theme::SUCCESS_GREEN),
        )]
    };

    if let Some(ref err) = state.last_error {
        spans.push(Span::styled(
            format!("  ({err})"),
            Style::default().fg(theme::ERROR_RED),
        ));
    }
    Line::from(spans)
}
