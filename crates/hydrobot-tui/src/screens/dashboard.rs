//! Dashboard: last-known device and detection summary plus a short
//! history of status lines.

use std::collections::VecDeque;

use chrono::{DateTime, Local, Utc};
use color_eyre::eyre::Result;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table};

use hydrobot_core::{DetectionState, LinkState, PollerPhase};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::indicators::{detection_banner, switch_pill};

const HISTORY_LIMIT: usize = 50;

pub struct DashboardScreen {
    focused: bool,
    link: LinkState,
    detection: DetectionState,
    /// Newest first.
    history: VecDeque<(DateTime<Local>, String)>,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            link: LinkState::default(),
            detection: DetectionState::default(),
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    /// Record a status line if it differs from the newest entry.
    fn record(&mut self, message: &str, at: DateTime<Local>) {
        if self.history.front().is_some_and(|(_, last)| last == message) {
            return;
        }
        self.history.push_front((at, message.to_owned()));
        self.history.truncate(HISTORY_LIMIT);
    }

    fn render_device(&self, frame: &mut Frame, area: Rect) {
        let block = panel(" Dispositivo ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let device = &self.link.device;
        let lines = vec![
            field("IP", or_dash(&device.reported_ip)),
            field("Modo", or_dash(&device.mode)),
            Line::from(vec![
                Span::styled("Saídas   ", theme::key_hint()),
                switch_pill("LED", device.led_on),
                Span::raw(" "),
                switch_pill("Bomba", device.pump_on),
            ]),
            field("Último OK", clock(self.link.last_success)),
            field(
                "Sessão",
                if self.link.active { "ativa" } else { "inativa" }.to_owned(),
            ),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_detection(&self, frame: &mut Frame, area: Rect) {
        let block = panel(" Detecção ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let phase = match self.detection.phase {
            PollerPhase::Idle => "parada",
            PollerPhase::Polling => "ativa",
        };
        let lines = vec![
            detection_banner(&self.detection),
            field("Estado", phase.to_owned()),
            field("Tentativas", self.detection.attempts.to_string()),
            field("Último OK", clock(self.detection.last_success)),
            field(
                "Erro",
                self.detection
                    .last_error
                    .clone()
                    .unwrap_or_else(|| "\u{2014}".into()),
            ),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_history(&self, frame: &mut Frame, area: Rect) {
        let rows = self.history.iter().map(|(at, message)| {
            Row::new(vec![at.format("%H:%M:%S").to_string(), message.clone()])
                .style(theme::table_row())
        });
        let table = Table::new(rows, [Constraint::Length(9), Constraint::Min(10)])
            .header(Row::new(vec!["Hora", "Status"]).style(theme::table_header()))
            .block(panel(" Histórico "));
        frame.render_widget(table, area);
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default())
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<9}"), theme::key_hint()),
        Span::styled(value, Style::default().fg(theme::DIM_WHITE)),
    ])
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "\u{2014}".into()
    } else {
        value.to_owned()
    }
}

fn clock(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "\u{2014}".into(),
        |t| t.with_timezone(&Local).format("%H:%M:%S").to_string(),
    )
}

impl Component for DashboardScreen {
    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LinkUpdated(state) => {
                if state.message != self.link.message {
                    self.record(&state.message, Local::now());
                }
                self.link.clone_from(state);
            }
            Action::DetectionUpdated(state) => self.detection.clone_from(state),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [summary, history] =
            Layout::vertical([Constraint::Length(7), Constraint::Min(3)]).areas(area);
        let [device, detection] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(summary);

        self.render_device(frame, device);
        self.render_detection(frame, detection);
        self.render_history(frame, history);
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "dashboard"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_message(message: &str) -> Action {
        let mut state = LinkState::default();
        state.message = message.to_owned();
        Action::LinkUpdated(state)
    }

    #[test]
    fn history_skips_repeats() {
        let mut screen = DashboardScreen::new();
        screen.update(&with_message("OK a")).unwrap();
        screen.update(&with_message("OK a")).unwrap();
        screen.update(&with_message("Falha")).unwrap();

        let messages: Vec<_> = screen.history.iter().map(|(_, m)| m.as_str()).collect();
        assert_eq!(messages, ["Falha", "OK a"]);
    }

    #[test]
    fn history_is_bounded() {
        let mut screen = DashboardScreen::new();
        for i in 0..(HISTORY_LIMIT + 10) {
            screen.update(&with_message(&format!("line {i}"))).unwrap();
        }
        assert_eq!(screen.history.len(), HISTORY_LIMIT);
        assert_eq!(screen.history.front().unwrap().1, format!("line {}", HISTORY_LIMIT + 9));
    }

    #[test]
    fn missing_timestamp_shows_dash() {
        assert_eq!(clock(None), "\u{2014}");
        assert_eq!(or_dash(""), "\u{2014}");
        assert_eq!(or_dash("ap"), "ap");
    }
}
