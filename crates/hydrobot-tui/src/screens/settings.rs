//! Settings screen: edit the persisted device address and detection
//! server. Enter saves to the config file and applies to the live link.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tui_input::Input;

use hydrobot_config::Config;

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::text_field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsField {
    Address,
    Server,
}

impl SettingsField {
    fn toggle(self) -> Self {
        match self {
            Self::Address => Self::Server,
            Self::Server => Self::Address,
        }
    }
}

pub struct SettingsScreen {
    focused: bool,
    active_field: SettingsField,
    address: Input,
    server: Input,
    /// Read-only view of the remaining keys.
    entries: Vec<(&'static str, String)>,
    config_path: String,
}

impl SettingsScreen {
    pub fn new(config: &Config) -> Self {
        Self {
            focused: false,
            active_field: SettingsField::Address,
            address: Input::new(config.device.address.clone()),
            server: Input::new(config.detection.server.clone()),
            entries: config
                .entries()
                .into_iter()
                .filter(|(key, _)| !matches!(*key, "device.address" | "detection.server"))
                .collect(),
            config_path: hydrobot_config::config_path().display().to_string(),
        }
    }

    fn active_input(&mut self) -> &mut Input {
        match self.active_field {
            SettingsField::Address => &mut self.address,
            SettingsField::Server => &mut self.server,
        }
    }
}

impl Component for SettingsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Enter => Some(Action::SaveSettings {
                address: self.address.value().trim().to_owned(),
                server: self.server.value().trim().to_owned(),
            }),
            KeyCode::Esc => Some(Action::GoBack),
            KeyCode::Up | KeyCode::Down => {
                self.active_field = self.active_field.toggle();
                None
            }
            _ => {
                text_field::apply_key(self.active_input(), key);
                None
            }
        };
        Ok(action)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Ajustes ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [address, server, _, rest, hints] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        text_field::render_field(
            frame,
            address,
            "Endereço do dispositivo: ",
            &self.address,
            self.focused && self.active_field == SettingsField::Address,
        );
        text_field::render_field(
            frame,
            server,
            "Servidor de detecção:    ",
            &self.server,
            self.focused && self.active_field == SettingsField::Server,
        );

        let mut lines: Vec<Line> = self
            .entries
            .iter()
            .map(|(key, value)| {
                Line::from(vec![
                    Span::styled(format!("{key:<30}"), theme::key_hint()),
                    Span::styled(value.as_str(), Style::default().fg(theme::DIM_WHITE)),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Arquivo: {}", self.config_path),
            theme::key_hint(),
        )));
        frame.render_widget(Paragraph::new(lines), rest);

        let hint = Line::from(vec![
            Span::styled(" ↑/↓ ", theme::key_hint_key()),
            Span::styled("campo ", theme::key_hint()),
            Span::styled(" Enter ", theme::key_hint_key()),
            Span::styled("salvar ", theme::key_hint()),
            Span::styled(" Esc ", theme::key_hint_key()),
            Span::styled("voltar", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hint), hints);
    }

    /// The whole form is a text entry.
    fn captures_input(&self) -> bool {
        true
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "settings"
    }
}
