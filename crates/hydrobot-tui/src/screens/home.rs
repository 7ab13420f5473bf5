//! Home screen: title and a shortcut into the camera.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::action::Action;
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;

pub struct HomeScreen {
    focused: bool,
}

impl HomeScreen {
    pub fn new() -> Self {
        Self { focused: false }
    }
}

impl Component for HomeScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Enter => Ok(Some(Action::SwitchScreen(ScreenId::Camera))),
            _ => Ok(None),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [_, body, _] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .areas(area);

        let lines = vec![
            Line::from(Span::styled(
                "HydroBot",
                Style::default()
                    .fg(theme::WATER_BLUE)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Conecte-se ao Wi-Fi HYDROBOT-CAM para controlar a câmera e a bomba.",
                Style::default().fg(theme::DIM_WHITE),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Enter", theme::key_hint_key()),
                Span::styled("  ir para Câmera", theme::key_hint()),
            ]),
        ];

        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), body);
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "home"
    }
}
