//! Camera screen: address bar, device status, actuator toggles, stream
//! URL, detection banner and the joystick.
//!
//! Activation and deactivation of the device link are driven by the app
//! when this tab gains or loses focus. The screen itself only renders
//! published state and turns keys into actions.

use std::cell::Cell;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tui_input::Input;

use hydrobot_core::{
    Actuator, DetectionPoller, DetectionState, DeviceLink, JoystickTracker, LinkState,
};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::indicators::{detection_banner, switch_pill};
use crate::widgets::joystick::{DragScale, Joystick, pad_area};
use crate::widgets::text_field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Address,
    Server,
}

pub struct CameraScreen {
    focused: bool,
    link: DeviceLink,
    poller: DetectionPoller,
    editing: Option<Field>,
    address: Input,
    server: Input,
    state: LinkState,
    detection: DetectionState,
    probe: Option<Result<String, String>>,
    tracker: JoystickTracker,
    drag_origin: Option<(u16, u16)>,
    throbber_state: ThrobberState,
    joystick_area: Cell<Rect>,
}

impl CameraScreen {
    pub fn new(link: DeviceLink, poller: DetectionPoller, radius: f64) -> Self {
        let address = Input::new(link.address());
        let server = Input::new(poller.server());
        Self {
            focused: false,
            link,
            poller,
            editing: None,
            address,
            server,
            state: LinkState::default(),
            detection: DetectionState::default(),
            probe: None,
            tracker: JoystickTracker::new(radius),
            drag_origin: None,
            throbber_state: ThrobberState::default(),
            joystick_area: Cell::new(Rect::default()),
        }
    }

    fn input_mut(&mut self, field: Field) -> &mut Input {
        match field {
            Field::Address => &mut self.address,
            Field::Server => &mut self.server,
        }
    }

    fn handle_edit_key(&mut self, field: Field, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                self.editing = None;
                let value = self.input_mut(field).value().trim().to_owned();
                Some(match field {
                    Field::Address => Action::CommitAddress(value),
                    Field::Server => Action::CommitServer(value),
                })
            }
            KeyCode::Esc => {
                self.editing = None;
                self.revert(field);
                None
            }
            _ => {
                text_field::apply_key(self.input_mut(field), key);
                None
            }
        }
    }

    /// Drop uncommitted edits, restoring the value currently in effect.
    fn revert(&mut self, field: Field) {
        match field {
            Field::Address => self.address = Input::new(self.link.address()),
            Field::Server => self.server = Input::new(self.poller.server()),
        }
    }

    fn release_joystick(&mut self) {
        self.drag_origin = None;
        self.tracker.terminate();
    }

    // ── Rendering ────────────────────────────────────────────────

    fn render_top_bar(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.editing == Some(Field::Address) {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [field_area, pills_area] =
            Layout::horizontal([Constraint::Min(20), Constraint::Length(24)]).areas(inner);

        text_field::render_field(
            frame,
            field_area,
            "ESP IP:",
            &self.address,
            self.editing == Some(Field::Address),
        );

        let pills = Line::from(vec![
            switch_pill("LED", self.state.led_on()),
            Span::raw(" "),
            switch_pill("Bomba", self.state.pump_on()),
        ]);
        frame.render_widget(Paragraph::new(pills), pills_area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.state.checking {
            let throbber = Throbber::default()
                .label(self.state.message.clone())
                .style(Style::default().fg(theme::DIM_WHITE))
                .throbber_style(Style::default().fg(theme::WATER_BLUE));
            frame.render_stateful_widget(throbber, area, &mut self.throbber_state.clone());
        } else {
            let color = if self.state.message.starts_with("OK") {
                theme::SUCCESS_GREEN
            } else {
                theme::DIM_WHITE
            };
            frame.render_widget(
                Paragraph::new(Span::styled(self.state.message.as_str(), Style::default().fg(color)))
                    .wrap(Wrap { trim: true }),
                area,
            );
        }
    }

    fn render_stream(&self, frame: &mut Frame, area: Rect) {
        let block = panel(" Stream ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let probe = match self.probe {
            None => Span::styled("r  testar stream", theme::key_hint()),
            Some(Ok(ref content_type)) => Span::styled(
                format!("✓ {content_type}"),
                Style::default().fg(theme::SUCCESS_GREEN),
            ),
            Some(Err(ref reason)) => {
                Span::styled(format!("✗ {reason}"), Style::default().fg(theme::ERROR_RED))
            }
        };

        let lines = vec![
            Line::from(Span::styled(
                self.link.stream_url(),
                Style::default().fg(theme::NEON_CYAN),
            )),
            Line::from(probe),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_detection(&self, frame: &mut Frame, area: Rect) {
        let block = panel(" Detecção ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [banner_area, server_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);
        frame.render_widget(Paragraph::new(detection_banner(&self.detection)), banner_area);
        text_field::render_field(
            frame,
            server_area,
            "Servidor:",
            &self.server,
            self.editing == Some(Field::Server),
        );
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let pairs: &[(&str, &str)] = if self.editing.is_some() {
            &[("Enter", "aplicar"), ("Esc", "cancelar")]
        } else {
            &[
                ("a", "IP"),
                ("t", "testar"),
                ("l", "LED"),
                ("p", "bomba"),
                ("r", "stream"),
                ("d", "detecção"),
                ("s", "servidor"),
            ]
        };
        let spans: Vec<Span> = pairs
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(format!(" {key} "), theme::key_hint_key()),
                    Span::styled(format!("{label} "), theme::key_hint()),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
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

impl Component for CameraScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(field) = self.editing {
            return Ok(self.handle_edit_key(field, key));
        }

        let action = match key.code {
            KeyCode::Char('a') => {
                self.editing = Some(Field::Address);
                None
            }
            KeyCode::Char('s') => {
                self.editing = Some(Field::Server);
                None
            }
            KeyCode::Char('t') => Some(Action::PollNow),
            KeyCode::Char('l') => Some(Action::ToggleActuator(Actuator::Led)),
            KeyCode::Char('p') => Some(Action::ToggleActuator(Actuator::Pump)),
            KeyCode::Char('r') => {
                self.probe = None;
                Some(Action::ProbeStream)
            }
            KeyCode::Char('d') => Some(Action::ToggleDetection),
            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let area = self.joystick_area.get();
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left)
                if area.contains(Position::new(mouse.column, mouse.row)) =>
            {
                self.drag_origin = Some((mouse.column, mouse.row));
                self.tracker.begin();
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((col, row)) = self.drag_origin {
                    let scale = DragScale::new(pad_area(area), self.tracker.radius());
                    let (dx, dy) = scale.to_units(
                        i32::from(mouse.column) - i32::from(col),
                        i32::from(mouse.row) - i32::from(row),
                    );
                    self.tracker.update(dx, dy);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.drag_origin.take().is_some() {
                    self.tracker.release();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LinkUpdated(state) => self.state.clone_from(state),
            Action::DetectionUpdated(state) => self.detection.clone_from(state),
            Action::StreamProbed(result) => self.probe = Some(result.clone()),
            Action::CommitAddress(_) => self.probe = None,
            Action::CancelPointer => self.release_joystick(),
            Action::Tick => {
                if self.state.checking {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [top, status, body, hints] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .areas(area);

        let [left, joystick] =
            Layout::horizontal([Constraint::Min(30), Constraint::Length(34)]).areas(body);
        let [stream, detection, _] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .areas(left);

        self.render_top_bar(frame, top);
        self.render_status(frame, status);
        self.render_stream(frame, stream);
        self.render_detection(frame, detection);
        self.render_hints(frame, hints);

        self.joystick_area.set(joystick);
        frame.render_widget(
            Joystick::new(&self.tracker).focused(self.focused),
            joystick,
        );
    }

    fn captures_input(&self) -> bool {
        self.editing.is_some()
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused {
            // Settings may have changed both values while away.
            self.revert(Field::Address);
            self.revert(Field::Server);
        } else {
            if let Some(field) = self.editing.take() {
                self.revert(field);
            }
            self.release_joystick();
        }
    }

    fn id(&self) -> &'static str {
        "camera"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use hydrobot_core::LinkConfig;
    use pretty_assertions::assert_eq;

    fn screen() -> CameraScreen {
        let config = LinkConfig::default();
        let link = DeviceLink::new(&config).unwrap();
        let poller = DetectionPoller::new(&config).unwrap();
        let mut screen = CameraScreen::new(link, poller, 64.0);
        screen.joystick_area.set(Rect::new(50, 5, 34, 14));
        screen
    }

    fn press(screen: &mut CameraScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn control_keys_map_to_actions() {
        let mut s = screen();
        assert!(matches!(press(&mut s, KeyCode::Char('l')), Some(Action::ToggleActuator(Actuator::Led))));
        assert!(matches!(press(&mut s, KeyCode::Char('p')), Some(Action::ToggleActuator(Actuator::Pump))));
        assert!(matches!(press(&mut s, KeyCode::Char('t')), Some(Action::PollNow)));
        assert!(matches!(press(&mut s, KeyCode::Char('d')), Some(Action::ToggleDetection)));
        assert!(matches!(press(&mut s, KeyCode::Char('r')), Some(Action::ProbeStream)));
    }

    #[test]
    fn editing_address_commits_trimmed_text() {
        let mut s = screen();
        assert!(press(&mut s, KeyCode::Char('a')).is_none());
        assert!(s.captures_input());

        // Letters are typed, not treated as shortcuts.
        assert!(press(&mut s, KeyCode::Char('l')).is_none());
        for _ in 0..12 {
            press(&mut s, KeyCode::Backspace);
        }
        for c in "10.0.0.9 ".chars() {
            press(&mut s, KeyCode::Char(c));
        }

        match press(&mut s, KeyCode::Enter) {
            Some(Action::CommitAddress(address)) => assert_eq!(address, "10.0.0.9"),
            other => panic!("expected CommitAddress, got {other:?}"),
        }
        assert!(!s.captures_input());
    }

    #[test]
    fn escape_reverts_uncommitted_address() {
        let mut s = screen();
        press(&mut s, KeyCode::Char('a'));
        press(&mut s, KeyCode::Char('9'));
        assert!(press(&mut s, KeyCode::Esc).is_none());
        assert_eq!(s.address.value(), "192.168.4.1");
    }

    #[test]
    fn escape_reverts_uncommitted_server() {
        let mut s = screen();
        press(&mut s, KeyCode::Char('s'));
        press(&mut s, KeyCode::Char('9'));
        assert_eq!(s.server.value(), "http://192.168.4.2:80009");
        assert!(press(&mut s, KeyCode::Esc).is_none());
        assert_eq!(s.server.value(), "http://192.168.4.2:8000");
    }

    #[test]
    fn server_edit_reverts_to_value_in_effect() {
        let mut s = screen();
        s.poller.set_server("http://10.0.0.3:8000/");
        press(&mut s, KeyCode::Char('s'));
        press(&mut s, KeyCode::Char('x'));
        press(&mut s, KeyCode::Esc);
        assert_eq!(s.server.value(), "http://10.0.0.3:8000");
    }

    #[test]
    fn committed_server_is_sent_as_entered() {
        let mut s = screen();
        press(&mut s, KeyCode::Char('s'));
        for _ in 0..30 {
            press(&mut s, KeyCode::Backspace);
        }
        for c in "192.168.4.2:8000".chars() {
            press(&mut s, KeyCode::Char(c));
        }
        match press(&mut s, KeyCode::Enter) {
            Some(Action::CommitServer(server)) => assert_eq!(server, "192.168.4.2:8000"),
            other => panic!("expected CommitServer, got {other:?}"),
        }
    }

    #[test]
    fn drag_inside_joystick_moves_and_release_recenters() {
        let mut s = screen();
        s.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 67, 11))
            .unwrap();
        assert!(s.tracker.is_dragging());

        s.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), 67, 0))
            .unwrap();
        let v = s.tracker.vector();
        assert!((v.y - 1.0).abs() < 1e-9, "{v:?}");

        s.handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), 67, 0))
            .unwrap();
        assert!(s.tracker.vector().is_centered());
        assert!(!s.tracker.is_dragging());
    }

    #[test]
    fn pointer_cancel_recenters_a_held_joystick() {
        let mut s = screen();
        s.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 67, 11))
            .unwrap();
        s.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), 80, 11))
            .unwrap();
        assert!(!s.tracker.vector().is_centered());

        s.update(&Action::CancelPointer).unwrap();
        assert!(s.tracker.vector().is_centered());
        assert!(!s.tracker.is_dragging());

        // A late release from the cancelled gesture changes nothing.
        s.handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), 80, 11))
            .unwrap();
        assert!(s.tracker.vector().is_centered());
    }

    #[test]
    fn press_outside_joystick_is_ignored() {
        let mut s = screen();
        s.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 2, 2))
            .unwrap();
        s.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), 20, 2))
            .unwrap();
        assert!(!s.tracker.is_dragging());
        assert!(s.tracker.vector().is_centered());
    }

    #[test]
    fn losing_focus_cancels_drag_and_edit() {
        let mut s = screen();
        s.set_focused(true);
        s.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 67, 11))
            .unwrap();
        s.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), 80, 11))
            .unwrap();
        press(&mut s, KeyCode::Char('s'));

        s.set_focused(false);
        assert!(s.tracker.vector().is_centered());
        assert!(!s.captures_input());
    }

    #[test]
    fn probe_result_is_kept_until_address_changes() {
        let mut s = screen();
        s.update(&Action::StreamProbed(Ok("multipart/x-mixed-replace".into())))
            .unwrap();
        assert!(s.probe.is_some());
        s.update(&Action::CommitAddress("10.0.0.2".into())).unwrap();
        assert!(s.probe.is_none());
    }
}
