//! Single-line text field on top of `tui-input`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use tui_input::{Input, InputRequest};

use crate::theme;

/// Translate a key press into an edit request. `None` for keys the field
/// doesn't consume (Enter, Esc, Tab, arrows up/down).
pub fn request_for(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => Some(InputRequest::DeleteLine),
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char('a') if ctrl => Some(InputRequest::GoToStart),
        KeyCode::Char('e') if ctrl => Some(InputRequest::GoToEnd),
        KeyCode::Char(c) if !ctrl => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

/// Apply a key to `input`. Returns whether the key was consumed.
pub fn apply_key(input: &mut Input, key: KeyEvent) -> bool {
    match request_for(key) {
        Some(request) => {
            let _ = input.handle(request);
            true
        }
        None => false,
    }
}

/// `label [value]` on one row. Places the terminal cursor when `active`.
pub fn render_field(frame: &mut Frame, area: Rect, label: &str, input: &Input, active: bool) {
    let label_width = u16::try_from(label.chars().count() + 1).unwrap_or(u16::MAX);
    let [label_area, value_area] =
        Layout::horizontal([Constraint::Length(label_width), Constraint::Min(1)]).areas(area);

    frame.render_widget(
        Paragraph::new(Span::styled(label, Style::default().fg(theme::NEON_CYAN))),
        label_area,
    );

    let width = usize::from(value_area.width.max(1));
    let scroll = input.visual_scroll(width.saturating_sub(1));
    let style = if active {
        theme::input_active()
    } else {
        Style::default().fg(theme::DIM_WHITE)
    };
    frame.render_widget(
        Paragraph::new(input.value())
            .style(style)
            .scroll((0, u16::try_from(scroll).unwrap_or(0))),
        value_area,
    );

    if active {
        let offset = input.visual_cursor().saturating_sub(scroll);
        let x = value_area
            .x
            .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX));
        frame.set_cursor_position(Position::new(x, value_area.y));
    }
}
