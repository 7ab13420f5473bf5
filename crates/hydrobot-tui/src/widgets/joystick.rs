//! On-screen joystick: base ring, knob, and the live vector readout.
//!
//! The widget only draws what a [`JoystickTracker`] holds. Screens feed
//! mouse drags through [`DragScale`] so that a drag to the edge of the
//! ring is a full deflection regardless of terminal size.

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Widget};

use hydrobot_core::{JoystickTracker, JoystickVector};

use crate::theme;

/// Knob size relative to the base ring.
const KNOB_RATIO: f64 = 22.0 / 64.0;

/// Empty space around the ring, as a fraction of the radius.
const MARGIN: f64 = 1.15;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;

pub struct Joystick<'a> {
    tracker: &'a JoystickTracker,
    focused: bool,
}

impl<'a> Joystick<'a> {
    pub fn new(tracker: &'a JoystickTracker) -> Self {
        Self {
            tracker,
            focused: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for Joystick<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.tracker.is_dragging() || self.focused {
            theme::border_focused()
        } else {
            theme::border_default()
        };
        let block = Block::default()
            .title(" Joystick ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border);
        let inner = block.inner(area);
        block.render(area, buf);

        let [pad, readout] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        let radius = self.tracker.radius();
        let (x_half, y_half) = half_extents(pad, radius);
        let (knob_x, knob_y) = self.tracker.vector().knob_offset(radius);
        let knob_color = if self.tracker.is_dragging() {
            theme::NEON_CYAN
        } else {
            theme::DIM_WHITE
        };

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-x_half, x_half])
            .y_bounds([-y_half, y_half])
            .paint(move |ctx| {
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius,
                    color: theme::WATER_BLUE,
                });
                // Canvas y grows upward; knob offsets are screen space.
                ctx.draw(&Circle {
                    x: knob_x,
                    y: -knob_y,
                    radius: radius * KNOB_RATIO,
                    color: knob_color,
                });
            })
            .render(pad, buf);

        Paragraph::new(readout_label(self.tracker.vector()))
            .style(Style::default().fg(theme::DIM_WHITE))
            .alignment(Alignment::Center)
            .render(readout, buf);
    }
}

/// `x: 0.25   y: -1.00`, two decimals, never `-0.00` for a centered axis.
pub fn readout_label(vector: JoystickVector) -> String {
    format!("x: {:.2}   y: {:.2}", vector.x + 0.0, vector.y + 0.0)
}

/// The drawing area inside a joystick panel of the given outer size.
pub fn pad_area(area: Rect) -> Rect {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let [pad, _] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
    pad
}

/// Canvas half-extents in joystick units, keeping the ring round.
fn half_extents(pad: Rect, radius: f64) -> (f64, f64) {
    let width = f64::from(pad.width.max(1));
    let height = f64::from(pad.height.max(1)) * CELL_ASPECT;
    if width >= height {
        let y_half = radius * MARGIN;
        (y_half * width / height, y_half)
    } else {
        let x_half = radius * MARGIN;
        (x_half, x_half * height / width)
    }
}

/// Converts cell displacement into joystick units for a given pad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragScale {
    per_col: f64,
    per_row: f64,
}

impl DragScale {
    pub fn new(pad: Rect, radius: f64) -> Self {
        let (x_half, y_half) = half_extents(pad, radius);
        Self {
            per_col: 2.0 * x_half / f64::from(pad.width.max(1)),
            per_row: 2.0 * y_half / f64::from(pad.height.max(1)),
        }
    }

    /// Displacement in screen orientation (down is positive).
    pub fn to_units(self, cols: i32, rows: i32) -> (f64, f64) {
        (f64::from(cols) * self.per_col, f64::from(rows) * self.per_row)
    }
}
