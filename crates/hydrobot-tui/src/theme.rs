//! Palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const WATER_BLUE: Color = Color::Rgb(64, 170, 255); // #40aaff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const FLAME_ORANGE: Color = Color::Rgb(255, 140, 50); // #ff8c32
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(WATER_BLUE)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(NEON_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Active tab in the tab bar.
pub fn tab_active() -> Style {
    Style::default().fg(WATER_BLUE).add_modifier(Modifier::BOLD)
}

/// Inactive tab in the tab bar.
pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Text input that currently has the cursor.
pub fn input_active() -> Style {
    Style::default().fg(DIM_WHITE).bg(BG_HIGHLIGHT)
}

/// Banner shown when the detector reports fire.
pub fn fire_banner() -> Style {
    Style::default()
        .fg(BG_DARK)
        .bg(FLAME_ORANGE)
        .add_modifier(Modifier::BOLD)
}

/// Style for an actuator state pill.
pub fn switch_style(on: bool) -> Style {
    if on {
        Style::default().fg(SUCCESS_GREEN).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(BORDER_GRAY)
    }
}
