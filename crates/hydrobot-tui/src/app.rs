//! Application core: event loop, screen management, action dispatch.
//!
//! The app owns the device link and detection poller. Entering the Camera
//! tab opens a [`LinkSession`]; leaving it drops the session and disables
//! detection, so nothing polls the network while the camera is hidden.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hydrobot_config::Config;
use hydrobot_core::{Actuator, DetectionPoller, DeviceLink, LinkSession, LinkState};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Cadence, Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    /// Previous screen for GoBack.
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    link: DeviceLink,
    poller: DetectionPoller,
    /// Alive only while the Camera tab is shown.
    session: Option<LinkSession>,
    detect_on_start: bool,
    /// Last link state, for the status bar.
    link_state: LinkState,
    detection_on: bool,
    data_cancel: CancellationToken,
    notification: Option<(Notification, Instant)>,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let link_config = config.to_link_config()?;
        let link = DeviceLink::new(&link_config)?;
        let poller = DetectionPoller::new(&link_config)?;

        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens(&link, &poller, config).into_iter().collect();

        Ok(Self {
            active_screen: ScreenId::Home,
            previous_screen: None,
            screens,
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
            link,
            poller,
            session: None,
            detect_on_start: config.detection.enabled_on_start,
            link_state: LinkState::default(),
            detection_on: false,
            data_cancel: CancellationToken::new(),
            notification: None,
        })
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::enter()?;
        self.init_screens()?;

        tokio::spawn(crate::data_bridge::spawn_data_bridge(
            self.link.subscribe(),
            self.poller.subscribe(),
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        let mut events = EventReader::spawn(Cadence::default());

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(action) = self.handle_mouse_event(mouse)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::PointerCancel => {
                    self.action_tx.send(Action::CancelPointer)?;
                }
                Event::Resize(w, h) => {
                    debug!(w, h, "terminal resized");
                    self.action_tx.send(Action::Render)?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.shutdown();
        drop(events);
        info!("TUI event loop ended");
        Ok(())
    }

    fn shutdown(&mut self) {
        self.session = None;
        self.poller.disable();
        self.data_cancel.cancel();
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let (KeyModifiers::CONTROL, KeyCode::Char('c')) = (key.modifiers, key.code) {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        let typing = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.captures_input());

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }
            _ if typing => {}
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='4')) => {
                let n = c as u8 - b'0';
                if let Some(screen) = ScreenId::from_number(n) {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }
            (KeyModifiers::NONE, KeyCode::Esc) => return Ok(Some(Action::GoBack)),
            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_mouse_event(mouse);
        }
        Ok(None)
    }

    /// Process a single action: update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    let from = self.active_screen;
                    self.previous_screen = Some(from);
                    self.active_screen = *target;
                    self.on_screen_change(from, *target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Render => {}

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
                self.broadcast(action)?;
            }

            // Published state goes to every screen so the dashboard keeps
            // its history while the camera is in front.
            Action::LinkUpdated(state) => {
                self.link_state.clone_from(state);
                self.broadcast(action)?;
            }
            Action::DetectionUpdated(state) => {
                self.detection_on = state.is_polling();
                self.broadcast(action)?;
            }

            Action::CommitAddress(address) => {
                self.link.set_address(address);
                info!(%address, "device address changed");
                self.forward(action)?;
            }

            Action::PollNow => {
                let link = self.link.clone();
                tokio::spawn(async move {
                    let _ = link.poll_status().await;
                });
            }

            Action::ToggleActuator(actuator) => self.spawn_toggle(*actuator),

            Action::ProbeStream => self.spawn_probe(),

            Action::ToggleDetection => {
                let on = self.poller.toggle();
                let msg = if on {
                    "Detecção ligada"
                } else {
                    "Detecção desligada"
                };
                self.action_tx.send(Action::Notify(Notification::info(msg)))?;
            }

            Action::CommitServer(server) => {
                self.poller.set_server(server);
                let notification = match hydrobot_config::server_advisory(server) {
                    None => Notification::success(format!("Servidor: {}", self.poller.server())),
                    Some(hint) => {
                        warn!(%hint, "detection server applied as entered");
                        Notification::info(format!("Servidor: {} ({hint})", self.poller.server()))
                    }
                };
                self.action_tx.send(Action::Notify(notification))?;
            }

            Action::SaveSettings { address, server } => {
                let notification = self.save_settings(address, server);
                self.action_tx.send(Action::Notify(notification))?;
            }

            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
            }

            Action::StreamProbed(_) | Action::CancelPointer => self.forward(action)?,
        }

        Ok(())
    }

    /// Camera lifecycle: polling runs only while the Camera tab is active.
    fn on_screen_change(&mut self, from: ScreenId, to: ScreenId) {
        if from == ScreenId::Camera {
            self.session = None;
            self.poller.disable();
            info!("camera inactive, polling stopped");
        }
        if to == ScreenId::Camera {
            self.session = Some(self.link.activate());
            if self.detect_on_start {
                self.poller.enable();
            }
            info!(address = %self.link.address(), "camera active, polling started");
        }
    }

    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    /// Send to the active screen only.
    fn forward(&mut self, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    // ── Background work ───────────────────────────────────────────

    fn spawn_toggle(&self, actuator: Actuator) {
        let link = self.link.clone();
        tokio::spawn(async move {
            // The status line already reports the failure.
            if let Err(e) = link.toggle(actuator).await {
                warn!(error = %e, %actuator, "toggle failed");
            }
        });
    }

    fn spawn_probe(&self) {
        let link = self.link.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = match link.probe_stream().await {
                Ok(probe) if probe.is_multipart() => {
                    Ok(probe.content_type.unwrap_or_default())
                }
                Ok(probe) => Err(format!(
                    "não é um stream MJPEG ({})",
                    probe.content_type.as_deref().unwrap_or("sem content-type")
                )),
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(Action::StreamProbed(result));
        });
    }

    /// Persist address and server, then apply them to the live link.
    fn save_settings(&self, address: &str, server: &str) -> Notification {
        let mut cfg = hydrobot_config::load_config_or_default();
        let validated = cfg
            .set("device.address", address)
            .and_then(|()| cfg.set("detection.server", server))
            .and_then(|()| cfg.to_link_config());
        if let Err(e) = validated {
            return Notification::error(e.to_string());
        }

        match hydrobot_config::save_config(&cfg) {
            Ok(path) => {
                self.link.set_address(&cfg.device.address);
                self.poller.set_server(&cfg.detection.server);
                info!(path = %path.display(), "settings saved");
                Notification::success("Ajustes salvos")
            }
            Err(e) => {
                warn!(error = %e, "failed to save settings");
                Notification::error(e.to_string())
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let [content_area, tab_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content_area);
        }

        self.render_tab_bar(frame, tab_area);
        self.render_status_bar(frame, status_area);

        if let Some((ref notification, _)) = self.notification {
            render_notification(frame, area, notification);
        }

        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {} {} ", id.number(), id.label()), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let link = match (self.link_state.active, &self.link_state) {
            (false, _) => Span::styled("○ inativo", Style::default().fg(theme::BORDER_GRAY)),
            (true, s) if s.checking => {
                Span::styled("◐ verificando", Style::default().fg(theme::ELECTRIC_YELLOW))
            }
            (true, s) if s.message.starts_with("OK") => {
                Span::styled("● online", Style::default().fg(theme::SUCCESS_GREEN))
            }
            (true, _) => Span::styled("✗ offline", Style::default().fg(theme::ERROR_RED)),
        };
        let detection = if self.detection_on {
            Span::styled("  ● detecção", Style::default().fg(theme::FLAME_ORANGE))
        } else {
            Span::styled("  ○ detecção", theme::key_hint())
        };

        let line = Line::from(vec![
            Span::raw(" "),
            link,
            detection,
            Span::styled(" │ ? ajuda  q sair", theme::key_hint()),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height.min(area.height));

    let (border_color, icon) = match notif.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme::BG_DARK));

    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_width = 52u16.min(area.width.saturating_sub(4));
    let help_height = 18u16.min(area.height.saturating_sub(4));
    let x = area.width.saturating_sub(help_width) / 2;
    let y = area.height.saturating_sub(help_height) / 2;
    let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    let block = Block::default()
        .title(" Atalhos ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let entry = |key: &'static str, label: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(label, theme::key_hint()),
        ])
    };
    let section = |title: &'static str| {
        Line::from(Span::styled(format!("  {title}"), Style::default().fg(theme::NEON_CYAN)))
    };

    let help_text = vec![
        section("Navegação"),
        entry("1-4", "Ir para a aba"),
        entry("Tab", "Próxima aba"),
        entry("Esc", "Voltar"),
        Line::from(""),
        section("Câmera"),
        entry("a / s", "Editar IP / servidor"),
        entry("t", "Testar conexão"),
        entry("l / p", "Alternar LED / bomba"),
        entry("r", "Testar stream"),
        entry("d", "Ligar/desligar detecção"),
        entry("mouse", "Arrastar o joystick"),
        Line::from(""),
        entry("q", "Sair"),
        Line::from(""),
        Line::from(Span::styled("           Esc ou ? para fechar", theme::key_hint())),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}
