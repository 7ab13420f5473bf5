//! Screen implementations. Each screen is a top-level Component.

pub mod camera;
pub mod dashboard;
pub mod home;
pub mod settings;

use hydrobot_config::Config;
use hydrobot_core::{DetectionPoller, DeviceLink};

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components for the tab bar.
pub fn create_screens(
    link: &DeviceLink,
    poller: &DetectionPoller,
    config: &Config,
) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Home, Box::new(home::HomeScreen::new())),
        (
            ScreenId::Camera,
            Box::new(camera::CameraScreen::new(
                link.clone(),
                poller.clone(),
                config.joystick.radius,
            )),
        ),
        (ScreenId::Dashboard, Box::new(dashboard::DashboardScreen::new())),
        (ScreenId::Settings, Box::new(settings::SettingsScreen::new(config))),
    ]
}
