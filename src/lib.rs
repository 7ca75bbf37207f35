pub use skylight_core::{
    APP_NAME, APP_NAME_PRETTY, Config, ConfigManager, DEFAULT_LOG_LEVEL, HOME_URL,
};

pub mod cli;
pub mod event;
pub mod icon;
pub mod menu;
pub mod notify;
#[cfg(target_os = "macos")]
pub mod tap;
pub mod tray;
pub mod window;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
