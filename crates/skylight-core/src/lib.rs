//! Core types and configuration for skylight.
//!
//! Everything here is independent of the GUI toolkit: trigger matching, the
//! overlay state machine, geometry and persisted state. The application crate
//! adapts these to tao, wry and the CoreGraphics event tap.

pub mod appearance;
pub mod color;
mod config;
pub mod frame;
pub mod geometry;
pub mod listener;
pub mod overlay;
mod state_file;
pub mod trigger;

pub use appearance::{Appearance, AppearanceWatch};
pub use color::Rgb;
pub use config::{Config, ConfigManager};
pub use frame::{FRAME_SAVE_NAME, FrameStore};
pub use geometry::{Rect, Size};
pub use listener::{Disposition, HotkeyListener, KeyDown, ListenerAction};
pub use overlay::{
    CommandOutcome, EditCommand, KeyCommand, OverlayController, Visibility, WindowSurface,
};
pub use trigger::{Modifiers, Trigger};

/// Application name
pub const APP_NAME: &str = "skylight";

/// Pretty application name for display
pub const APP_NAME_PRETTY: &str = "Skylight";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Page loaded at launch and by the Home menu entry.
pub const HOME_URL: &str = "https://grok.com?referrer=skylight";
