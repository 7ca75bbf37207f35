//! Application events for the tao event loop.

use serde::Deserialize;
use skylight_core::{Appearance, ListenerAction};
use tray_icon::menu::MenuEvent;

/// Name of the message handler the page posts background colors to.
pub const BACKGROUND_COLOR_HANDLER: &str = "backgroundColorHandler";

/// Events for the tao event loop.
#[derive(Debug, Clone)]
pub enum UserEvent {
    /// The event tap matched a key press
    Hotkey(ListenerAction),
    /// macOS disabled the event tap, it needs to be re-enabled
    TapDisabled,
    /// A tray or application menu entry was clicked
    Menu(MenuEvent),
    /// The page reported its background color
    BackgroundColor(String),
    /// The menu bar switched between light and dark
    AppearanceChanged(Appearance),
}

#[derive(Deserialize)]
struct ScriptMessage {
    handler: String,
    body: serde_json::Value,
}

/// Extracts the CSS color from an IPC message posted by the page. Messages
/// for other handlers and anything that is not valid JSON yield `None`.
pub fn background_color_message(raw: &str) -> Option<String> {
    let message: ScriptMessage = serde_json::from_str(raw).ok()?;
    if message.handler != BACKGROUND_COLOR_HANDLER {
        return None;
    }
    match message.body {
        serde_json::Value::String(css) => Some(css),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_color_message() {
        assert_eq!(
            background_color_message(
                r#"{"handler":"backgroundColorHandler","body":"rgb(255, 0, 0)"}"#
            ),
            Some("rgb(255, 0, 0)".to_string())
        );
    }

    #[test]
    fn test_other_messages_are_ignored() {
        for raw in [
            "rgb(255, 0, 0)",
            "",
            "{}",
            r#"{"handler":"somethingElse","body":"rgb(0, 0, 0)"}"#,
            r#"{"handler":"backgroundColorHandler","body":42}"#,
            r#"{"handler":"backgroundColorHandler"}"#,
        ] {
            assert_eq!(background_color_message(raw), None, "{raw:?}");
        }
    }
}
