//! The overlay window state machine.
//!
//! [`OverlayController`] owns the visibility state and drives a
//! [`WindowSurface`], which is implemented by the platform adapter around the
//! real window and web view (and by a recording fake in tests).

use tracing::{debug, info, warn};

use crate::color::Rgb;
use crate::geometry::{INITIAL_HEIGHT, INITIAL_WIDTH, Rect, Size};
use crate::trigger::Modifiers;

/// Capabilities the controller needs from the window and its web content.
pub trait WindowSurface {
    /// Brings the window to the front, makes it key and activates the
    /// application even if another application is active.
    fn show(&mut self);

    /// Hides the application so focus returns to whatever was active before.
    /// Window state and content are kept.
    fn hide(&mut self);

    /// Whether the window is currently the key window.
    fn is_key(&self) -> bool;

    /// Visible area of the main screen, bottom-left origin.
    fn visible_area(&self) -> Option<Rect>;

    /// Moves and resizes the window. `frame` uses a bottom-left origin.
    fn set_frame(&mut self, frame: Rect);

    /// Resizes the web content to the given content area.
    fn resize_content(&mut self, size: Size);

    /// Focuses the primary text input of the page.
    fn focus_content(&mut self);

    fn set_background(&mut self, color: Rgb);

    /// Forwards a text editing command to the focused element.
    fn run_edit_command(&mut self, command: EditCommand);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

/// Text editing commands delegated to whatever holds focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    SelectAll,
    Copy,
    Cut,
    Paste,
}

/// Key commands understood while the overlay is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Edit(EditCommand),
    Hide,
    Quit,
}

impl KeyCommand {
    /// Maps a key press to a command. Command or control must be held and
    /// option must not be.
    pub fn from_key(modifiers: Modifiers, key: char) -> Option<Self> {
        let primary =
            modifiers.contains(Modifiers::COMMAND) || modifiers.contains(Modifiers::CONTROL);
        if !primary || modifiers.contains(Modifiers::OPTION) {
            return None;
        }
        let command = match key.to_ascii_lowercase() {
            'a' => KeyCommand::Edit(EditCommand::SelectAll),
            'c' => KeyCommand::Edit(EditCommand::Copy),
            'x' => KeyCommand::Edit(EditCommand::Cut),
            'v' => KeyCommand::Edit(EditCommand::Paste),
            'h' => KeyCommand::Hide,
            'q' => KeyCommand::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// What the application loop has to do after a key command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Not a known command, default handling applies.
    Ignored,
    Handled,
    /// The application should terminate.
    Quit,
}

/// Show/hide state machine for the single overlay window.
#[derive(Debug, Default)]
pub struct OverlayController {
    visibility: Visibility,
}

impl OverlayController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible_and_key(&self, surface: &impl WindowSurface) -> bool {
        self.visibility == Visibility::Visible && surface.is_key()
    }

    pub fn show(&mut self, surface: &mut impl WindowSurface) {
        surface.show();
        surface.focus_content();
        self.visibility = Visibility::Visible;
        debug!("Overlay shown");
    }

    pub fn hide(&mut self, surface: &mut impl WindowSurface) {
        surface.hide();
        self.visibility = Visibility::Hidden;
        debug!("Overlay hidden");
    }

    /// Hides the overlay if it is visible and focused, shows it otherwise.
    pub fn toggle(&mut self, surface: &mut impl WindowSurface) {
        if self.is_visible_and_key(surface) {
            self.hide(surface);
        } else {
            self.show(surface);
        }
    }

    /// Moves the window back to its default frame on the main screen and
    /// shows it. Returns the applied frame.
    pub fn reset_size_and_position(&mut self, surface: &mut impl WindowSurface) -> Option<Rect> {
        let frame = match surface.visible_area() {
            Some(area) => {
                let frame =
                    Rect::centered_default(area, Size::new(INITIAL_WIDTH, INITIAL_HEIGHT));
                info!(?frame, "Resetting window frame");
                surface.set_frame(frame);
                Some(frame)
            }
            None => {
                warn!("No screen available, keeping the current window frame");
                None
            }
        };
        self.show(surface);
        frame
    }

    /// The web content always fills the whole content area.
    pub fn on_resized(&mut self, surface: &mut impl WindowSurface, content: Size) {
        surface.resize_content(content);
    }

    /// Applies a background color reported by the page. Malformed reports
    /// are dropped.
    pub fn on_background_color(
        &mut self,
        surface: &mut impl WindowSurface,
        css: &str,
    ) -> Option<Rgb> {
        let Some(color) = Rgb::from_css(css) else {
            debug!(css, "Ignoring unparseable background color");
            return None;
        };
        surface.set_background(color);
        Some(color)
    }

    pub fn handle_key_command(
        &mut self,
        surface: &mut impl WindowSurface,
        modifiers: Modifiers,
        key: char,
    ) -> CommandOutcome {
        match KeyCommand::from_key(modifiers, key) {
            Some(KeyCommand::Edit(command)) => {
                surface.run_edit_command(command);
                CommandOutcome::Handled
            }
            Some(KeyCommand::Hide) => {
                self.hide(surface);
                CommandOutcome::Handled
            }
            Some(KeyCommand::Quit) => CommandOutcome::Quit,
            None => CommandOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::{HotkeyListener, KeyDown, ListenerAction};
    use crate::trigger::{KEY_SPACE, Trigger};

    /// Records calls and models key status the way the window server does.
    #[derive(Default)]
    struct FakeSurface {
        key: bool,
        area: Option<Rect>,
        frame: Option<Rect>,
        content: Option<Size>,
        background: Option<Rgb>,
        focus_requests: usize,
        edits: Vec<EditCommand>,
    }

    impl WindowSurface for FakeSurface {
        fn show(&mut self) {
            self.key = true;
        }

        fn hide(&mut self) {
            self.key = false;
        }

        fn is_key(&self) -> bool {
            self.key
        }

        fn visible_area(&self) -> Option<Rect> {
            self.area
        }

        fn set_frame(&mut self, frame: Rect) {
            self.frame = Some(frame);
        }

        fn resize_content(&mut self, size: Size) {
            self.content = Some(size);
        }

        fn focus_content(&mut self) {
            self.focus_requests += 1;
        }

        fn set_background(&mut self, color: Rgb) {
            self.background = Some(color);
        }

        fn run_edit_command(&mut self, command: EditCommand) {
            self.edits.push(command);
        }
    }

    #[test]
    fn test_trigger_alternates_visibility() {
        let listener = HotkeyListener::new(Trigger::default());
        let mut controller = OverlayController::new();
        let mut surface = FakeSurface::default();
        let trigger = KeyDown::new(Modifiers::OPTION, KEY_SPACE);

        let mut states = Vec::new();
        for _ in 0..4 {
            if listener.handle_key_down(trigger) == ListenerAction::Toggle {
                controller.toggle(&mut surface);
            }
            states.push(controller.visibility());
        }
        assert_eq!(
            states,
            vec![
                Visibility::Visible,
                Visibility::Hidden,
                Visibility::Visible,
                Visibility::Hidden
            ]
        );
    }

    #[test]
    fn test_non_matching_keys_leave_visibility_alone() {
        let listener = HotkeyListener::new(Trigger::default());
        let mut controller = OverlayController::new();
        let mut surface = FakeSurface::default();

        for key in [
            KeyDown::new(Modifiers::NONE, KEY_SPACE),
            KeyDown::new(Modifiers::OPTION | Modifiers::CONTROL, KEY_SPACE),
        ] {
            if listener.handle_key_down(key) == ListenerAction::Toggle {
                controller.toggle(&mut surface);
            }
        }
        assert_eq!(controller.visibility(), Visibility::Hidden);
        assert_eq!(surface.focus_requests, 0);
    }

    #[test]
    fn test_toggle_shows_when_visible_but_not_key() {
        let mut controller = OverlayController::new();
        let mut surface = FakeSurface::default();
        controller.show(&mut surface);

        // Another application took focus while the overlay stayed on screen.
        surface.key = false;
        controller.toggle(&mut surface);
        assert_eq!(controller.visibility(), Visibility::Visible);
        assert!(surface.key);
        assert_eq!(surface.focus_requests, 2);
    }

    #[test]
    fn test_reset_size_and_position() {
        let mut controller = OverlayController::new();
        let mut surface = FakeSurface {
            area: Some(Rect::new(0.0, 0.0, 1440.0, 900.0)),
            ..Default::default()
        };

        let frame = controller.reset_size_and_position(&mut surface);
        assert_eq!(frame, Some(Rect::new(445.0, 40.0, 550.0, 580.0)));
        assert_eq!(surface.frame, frame);
        assert_eq!(controller.visibility(), Visibility::Visible);
    }

    #[test]
    fn test_reset_without_screen_still_shows() {
        let mut controller = OverlayController::new();
        let mut surface = FakeSurface::default();
        assert_eq!(controller.reset_size_and_position(&mut surface), None);
        assert!(surface.frame.is_none());
        assert_eq!(controller.visibility(), Visibility::Visible);
    }

    #[test]
    fn test_resize_fills_content_area() {
        let mut controller = OverlayController::new();
        let mut surface = FakeSurface::default();
        controller.on_resized(&mut surface, Size::new(700.0, 612.0));
        assert_eq!(surface.content, Some(Size::new(700.0, 612.0)));
    }

    #[test]
    fn test_background_color() {
        let mut controller = OverlayController::new();
        let mut surface = FakeSurface::default();

        let color = controller.on_background_color(&mut surface, "rgb(255, 0, 0)");
        assert_eq!(color, Some(Rgb::new(1.0, 0.0, 0.0)));
        assert_eq!(surface.background, color);

        assert_eq!(controller.on_background_color(&mut surface, "not-a-color"), None);
        assert_eq!(surface.background, Some(Rgb::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_key_commands() {
        assert_eq!(
            KeyCommand::from_key(Modifiers::COMMAND, 'c'),
            Some(KeyCommand::Edit(EditCommand::Copy))
        );
        assert_eq!(
            KeyCommand::from_key(Modifiers::CONTROL | Modifiers::SHIFT, 'V'),
            Some(KeyCommand::Edit(EditCommand::Paste))
        );
        assert_eq!(KeyCommand::from_key(Modifiers::COMMAND | Modifiers::OPTION, 'c'), None);
        assert_eq!(KeyCommand::from_key(Modifiers::SHIFT, 'c'), None);
        assert_eq!(KeyCommand::from_key(Modifiers::COMMAND, 'z'), None);
    }

    #[test]
    fn test_handle_key_command() {
        let mut controller = OverlayController::new();
        let mut surface = FakeSurface::default();
        controller.show(&mut surface);

        assert_eq!(
            controller.handle_key_command(&mut surface, Modifiers::COMMAND, 'a'),
            CommandOutcome::Handled
        );
        assert_eq!(surface.edits, vec![EditCommand::SelectAll]);

        assert_eq!(
            controller.handle_key_command(&mut surface, Modifiers::COMMAND, 'q'),
            CommandOutcome::Quit
        );
        assert_eq!(
            controller.handle_key_command(&mut surface, Modifiers::COMMAND, 'k'),
            CommandOutcome::Ignored
        );

        assert_eq!(
            controller.handle_key_command(&mut surface, Modifiers::COMMAND, 'h'),
            CommandOutcome::Handled
        );
        assert_eq!(controller.visibility(), Visibility::Hidden);
    }
}
