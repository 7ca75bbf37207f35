//! The overlay window and its embedded web view.

use anyhow::{Context, Result};
use skylight_core::geometry::{INITIAL_HEIGHT, INITIAL_WIDTH};
use skylight_core::{
    APP_NAME_PRETTY, EditCommand, HOME_URL, Rect, Rgb, Size, WindowSurface,
};
use tao::dpi::{LogicalPosition, LogicalSize, PhysicalSize};
use tao::event_loop::{EventLoopProxy, EventLoopWindowTarget};
use tao::window::{Window, WindowBuilder};
use tracing::{debug, warn};
use wry::http::Request;
use wry::{WebView, WebViewBuilder};

use crate::event::{UserEvent, background_color_message};

/// Reports `document.body`'s computed background color on load and whenever
/// its inline style changes.
const BACKGROUND_COLOR_SCRIPT: &str = r#"
(function () {
    function sendBackgroundColor() {
        if (!document.body) {
            return;
        }
        var bgColor = window.getComputedStyle(document.body).backgroundColor;
        window.ipc.postMessage(JSON.stringify({ handler: 'backgroundColorHandler', body: bgColor }));
    }
    function observeBody() {
        sendBackgroundColor();
        new MutationObserver(sendBackgroundColor)
            .observe(document.body, { attributes: true, attributeFilter: ['style'] });
    }
    window.addEventListener('load', sendBackgroundColor);
    if (document.readyState === 'loading') {
        document.addEventListener('DOMContentLoaded', observeBody);
    } else {
        observeBody();
    }
})();
"#;

const FOCUS_INPUT_SCRIPT: &str =
    "(function () { var input = document.querySelector('textarea'); if (input) { input.focus(); } })();";

fn edit_script(command: EditCommand) -> &'static str {
    match command {
        EditCommand::SelectAll => "document.execCommand('selectAll');",
        EditCommand::Copy => "document.execCommand('copy');",
        EditCommand::Cut => "document.execCommand('cut');",
        EditCommand::Paste => "document.execCommand('paste');",
    }
}

/// The single application window with the hosted page filling its content
/// area.
pub struct OverlayWindow {
    window: Window,
    webview: WebView,
    frame_dirty: bool,
}

impl OverlayWindow {
    /// Builds the window hidden, at `saved_frame` if one was persisted.
    /// Frames handled here use tao's top-left origin.
    pub fn build(
        target: &EventLoopWindowTarget<UserEvent>,
        proxy: EventLoopProxy<UserEvent>,
        saved_frame: Option<Rect>,
    ) -> Result<Self> {
        let mut builder = WindowBuilder::new()
            .with_title(APP_NAME_PRETTY)
            .with_inner_size(LogicalSize::new(INITIAL_WIDTH, INITIAL_HEIGHT))
            .with_resizable(true)
            .with_always_on_top(true)
            .with_visible_on_all_workspaces(true)
            .with_visible(false);

        #[cfg(target_os = "macos")]
        {
            use tao::platform::macos::WindowBuilderExtMacOS;
            builder = builder
                .with_titlebar_transparent(true)
                .with_title_hidden(true)
                .with_fullsize_content_view(true)
                .with_movable_by_window_background(true);
        }

        if let Some(frame) = saved_frame {
            debug!(?frame, "Restoring window frame");
            builder = builder
                .with_position(LogicalPosition::new(frame.x, frame.y))
                .with_inner_size(LogicalSize::new(frame.width, frame.height));
        }

        let window = builder
            .build(target)
            .context("Failed to create overlay window")?;

        let webview = WebViewBuilder::new()
            .with_url(HOME_URL)
            .with_initialization_script(BACKGROUND_COLOR_SCRIPT)
            .with_ipc_handler(move |request: Request<String>| {
                if let Some(css) = background_color_message(request.body()) {
                    proxy.send_event(UserEvent::BackgroundColor(css)).ok();
                }
            })
            .build(&window)
            .context("Failed to create web view")?;

        Ok(Self {
            window,
            webview,
            frame_dirty: false,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Loads the home page again, e.g. after navigating away.
    pub fn go_home(&self) {
        if let Err(e) = self.webview.load_url(HOME_URL) {
            warn!("Failed to load {}: {}", HOME_URL, e);
        }
    }

    /// Logical size of the content area for a physical resize notification.
    pub fn content_size(&self, size: PhysicalSize<u32>) -> Size {
        let size = size.to_logical::<f64>(self.window.scale_factor());
        Size::new(size.width, size.height)
    }

    pub fn mark_frame_dirty(&mut self) {
        self.frame_dirty = true;
    }

    /// Returns the current frame if it changed since the last call.
    pub fn take_dirty_frame(&mut self) -> Option<Rect> {
        if !std::mem::take(&mut self.frame_dirty) {
            return None;
        }
        let scale = self.window.scale_factor();
        let position = match self.window.outer_position() {
            Ok(position) => position.to_logical::<f64>(scale),
            Err(e) => {
                warn!("Failed to read window position: {}", e);
                return None;
            }
        };
        let size = self.window.inner_size().to_logical::<f64>(scale);
        Some(Rect::new(position.x, position.y, size.width, size.height))
    }

    fn evaluate(&self, script: &str) {
        if let Err(e) = self.webview.evaluate_script(script) {
            warn!("Failed to run script in web view: {}", e);
        }
    }
}

/// [`WindowSurface`] over the overlay window for the duration of one event.
pub struct Surface<'a> {
    overlay: &'a mut OverlayWindow,
    target: &'a EventLoopWindowTarget<UserEvent>,
}

impl<'a> Surface<'a> {
    pub fn new(overlay: &'a mut OverlayWindow, target: &'a EventLoopWindowTarget<UserEvent>) -> Self {
        Self { overlay, target }
    }

    /// Full bounds of the primary monitor. A monitor rect at the origin is the
    /// same in bottom-left and top-left coordinates.
    fn monitor_bounds(&self) -> Option<Rect> {
        let monitor = self
            .target
            .primary_monitor()
            .or_else(|| self.overlay.window.current_monitor())?;
        let scale = monitor.scale_factor();
        let position = monitor.position().to_logical::<f64>(scale);
        let size = monitor.size().to_logical::<f64>(scale);
        Some(Rect::new(position.x, position.y, size.width, size.height))
    }

    /// The space frames are flipped in when converting to tao coordinates.
    /// Cocoa puts its origin at the bottom left of the primary screen.
    fn screen_bounds(&self) -> Option<Rect> {
        #[cfg(target_os = "macos")]
        if let Some((_, primary)) = screen_frames() {
            return Some(primary);
        }
        self.monitor_bounds()
    }
}

/// The main screen's visible frame and the primary screen's full frame.
#[cfg(target_os = "macos")]
fn screen_frames() -> Option<(Rect, Rect)> {
    use objc2::MainThreadMarker;
    use objc2_app_kit::NSScreen;
    use objc2_foundation::NSRect;

    fn rect(frame: NSRect) -> Rect {
        Rect::new(frame.origin.x, frame.origin.y, frame.size.width, frame.size.height)
    }

    let mtm = MainThreadMarker::new()?;
    let visible = NSScreen::mainScreen(mtm)?.visibleFrame();
    let primary = NSScreen::screens(mtm).firstObject()?.frame();
    Some((rect(visible), rect(primary)))
}

impl WindowSurface for Surface<'_> {
    fn show(&mut self) {
        let window = &self.overlay.window;
        window.set_visible(true);
        // Makes the window key and activates the app, even when another
        // application is frontmost.
        window.set_focus();
    }

    fn hide(&mut self) {
        #[cfg(target_os = "macos")]
        {
            use tao::platform::macos::EventLoopWindowTargetExtMacOS;
            self.target.hide_application();
        }
        #[cfg(not(target_os = "macos"))]
        self.overlay.window.set_visible(false);
    }

    fn is_key(&self) -> bool {
        let window = &self.overlay.window;
        window.is_visible() && window.is_focused()
    }

    /// The main screen minus the menu bar and dock, in bottom-left origin
    /// coordinates.
    fn visible_area(&self) -> Option<Rect> {
        #[cfg(target_os = "macos")]
        if let Some((visible, _)) = screen_frames() {
            return Some(visible);
        }
        self.monitor_bounds()
    }

    fn set_frame(&mut self, frame: Rect) {
        let Some(screen) = self.screen_bounds() else {
            return;
        };
        let frame = frame.flip_within(&screen);
        let window = &self.overlay.window;
        window.set_outer_position(LogicalPosition::new(frame.x, frame.y));
        window.set_inner_size(LogicalSize::new(frame.width, frame.height));
        self.overlay.mark_frame_dirty();
    }

    fn resize_content(&mut self, size: Size) {
        let bounds = wry::Rect {
            position: wry::dpi::LogicalPosition::new(0.0, 0.0).into(),
            size: wry::dpi::LogicalSize::new(size.width, size.height).into(),
        };
        if let Err(e) = self.overlay.webview.set_bounds(bounds) {
            warn!("Failed to resize web view: {}", e);
        }
    }

    fn focus_content(&mut self) {
        self.overlay.evaluate(FOCUS_INPUT_SCRIPT);
    }

    fn set_background(&mut self, color: Rgb) {
        self.overlay.window.set_background_color(Some(color.to_rgba8()));
    }

    fn run_edit_command(&mut self, command: EditCommand) {
        self.overlay.evaluate(edit_script(command));
    }
}
