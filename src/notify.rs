//! User visible failure reports.
//!
//! Skylight has no dialogs. Warnings and errors logged anywhere in the app are
//! mirrored as system notifications so problems like a missing accessibility
//! permission do not go unnoticed when the app was started at login.

use std::fmt;
use std::time::{Duration, Instant};

use notify_rust::Notification;
use parking_lot::Mutex;
use skylight_core::{APP_NAME, APP_NAME_PRETTY};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber, error};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::icon::ICON_PATH;

/// Events logged under this target never turn into notifications.
const TARGET: &str = "skylight::notify";

/// The same text is shown at most once per window. The event tap can be
/// disabled and re-enabled many times in a row.
const REPEAT_WINDOW: Duration = Duration::from_secs(30);

/// A notification derived from one log event.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Notice {
    summary: &'static str,
    body: String,
}

impl Notice {
    fn from_event(event: &Event<'_>) -> Option<Self> {
        if event.metadata().target() == TARGET {
            return None;
        }
        let summary = match *event.metadata().level() {
            Level::ERROR => "error",
            Level::WARN => "warning",
            _ => return None,
        };
        let mut fields = NoticeFields::default();
        event.record(&mut fields);
        fields.body().map(|body| Self { summary, body })
    }

    fn show(&self) {
        Notification::new()
            .icon(ICON_PATH)
            .appname(APP_NAME)
            .summary(&format!("{} - {}", APP_NAME_PRETTY, self.summary))
            .body(&self.body)
            .show()
            .map_err(|e| error!(target: TARGET, "Failed to send notification: {}", e))
            .ok();
    }
}

/// Collects the message and an `error` field if the event carries one.
#[derive(Default)]
struct NoticeFields {
    message: Option<String>,
    error: Option<String>,
}

impl NoticeFields {
    fn set(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            "error" => self.error = Some(value),
            _ => {}
        }
    }

    fn body(self) -> Option<String> {
        match (self.message, self.error) {
            (Some(message), Some(error)) => Some(format!("{message}: {error}")),
            (message, error) => message.or(error),
        }
    }
}

impl Visit for NoticeFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field, value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.set(field, format!("{:?}", value));
    }
}

/// Remembers the last body shown and when.
#[derive(Debug, Default)]
struct RepeatFilter {
    last: Option<(String, Instant)>,
}

impl RepeatFilter {
    fn admit(&mut self, body: &str, now: Instant) -> bool {
        if let Some((last, at)) = &self.last {
            if last == body && now.duration_since(*at) < REPEAT_WINDOW {
                return false;
            }
        }
        self.last = Some((body.to_owned(), now));
        true
    }
}

/// Tracing layer that sends notifications for warnings and errors.
#[derive(Debug, Default)]
pub struct NotificationLayer {
    repeats: Mutex<RepeatFilter>,
}

impl NotificationLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Subscriber> Layer<S> for NotificationLayer {
    fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
        let Some(notice) = Notice::from_event(event) else {
            return;
        };
        if self.repeats.lock().admit(&notice.body, Instant::now()) {
            notice.show();
        }
    }
}
