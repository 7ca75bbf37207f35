//! Key-down matching for the global trigger.
//!
//! The platform event tap extracts a [`KeyDown`] from every key press and asks
//! the [`HotkeyListener`] what to do with it. The listener never touches the
//! window itself, it only decides. This keeps the tap callback short since it
//! gates delivery of every keystroke in the session.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::trigger::{Modifiers, Trigger};

/// A key-down event as seen by the interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDown {
    pub modifiers: Modifiers,
    pub key_code: u16,
}

impl KeyDown {
    pub fn new(modifiers: Modifiers, key_code: u16) -> Self {
        Self {
            modifiers,
            key_code,
        }
    }
}

/// What the interceptor must do with the original event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Swallow the event, no other application sees it.
    Consume,
    /// Hand the event back unchanged.
    PassThrough,
}

/// Outcome of matching one key-down event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerAction {
    PassThrough,
    /// The trigger was pressed, the overlay should toggle.
    Toggle,
    /// Capture mode was armed and this key press became the new trigger.
    TriggerCaptured(Trigger),
}

impl ListenerAction {
    pub fn disposition(&self) -> Disposition {
        match self {
            ListenerAction::PassThrough => Disposition::PassThrough,
            ListenerAction::Toggle | ListenerAction::TriggerCaptured(_) => Disposition::Consume,
        }
    }
}

/// Matches key-down events against the live trigger.
///
/// The trigger sits behind one lock and every event reads a single snapshot of
/// it, so replacing the trigger can never be observed half way.
#[derive(Debug)]
pub struct HotkeyListener {
    trigger: RwLock<Trigger>,
    capturing: AtomicBool,
    attached: AtomicBool,
}

impl HotkeyListener {
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger: RwLock::new(trigger),
            capturing: AtomicBool::new(false),
            attached: AtomicBool::new(false),
        }
    }

    /// Records whether an interceptor is feeding key-down events to this
    /// listener.
    pub fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::SeqCst);
        if !attached {
            self.capturing.store(false, Ordering::SeqCst);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Returns the trigger currently in effect.
    pub fn trigger(&self) -> Trigger {
        *self.trigger.read()
    }

    /// Replaces the trigger used for all following events.
    pub fn set_trigger(&self, trigger: Trigger) {
        if trigger.modifiers.is_empty() {
            warn!(%trigger, "Trigger has no modifiers and fires on every press of its key");
        }
        *self.trigger.write() = trigger;
        info!(%trigger, "Trigger updated");
    }

    /// The next key-down event becomes the new trigger instead of being matched.
    ///
    /// Returns false without arming anything when no interceptor is attached.
    pub fn begin_capture(&self) -> bool {
        if !self.is_attached() {
            error!("Cannot set a new trigger without the global key listener. Grant the Accessibility permission and restart.");
            return false;
        }
        self.capturing.store(true, Ordering::SeqCst);
        info!("Press the new trigger combination");
        true
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    pub fn handle_key_down(&self, key: KeyDown) -> ListenerAction {
        if self.capturing.swap(false, Ordering::SeqCst) {
            let trigger = Trigger::new(key.modifiers, key.key_code);
            self.set_trigger(trigger);
            return ListenerAction::TriggerCaptured(trigger);
        }

        let trigger = self.trigger();
        if trigger.matches(key.modifiers, key.key_code) {
            debug!(%trigger, "Trigger pressed");
            ListenerAction::Toggle
        } else {
            ListenerAction::PassThrough
        }
    }
}
