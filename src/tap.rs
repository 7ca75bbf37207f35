//! Session wide key-down interception through a CoreGraphics event tap.
//!
//! The tap sits at the head of the session event stream, so it sees every key
//! press before any application does. The callback runs on the main run loop
//! and only asks the [`HotkeyListener`] for a decision; window work happens
//! later in the tao loop through a [`UserEvent`].

use std::sync::Arc;

use anyhow::{Result, anyhow};
use core_foundation::runloop::{CFRunLoop, CFRunLoopSource, kCFRunLoopCommonModes};
use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement,
    CGEventType, EventField,
};
use skylight_core::{Disposition, HotkeyListener, KeyDown, Modifiers};
use tao::event_loop::EventLoopProxy;
use tracing::{info, warn};

use crate::event::UserEvent;

/// An installed event tap. Dropping it removes the interceptor.
pub struct EventTap {
    tap: CGEventTap<'static>,
    _source: CFRunLoopSource,
    listener: Arc<HotkeyListener>,
}

impl EventTap {
    /// Creates the tap and adds it to the main run loop. Fails when the
    /// process lacks the accessibility permission.
    pub fn install(listener: Arc<HotkeyListener>, proxy: EventLoopProxy<UserEvent>) -> Result<Self> {
        let matcher = listener.clone();
        let tap = CGEventTap::new(
            CGEventTapLocation::Session,
            CGEventTapPlacement::HeadInsertEventTap,
            CGEventTapOptions::Default,
            vec![CGEventType::KeyDown],
            move |_proxy, event_type, event: &CGEvent| match event_type {
                CGEventType::KeyDown => {
                    let action = matcher.handle_key_down(key_down(event));
                    match action.disposition() {
                        Disposition::PassThrough => None,
                        Disposition::Consume => {
                            proxy.send_event(UserEvent::Hotkey(action)).ok();
                            Some(consumed(event))
                        }
                    }
                }
                CGEventType::TapDisabledByTimeout | CGEventType::TapDisabledByUserInput => {
                    proxy.send_event(UserEvent::TapDisabled).ok();
                    None
                }
                _ => None,
            },
        )
        .map_err(|_| {
            anyhow!("Failed to create event tap. Check Accessibility permissions.")
        })?;

        let source = tap
            .mach_port
            .create_runloop_source(0)
            .map_err(|_| anyhow!("Failed to create run loop source for the event tap"))?;
        unsafe {
            CFRunLoop::get_main().add_source(&source, kCFRunLoopCommonModes);
        }
        tap.enable();
        listener.set_attached(true);
        info!("Global trigger listener installed");

        Ok(Self {
            tap,
            _source: source,
            listener,
        })
    }

    /// Turns the tap back on after macOS disabled it.
    pub fn enable(&self) {
        warn!("Event tap was disabled by the system, re-enabling");
        self.tap.enable();
    }
}

impl Drop for EventTap {
    fn drop(&mut self) {
        self.listener.set_attached(false);
    }
}

fn key_down(event: &CGEvent) -> KeyDown {
    let flags = event.get_flags();
    let modifiers = Modifiers::from_flags(
        flags.contains(CGEventFlags::CGEventFlagCommand),
        flags.contains(CGEventFlags::CGEventFlagAlternate),
        flags.contains(CGEventFlags::CGEventFlagControl),
        flags.contains(CGEventFlags::CGEventFlagShift),
    );
    let key_code = event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16;
    KeyDown::new(modifiers, key_code)
}

/// Returning a null-typed event drops it from the stream.
fn consumed(event: &CGEvent) -> CGEvent {
    let consumed = event.clone();
    consumed.set_type(CGEventType::Null);
    consumed
}
