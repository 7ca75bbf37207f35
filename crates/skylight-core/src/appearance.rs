//! System appearance tracking.

/// The effective light or dark appearance of the menu bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

type Callback = Box<dyn FnMut(Appearance)>;

/// Holds the last known appearance and notifies subscribers when it changes.
///
/// Platform code feeds every appearance notification into [`update`], repeated
/// reports of the same appearance are dropped here.
///
/// [`update`]: AppearanceWatch::update
pub struct AppearanceWatch {
    current: Appearance,
    subscribers: Vec<Callback>,
}

impl AppearanceWatch {
    pub fn new(initial: Appearance) -> Self {
        Self {
            current: initial,
            subscribers: Vec::new(),
        }
    }

    pub fn current(&self) -> Appearance {
        self.current
    }

    /// Registers a callback invoked with the new appearance on every change.
    pub fn subscribe(&mut self, callback: impl FnMut(Appearance) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// Records an appearance report. Returns `true` if it was a change.
    pub fn update(&mut self, appearance: Appearance) -> bool {
        if appearance == self.current {
            return false;
        }
        self.current = appearance;
        for callback in &mut self.subscribers {
            callback(appearance);
        }
        true
    }
}
