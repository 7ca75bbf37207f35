//! The global trigger: a modifier set plus one physical key.
//!
//! Key codes are macOS virtual key codes (ANSI layout). Triggers are stored in
//! the config file as strings such as `"option+space"` or `"control+shift+49"`.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Virtual key code of the space bar.
pub const KEY_SPACE: u16 = 49;

/// Set of modifier keys held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const COMMAND: Modifiers = Modifiers(1);
    pub const OPTION: Modifiers = Modifiers(1 << 1);
    pub const CONTROL: Modifiers = Modifiers(1 << 2);
    pub const SHIFT: Modifiers = Modifiers(1 << 3);

    /// Display order, following the order macOS menus print modifiers in.
    const NAMED: [(Modifiers, &'static str); 4] = [
        (Modifiers::CONTROL, "control"),
        (Modifiers::OPTION, "option"),
        (Modifiers::SHIFT, "shift"),
        (Modifiers::COMMAND, "command"),
    ];

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Builds a set from individual flags, as reported by an input event.
    pub fn from_flags(command: bool, option: bool, control: bool, shift: bool) -> Self {
        let mut modifiers = Modifiers::NONE;
        for (held, flag) in [
            (command, Modifiers::COMMAND),
            (option, Modifiers::OPTION),
            (control, Modifiers::CONTROL),
            (shift, Modifiers::SHIFT),
        ] {
            if held {
                modifiers = modifiers | flag;
            }
        }
        modifiers
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "cmd" | "command" | "meta" | "super" => Some(Modifiers::COMMAND),
            "opt" | "option" | "alt" => Some(Modifiers::OPTION),
            "ctrl" | "control" => Some(Modifiers::CONTROL),
            "shift" => Some(Modifiers::SHIFT),
            _ => None,
        }
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

/// The user configurable key combination that shows and hides the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Trigger {
    pub modifiers: Modifiers,
    pub key_code: u16,
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new(Modifiers::OPTION, KEY_SPACE)
    }
}

impl Trigger {
    pub const fn new(modifiers: Modifiers, key_code: u16) -> Self {
        Self {
            modifiers,
            key_code,
        }
    }

    /// Exact match: same key and no modifiers beyond the trigger's own.
    pub fn matches(&self, modifiers: Modifiers, key_code: u16) -> bool {
        self.key_code == key_code && self.modifiers == modifiers
    }
}

/// Errors produced when parsing a trigger string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriggerParseError {
    #[error("trigger is empty")]
    Empty,

    #[error("unknown modifier: {0}")]
    UnknownModifier(String),

    #[error("unknown key: {0}")]
    UnknownKey(String),
}

impl FromStr for Trigger {
    type Err = TriggerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let mut parts: Vec<&str> = normalized.split('+').map(str::trim).collect();
        let key = match parts.pop() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(TriggerParseError::Empty),
        };

        let mut modifiers = Modifiers::NONE;
        for part in parts {
            let flag = Modifiers::from_name(part)
                .ok_or_else(|| TriggerParseError::UnknownModifier(part.to_owned()))?;
            modifiers = modifiers | flag;
        }

        let key_code = key_code_from_name(key)
            .or_else(|| key.parse().ok())
            .ok_or_else(|| TriggerParseError::UnknownKey(key.to_owned()))?;

        Ok(Self::new(modifiers, key_code))
    }
}

impl TryFrom<String> for Trigger {
    type Error = TriggerParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Trigger> for String {
    fn from(trigger: Trigger) -> Self {
        trigger.to_string()
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in Modifiers::NAMED {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        match key_name(self.key_code) {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.key_code),
        }
    }
}

/// ANSI layout virtual key codes.
const KEY_NAMES: &[(u16, &str)] = &[
    (0, "a"),
    (1, "s"),
    (2, "d"),
    (3, "f"),
    (4, "h"),
    (5, "g"),
    (6, "z"),
    (7, "x"),
    (8, "c"),
    (9, "v"),
    (11, "b"),
    (12, "q"),
    (13, "w"),
    (14, "e"),
    (15, "r"),
    (16, "y"),
    (17, "t"),
    (18, "1"),
    (19, "2"),
    (20, "3"),
    (21, "4"),
    (22, "6"),
    (23, "5"),
    (24, "equal"),
    (25, "9"),
    (26, "7"),
    (27, "minus"),
    (28, "8"),
    (29, "0"),
    (30, "rightbracket"),
    (31, "o"),
    (32, "u"),
    (33, "leftbracket"),
    (34, "i"),
    (35, "p"),
    (36, "return"),
    (37, "l"),
    (38, "j"),
    (39, "quote"),
    (40, "k"),
    (41, "semicolon"),
    (42, "backslash"),
    (43, "comma"),
    (44, "slash"),
    (45, "n"),
    (46, "m"),
    (47, "period"),
    (48, "tab"),
    (KEY_SPACE, "space"),
    (50, "grave"),
    (51, "delete"),
    (53, "escape"),
    (96, "f5"),
    (97, "f6"),
    (98, "f7"),
    (99, "f3"),
    (100, "f8"),
    (101, "f9"),
    (103, "f11"),
    (109, "f10"),
    (111, "f12"),
    (118, "f4"),
    (120, "f2"),
    (122, "f1"),
    (123, "left"),
    (124, "right"),
    (125, "down"),
    (126, "up"),
];

/// Human readable name for a virtual key code, if it has one.
pub fn key_name(key_code: u16) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .find(|(code, _)| *code == key_code)
        .map(|(_, name)| *name)
}

fn key_code_from_name(name: &str) -> Option<u16> {
    KEY_NAMES
        .iter()
        .find(|(_, known)| *known == name)
        .map(|(code, _)| *code)
}
