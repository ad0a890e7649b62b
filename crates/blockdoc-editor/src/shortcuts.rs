//! Keyboard shortcuts: chords, bindings and focus guarding.
//!
//! A [`Chord`] is one key plus the exact set of modifiers that must be
//! held. Bindings are written as strings (`"ctrl+shift+z"`), and a command
//! may carry several comma-separated alternatives to cover platform
//! differences such as Ctrl versus Cmd.
//!
//! Shortcuts never fire while focus is inside an editable control, so
//! native text editing keystrokes (Ctrl+Z in a text field, Backspace in a
//! content-editable region) are left alone.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ShortcutConfig;

/// Errors from parsing chord strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortcutError {
    #[error("empty shortcut")]
    Empty,

    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("unknown key '{0}'")]
    UnknownKey(String),
}

/// Modifier key state required for a chord to match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    pub const META: Modifiers = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };

    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        shift: true,
        ..Modifiers::NONE
    };

    pub const META_SHIFT: Modifiers = Modifiers {
        meta: true,
        shift: true,
        ..Modifiers::NONE
    };
}

/// A physical key, independent of modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character, stored lowercase.
    Char(char),
    Enter,
    Escape,
    Tab,
    Space,
    Backspace,
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

impl Key {
    /// Parses a key name as written in binding strings or reported by a
    /// browser `KeyboardEvent.key`.
    pub fn parse(name: &str) -> Result<Key, ShortcutError> {
        let lower = name.trim().to_ascii_lowercase();
        let key = match lower.as_str() {
            "" => return Err(ShortcutError::Empty),
            "enter" | "return" => Key::Enter,
            "escape" | "esc" => Key::Escape,
            "tab" => Key::Tab,
            "space" | " " => Key::Space,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "arrowup" | "up" | "↑" => Key::ArrowUp,
            "arrowdown" | "down" | "↓" => Key::ArrowDown,
            "arrowleft" | "left" | "←" => Key::ArrowLeft,
            "arrowright" | "right" | "→" => Key::ArrowRight,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" => Key::PageUp,
            "pagedown" => Key::PageDown,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                        Some(n @ 1..=24) => Key::F(n),
                        _ => return Err(ShortcutError::UnknownKey(name.trim().to_string())),
                    },
                }
            }
        };
        Ok(key.normalized())
    }

    /// Lowercase form of a character key; other keys are unchanged.
    pub fn normalized(self) -> Key {
        match self {
            Key::Char(c) => Key::Char(c.to_lowercase().next().unwrap_or(c)),
            other => other,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Enter => f.write_str("enter"),
            Key::Escape => f.write_str("escape"),
            Key::Tab => f.write_str("tab"),
            Key::Space => f.write_str("space"),
            Key::Backspace => f.write_str("backspace"),
            Key::Delete => f.write_str("delete"),
            Key::ArrowUp => f.write_str("arrowup"),
            Key::ArrowDown => f.write_str("arrowdown"),
            Key::ArrowLeft => f.write_str("arrowleft"),
            Key::ArrowRight => f.write_str("arrowright"),
            Key::Home => f.write_str("home"),
            Key::End => f.write_str("end"),
            Key::PageUp => f.write_str("pageup"),
            Key::PageDown => f.write_str("pagedown"),
            Key::F(n) => write!(f, "f{}", n),
        }
    }
}

/// One key plus the exact modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl Chord {
    /// Character keys are lowercased so a shifted `'Z'` matches `shift+z`.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Chord {
            key: key.normalized(),
            modifiers,
        }
    }

    /// Parses `"ctrl+shift+z"`. The last `+`-separated token is the key.
    pub fn parse(spec: &str) -> Result<Chord, ShortcutError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(ShortcutError::Empty);
        }

        let mut tokens: Vec<&str> = spec.split('+').map(str::trim).collect();
        // "ctrl++" binds the plus key itself.
        if spec.ends_with("++") {
            tokens.truncate(tokens.len() - 2);
            tokens.push("+");
        }
        let key_name = tokens.pop().ok_or(ShortcutError::Empty)?;

        let mut modifiers = Modifiers::NONE;
        for token in tokens {
            match token.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" | "opt" => modifiers.alt = true,
                "meta" | "cmd" | "command" | "super" | "win" => modifiers.meta = true,
                _ => return Err(ShortcutError::UnknownModifier(token.to_string())),
            }
        }

        Ok(Chord::new(Key::parse(key_name)?, modifiers))
    }

    /// Parses a comma-separated list of alternative chords.
    pub fn parse_list(spec: &str) -> Result<Vec<Chord>, ShortcutError> {
        let chords = spec
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Chord::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if chords.is_empty() {
            return Err(ShortcutError::Empty);
        }
        Ok(chords)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.modifiers;
        for (held, name) in [
            (m.ctrl, "ctrl+"),
            (m.meta, "meta+"),
            (m.alt, "alt+"),
            (m.shift, "shift+"),
        ] {
            if held {
                f.write_str(name)?;
            }
        }
        write!(f, "{}", self.key)
    }
}

/// Editor operations reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorCommand {
    Save,
    Undo,
    Redo,
    AddBlock,
    DeleteBlock,
    DuplicateBlock,
    MoveUp,
    MoveDown,
}

/// Where keyboard focus was when a key was pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusTarget {
    /// Nothing focused (document body).
    #[default]
    None,
    TextInput,
    TextArea,
    Select,
    ContentEditable,
    /// A non-editable control such as a button.
    Other,
}

impl FocusTarget {
    /// Whether the focused element handles editing keystrokes natively.
    pub fn is_editable(self) -> bool {
        matches!(
            self,
            FocusTarget::TextInput
                | FocusTarget::TextArea
                | FocusTarget::Select
                | FocusTarget::ContentEditable
        )
    }
}

/// A key press as delivered by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub chord: Chord,
    pub focus: FocusTarget,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        KeyEvent {
            chord: Chord::new(key, modifiers),
            focus: FocusTarget::None,
        }
    }

    pub fn with_focus(mut self, focus: FocusTarget) -> Self {
        self.focus = focus;
        self
    }
}

/// The chord -> command binding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutMap {
    bindings: Vec<(Chord, EditorCommand)>,
}

/// Built-in bindings, one comma-separated chord list per command.
const DEFAULT_BINDINGS: &[(EditorCommand, &str)] = &[
    (EditorCommand::Save, "ctrl+s, meta+s"),
    (EditorCommand::Undo, "ctrl+z, meta+z"),
    (EditorCommand::Redo, "ctrl+shift+z, meta+shift+z, ctrl+y"),
    (EditorCommand::AddBlock, "alt+a"),
    (EditorCommand::DeleteBlock, "alt+delete, alt+backspace"),
    (EditorCommand::DuplicateBlock, "alt+d"),
    (EditorCommand::MoveUp, "alt+arrowup"),
    (EditorCommand::MoveDown, "alt+arrowdown"),
];

impl Default for ShortcutMap {
    fn default() -> Self {
        let mut map = ShortcutMap {
            bindings: Vec::new(),
        };
        for (command, spec) in DEFAULT_BINDINGS {
            // The built-in table is static and known to parse.
            if let Ok(chords) = Chord::parse_list(spec) {
                map.bindings
                    .extend(chords.into_iter().map(|chord| (chord, *command)));
            }
        }
        map
    }
}

impl ShortcutMap {
    /// Default bindings with the configured per-command overrides applied.
    pub fn from_config(config: &ShortcutConfig) -> Result<Self, ShortcutError> {
        let mut map = ShortcutMap::default();
        for (command, spec) in &config.0 {
            map.bind(*command, spec)?;
        }
        Ok(map)
    }

    /// Replaces every binding of `command` with the chords in `spec`.
    pub fn bind(&mut self, command: EditorCommand, spec: &str) -> Result<(), ShortcutError> {
        let chords = Chord::parse_list(spec)?;
        self.bindings.retain(|(_, c)| *c != command);
        self.bindings
            .extend(chords.into_iter().map(|chord| (chord, command)));
        Ok(())
    }

    /// Chords currently bound to `command`.
    pub fn chords_for(&self, command: EditorCommand) -> Vec<Chord> {
        self.bindings
            .iter()
            .filter(|(_, c)| *c == command)
            .map(|(chord, _)| *chord)
            .collect()
    }

    /// The command a key press triggers, if any.
    ///
    /// Returns `None` whenever focus is inside an editable control.
    pub fn resolve(&self, event: &KeyEvent) -> Option<EditorCommand> {
        if event.focus.is_editable() {
            return None;
        }
        self.bindings
            .iter()
            .find(|(chord, _)| *chord == event.chord)
            .map(|(_, command)| *command)
    }
}
