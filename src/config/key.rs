use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn with_ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub const fn with_shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        match (self.code, event.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => {
                let chars_match = a == b
                    || (a.is_ascii_alphabetic()
                        && b.is_ascii_alphabetic()
                        && a.eq_ignore_ascii_case(&b));

                let expected_mods = if a.is_ascii_uppercase() {
                    self.modifiers | KeyModifiers::SHIFT
                } else {
                    self.modifiers
                };

                let actual_mods = if b.is_ascii_uppercase() {
                    event.modifiers | KeyModifiers::SHIFT
                } else {
                    event.modifiers
                };

                chars_match
                    && (expected_mods & !KeyModifiers::SHIFT)
                        == (actual_mods & !KeyModifiers::SHIFT)
            }
            // Terminals report shift+tab as BackTab, usually with SHIFT set.
            (KeyCode::Tab, KeyCode::BackTab) if self.modifiers.contains(KeyModifiers::SHIFT) => {
                (self.modifiers & !KeyModifiers::SHIFT) == (event.modifiers & !KeyModifiers::SHIFT)
            }
            (KeyCode::BackTab, KeyCode::BackTab) => {
                (self.modifiers & !KeyModifiers::SHIFT) == (event.modifiers & !KeyModifiers::SHIFT)
            }
            _ => self.code == event.code && self.modifiers == event.modifiers,
        }
    }

    pub fn display(&self) -> String {
        let mut label = String::new();
        for (flag, name) in MODIFIER_NAMES {
            if self.modifiers.contains(*flag) {
                label.push_str(name);
                label.push('+');
            }
        }
        match self.code {
            KeyCode::Char(' ') => label.push_str("Space"),
            KeyCode::Char(c) => label.push(c),
            KeyCode::F(n) => label.push_str(&format!("F{n}")),
            code => label.push_str(
                NAMED_KEYS
                    .iter()
                    .find(|(_, named)| *named == code)
                    .map_or("?", |(name, _)| name),
            ),
        }
        label
    }
}

/// Modifier prefixes in the order they are displayed.
const MODIFIER_NAMES: &[(KeyModifiers, &str)] = &[
    (KeyModifiers::CONTROL, "ctrl"),
    (KeyModifiers::ALT, "alt"),
    (KeyModifiers::SHIFT, "shift"),
];

/// Canonical display names; parsing is case-insensitive.
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("Enter", KeyCode::Enter),
    ("Esc", KeyCode::Esc),
    ("Tab", KeyCode::Tab),
    ("BackTab", KeyCode::BackTab),
    ("Backspace", KeyCode::Backspace),
    ("Delete", KeyCode::Delete),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

fn parse_modifier(name: &str) -> Result<KeyModifiers, KeyParseError> {
    match name.to_lowercase().as_str() {
        "ctrl" | "control" => Ok(KeyModifiers::CONTROL),
        "alt" => Ok(KeyModifiers::ALT),
        "shift" => Ok(KeyModifiers::SHIFT),
        _ => Err(KeyParseError::UnknownModifier(name.to_string())),
    }
}

fn parse_code(name: &str) -> Result<KeyCode, KeyParseError> {
    let lower = name.to_lowercase();
    if let Some((_, code)) = NAMED_KEYS
        .iter()
        .find(|(named, _)| named.eq_ignore_ascii_case(name))
    {
        return Ok(*code);
    }
    match lower.as_str() {
        "return" => return Ok(KeyCode::Enter),
        "escape" => return Ok(KeyCode::Esc),
        "del" => return Ok(KeyCode::Delete),
        "space" => return Ok(KeyCode::Char(' ')),
        _ => {}
    }
    if let Some(number) = lower.strip_prefix('f')
        && let Ok(n) = number.parse()
    {
        return Ok(KeyCode::F(n));
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        // Single characters keep their case
        (Some(c), None) => Ok(KeyCode::Char(c)),
        _ => Err(KeyParseError::UnknownKey(name.to_string())),
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // "+" on its own (or as the last part) is the plus key.
        let (prefix, key) = match s.rsplit_once('+') {
            Some((prefix, "")) => (prefix.strip_suffix('+').unwrap_or(prefix), "+"),
            Some((prefix, key)) => (prefix, key),
            None => ("", s),
        };
        let modifiers = prefix
            .split('+')
            .filter(|part| !part.is_empty())
            .try_fold(KeyModifiers::NONE, |mods, part| {
                parse_modifier(part).map(|flag| mods | flag)
            })?;
        Ok(Self {
            code: parse_code(key)?,
            modifiers,
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.display())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyBinding {
    Single(Key),
    Multiple(Vec<Key>),
}

impl KeyBinding {
    pub const fn multiple(keys: Vec<Key>) -> Self {
        Self::Multiple(keys)
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        match self {
            Self::Single(key) => key.matches(event),
            Self::Multiple(keys) => keys.iter().any(|k| k.matches(event)),
        }
    }

    /// Display string for hints; lists show their first key only.
    pub fn display(&self) -> String {
        match self {
            Self::Single(key) => key.display(),
            Self::Multiple(keys) => keys.first().map(Key::display).unwrap_or_default(),
        }
    }
}

impl From<Key> for KeyBinding {
    fn from(key: Key) -> Self {
        Self::Single(key)
    }
}

impl From<Vec<Key>> for KeyBinding {
    fn from(keys: Vec<Key>) -> Self {
        Self::Multiple(keys)
    }
}
