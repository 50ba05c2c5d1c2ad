//! Keyboard accelerators
//!
//! An [`Accelerator`] is a key code plus a modifier mask. Key codes follow the
//! X11/GDK keysym numbering so toolkit adapters can pass them through unchanged.
//! A zero key code means "unset".
//!
//! Accelerators parse from and format to human-readable strings of the form
//! `[modifiers+]key`, e.g. `"Ctrl+Shift+Q"`, `"F10"` or `"Alt+8"`.

use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;

use crate::error::AccelParseError;

bitflags! {
    /// Modifier mask (bit positions match GDK's modifier type)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
    pub struct Modifiers: u32 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 2;
        const ALT = 1 << 3;
        const SUPER = 1 << 26;
        const META = 1 << 28;
    }
}

/// Key codes for the keys the emulator menus use
pub mod keysym {
    pub const SPACE: u32 = 0x0020;
    pub const KEY_0: u32 = 0x0030;
    pub const KEY_1: u32 = 0x0031;
    pub const KEY_8: u32 = 0x0038;
    pub const KEY_9: u32 = 0x0039;
    pub const A: u32 = 0x0061;
    pub const C: u32 = 0x0063;
    pub const D: u32 = 0x0064;
    pub const H: u32 = 0x0068;
    pub const J: u32 = 0x006a;
    pub const L: u32 = 0x006c;
    pub const M: u32 = 0x006d;
    pub const O: u32 = 0x006f;
    pub const P: u32 = 0x0070;
    pub const Q: u32 = 0x0071;
    pub const S: u32 = 0x0073;
    pub const T: u32 = 0x0074;
    pub const V: u32 = 0x0076;
    pub const W: u32 = 0x0077;
    pub const Z: u32 = 0x007a;
    pub const BACKSPACE: u32 = 0xff08;
    pub const TAB: u32 = 0xff09;
    pub const RETURN: u32 = 0xff0d;
    pub const PAUSE: u32 = 0xff13;
    pub const ESCAPE: u32 = 0xff1b;
    pub const HOME: u32 = 0xff50;
    pub const LEFT: u32 = 0xff51;
    pub const UP: u32 = 0xff52;
    pub const RIGHT: u32 = 0xff53;
    pub const DOWN: u32 = 0xff54;
    pub const PAGE_UP: u32 = 0xff55;
    pub const PAGE_DOWN: u32 = 0xff56;
    pub const END: u32 = 0xff57;
    pub const INSERT: u32 = 0xff63;
    pub const F1: u32 = 0xffbe;
    pub const F9: u32 = 0xffc6;
    pub const F10: u32 = 0xffc7;
    pub const F11: u32 = 0xffc8;
    pub const F12: u32 = 0xffc9;
    pub const DELETE: u32 = 0xffff;
}

/// Named keys that are not letters, digits or function keys
const NAMED_KEYS: &[(&str, u32)] = &[
    ("Space", keysym::SPACE),
    ("Backspace", keysym::BACKSPACE),
    ("Tab", keysym::TAB),
    ("Enter", keysym::RETURN),
    ("Pause", keysym::PAUSE),
    ("Escape", keysym::ESCAPE),
    ("Home", keysym::HOME),
    ("Left", keysym::LEFT),
    ("Up", keysym::UP),
    ("Right", keysym::RIGHT),
    ("Down", keysym::DOWN),
    ("PageUp", keysym::PAGE_UP),
    ("PageDown", keysym::PAGE_DOWN),
    ("End", keysym::END),
    ("Insert", keysym::INSERT),
    ("Delete", keysym::DELETE),
];

/// Display order of modifiers
const MODIFIER_NAMES: &[(Modifiers, &str)] = &[
    (Modifiers::CONTROL, "Ctrl"),
    (Modifiers::SHIFT, "Shift"),
    (Modifiers::ALT, "Alt"),
    (Modifiers::SUPER, "Super"),
    (Modifiers::META, "Meta"),
];

/// Keyboard shortcut: key code plus modifier mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Accelerator {
    pub keysym: u32,
    pub modifiers: Modifiers,
}

impl Accelerator {
    /// The unset accelerator
    pub const NONE: Accelerator = Accelerator {
        keysym: 0,
        modifiers: Modifiers::empty(),
    };

    /// Uppercase letter key codes are folded to lowercase; Shift is carried
    /// by the mask alone
    pub const fn new(keysym: u32, modifiers: Modifiers) -> Self {
        let keysym = if keysym >= 'A' as u32 && keysym <= 'Z' as u32 {
            keysym + ('a' as u32 - 'A' as u32)
        } else {
            keysym
        };
        Self { keysym, modifiers }
    }

    /// Canonical form of an accelerator built from its raw fields
    pub const fn normalized(self) -> Self {
        Self::new(self.keysym, self.modifiers)
    }

    /// Accelerator without modifiers
    pub const fn key(keysym: u32) -> Self {
        Self::new(keysym, Modifiers::empty())
    }

    pub const fn ctrl(keysym: u32) -> Self {
        Self::new(keysym, Modifiers::CONTROL)
    }

    pub const fn alt(keysym: u32) -> Self {
        Self::new(keysym, Modifiers::ALT)
    }

    pub const fn ctrl_shift(keysym: u32) -> Self {
        Self::new(keysym, Modifiers::CONTROL.union(Modifiers::SHIFT))
    }

    /// An accelerator is set when it has a non-zero key code
    pub const fn is_set(&self) -> bool {
        self.keysym != 0
    }
}

/// Convert a key name to its key code
fn key_from_name(name: &str) -> Option<u32> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        // Letters are stored lowercase, the shift state lives in the mask
        if c.is_ascii_alphabetic() {
            return Some(c.to_ascii_lowercase() as u32);
        }
        if c.is_ascii_digit() || c.is_ascii_punctuation() {
            return Some(c as u32);
        }
    }

    if let Some(n) = name
        .strip_prefix('F')
        .and_then(|n| n.parse::<u32>().ok())
    {
        if (1..=12).contains(&n) {
            return Some(keysym::F1 + n - 1);
        }
    }

    if let Some(hex) = name.strip_prefix("0x") {
        return u32::from_str_radix(hex, 16).ok().filter(|k| *k != 0);
    }

    NAMED_KEYS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, k)| *k)
}

/// Convert a key code to its display name
fn key_name(key: u32) -> String {
    if let Some(c) = char::from_u32(key) {
        if c.is_ascii_alphabetic() {
            return c.to_ascii_uppercase().to_string();
        }
        if c.is_ascii_digit() || c.is_ascii_punctuation() {
            return c.to_string();
        }
    }
    if (keysym::F1..=keysym::F12).contains(&key) {
        return format!("F{}", key - keysym::F1 + 1);
    }
    NAMED_KEYS
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(n, _)| n.to_string())
        .unwrap_or_else(|| format!("0x{:04x}", key))
}

fn modifier_from_name(name: &str) -> Option<Modifiers> {
    match name.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Some(Modifiers::CONTROL),
        "shift" => Some(Modifiers::SHIFT),
        "alt" => Some(Modifiers::ALT),
        "super" => Some(Modifiers::SUPER),
        "meta" | "cmd" => Some(Modifiers::META),
        _ => None,
    }
}

impl FromStr for Accelerator {
    type Err = AccelParseError;

    /// Parse `[modifiers+]key`. An empty string or `"none"` yields [`Accelerator::NONE`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(Accelerator::NONE);
        }

        // "Ctrl++" binds the plus key
        let (mods_part, key_part) = match s.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None if s == "+" => ("", "+"),
            None => match s.rsplit_once('+') {
                Some((mods, key)) => (mods, key),
                None => ("", s),
            },
        };

        if key_part.is_empty() {
            return Err(AccelParseError::MissingKey(s.to_string()));
        }

        let mut modifiers = Modifiers::empty();
        if !mods_part.is_empty() {
            for part in mods_part.split('+') {
                let m = modifier_from_name(part.trim())
                    .ok_or_else(|| AccelParseError::UnknownModifier(part.to_string()))?;
                modifiers |= m;
            }
        }

        let keysym = key_from_name(key_part.trim())
            .ok_or_else(|| AccelParseError::UnknownKey(key_part.to_string()))?;

        Ok(Accelerator::new(keysym, modifiers))
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_set() {
            return f.write_str("none");
        }
        for (m, name) in MODIFIER_NAMES {
            if self.modifiers.contains(*m) {
                write!(f, "{}+", name)?;
            }
        }
        f.write_str(&key_name(self.keysym))
    }
}
