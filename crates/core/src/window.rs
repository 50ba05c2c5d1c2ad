//! Window addressing
//!
//! A process has one primary window and, for dual-display machines, one
//! secondary window. Both windows carry their own instance of the same menu.

use std::fmt;

use crate::error::RegistryError;

/// Top-level window a binding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WindowId {
    Primary,
    Secondary,
}

impl WindowId {
    pub const ALL: [WindowId; 2] = [WindowId::Primary, WindowId::Secondary];

    /// Raw window index as used by the emulator UI
    pub fn index(self) -> i32 {
        match self {
            WindowId::Primary => 0,
            WindowId::Secondary => 1,
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(WindowId::Primary),
            1 => Some(WindowId::Secondary),
            _ => None,
        }
    }
}

impl TryFrom<i32> for WindowId {
    type Error = RegistryError;

    fn try_from(index: i32) -> Result<Self, Self::Error> {
        WindowId::from_index(index).ok_or(RegistryError::InvalidWindowId(index))
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowId::Primary => f.write_str("primary"),
            WindowId::Secondary => f.write_str("secondary"),
        }
    }
}
