//! Error types for the menu registry

use thiserror::Error;

use crate::action::Action;
use crate::window::WindowId;

/// Errors raised by the binding table and the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The static menu declarations exceed the table size. Callers building
    /// the startup menu should treat this as fatal.
    #[error("Menu item references table is full ({capacity} entries)")]
    CapacityExceeded { capacity: usize },
    #[error("No binding for action {action} in the {window} window")]
    NotFound { action: Action, window: WindowId },
    #[error("Invalid window ID of {0}")]
    InvalidWindowId(i32),
    #[error("Invalid action ID of {0}")]
    InvalidAction(i32),
    #[error("Action {action} is already bound in the {window} window")]
    DuplicateBinding { action: Action, window: WindowId },
    #[error("Binding handle is stale")]
    StaleHandle,
}

/// Errors raised by the configuration store
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Unknown resource: {0}")]
    Unknown(String),
    #[error("Resource {name} is not of {expected} type")]
    TypeMismatch { name: String, expected: &'static str },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when parsing an accelerator string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccelParseError {
    #[error("Unknown modifier: {0}")]
    UnknownModifier(String),
    #[error("Unknown key: {0}")]
    UnknownKey(String),
    #[error("Missing key in accelerator: {0}")]
    MissingKey(String),
}

/// Errors raised when loading or applying a hotkey profile
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown action name: {0}")]
    UnknownAction(String),
    #[error("Invalid hotkey for {action}: {source}")]
    BadAccelerator {
        action: String,
        source: AccelParseError,
    },
}
