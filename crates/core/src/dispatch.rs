//! Action dispatch
//!
//! Resolution of a keypress or a menu activation ends in a call to
//! [`ActionDispatcher::invoke`]. The registry does not know how actions are
//! implemented; [`ActionMap`] is the usual implementation, a table of handler
//! closures keyed by action.

use log::warn;
use std::collections::HashMap;

use crate::action::Action;
use crate::window::WindowId;

/// What triggered an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeSource {
    /// The user activated the menu item
    Menu,
    /// A keyboard accelerator resolved to the action
    Accelerator,
}

/// Context passed along with an action invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvokeContext {
    pub window: WindowId,
    /// The handler runs without holding the emulation lock and must not touch
    /// shared emulator state
    pub unlocked: bool,
    pub source: InvokeSource,
}

/// Capability interface implemented by whatever runs actions
pub trait ActionDispatcher {
    /// Run `action`; returns `false` when no handler exists
    fn invoke(&mut self, action: Action, context: &InvokeContext) -> bool;
}

type Handler = Box<dyn FnMut(&InvokeContext)>;

/// Handler table keyed by action
#[derive(Default)]
pub struct ActionMap {
    handlers: HashMap<Action, Handler>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for `action`
    pub fn register<F>(&mut self, action: Action, handler: F) -> bool
    where
        F: FnMut(&InvokeContext) + 'static,
    {
        self.handlers.insert(action, Box::new(handler)).is_some()
    }

    pub fn unregister(&mut self, action: Action) -> bool {
        self.handlers.remove(&action).is_some()
    }

    pub fn contains(&self, action: Action) -> bool {
        self.handlers.contains_key(&action)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl ActionDispatcher for ActionMap {
    fn invoke(&mut self, action: Action, context: &InvokeContext) -> bool {
        match self.handlers.get_mut(&action) {
            Some(handler) => {
                handler(context);
                true
            }
            None => {
                warn!("No handler registered for action {}", action);
                false
            }
        }
    }
}
