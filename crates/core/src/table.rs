//! Binding table
//!
//! The authoritative set of runtime bindings. Each binding pairs one
//! [`Declaration`] with the widget created for it in one window, the effective
//! accelerator and the handler hookup used to block change notifications.
//!
//! Bindings live in a slot vector addressed by [`BindingHandle`]s. Closing a
//! window frees its slots; a freed slot is reused with a bumped generation, so
//! handles into a closed window never match again.

use log::{debug, error, warn};
use std::collections::HashMap;

use crate::accel::Accelerator;
use crate::action::Action;
use crate::declaration::Declaration;
use crate::error::RegistryError;
use crate::toolkit::HandlerId;
use crate::window::WindowId;

/// Default maximum number of live bindings
///
/// The largest machine menu declares roughly 250 entries per window.
pub const DEFAULT_CAPACITY: usize = 512;

/// Stable reference to a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingHandle {
    index: u32,
    generation: u32,
}

impl BindingHandle {
    /// Slot index, usable with [`BindingTable::find_by_index`]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Radio group identifier, assigned in declaration order per window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RadioGroupId(pub u32);

/// Runtime pairing of a declaration with its widget in one window
#[derive(Debug)]
pub struct Binding<W> {
    handle: BindingHandle,
    declaration: &'static Declaration,
    widget: W,
    window: WindowId,
    accel: Accelerator,
    handler: Option<HandlerId>,
    radio_group: Option<RadioGroupId>,
}

impl<W> Binding<W> {
    pub fn handle(&self) -> BindingHandle {
        self.handle
    }

    pub fn declaration(&self) -> &'static Declaration {
        self.declaration
    }

    pub fn action(&self) -> Action {
        self.declaration.action
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Currently effective accelerator (may differ from the declared default)
    pub fn accelerator(&self) -> Accelerator {
        self.accel
    }

    pub fn handler(&self) -> Option<HandlerId> {
        self.handler
    }

    pub fn radio_group(&self) -> Option<RadioGroupId> {
        self.radio_group
    }

    pub fn is_unlocked(&self) -> bool {
        self.declaration.unlocked
    }

    pub(crate) fn set_accelerator(&mut self, accel: Accelerator) {
        self.accel = accel;
    }
}

#[derive(Debug)]
struct Slot<W> {
    generation: u32,
    binding: Option<Binding<W>>,
}

/// Bounded table of bindings with lookup by action, hotkey and index
#[derive(Debug)]
pub struct BindingTable<W> {
    slots: Vec<Slot<W>>,
    free: Vec<u32>,
    by_action: HashMap<(Action, WindowId), BindingHandle>,
    live: usize,
    capacity: Option<usize>,
}

impl<W> Default for BindingTable<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> BindingTable<W> {
    /// Table bounded at [`DEFAULT_CAPACITY`]
    pub fn new() -> Self {
        Self::with_capacity(Some(DEFAULT_CAPACITY))
    }

    /// Table bounded at `capacity` live bindings, or unbounded for `None`
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_action: HashMap::new(),
            live: 0,
            capacity,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of slots, including freed ones; the bound for index iteration
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of live bindings
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Add a binding
    ///
    /// Entries whose action is [`Action::None`] are stored but never returned
    /// by [`find_by_action`](Self::find_by_action).
    pub fn register(
        &mut self,
        declaration: &'static Declaration,
        widget: W,
        window: WindowId,
        handler: Option<HandlerId>,
        radio_group: Option<RadioGroupId>,
    ) -> Result<BindingHandle, RegistryError> {
        if let Some(capacity) = self.capacity {
            if self.live >= capacity {
                error!("Menu item references table is FULL ({} entries)", capacity);
                return Err(RegistryError::CapacityExceeded { capacity });
            }
        }

        let action = declaration.action;
        if !action.is_none() && self.by_action.contains_key(&(action, window)) {
            return Err(RegistryError::DuplicateBinding { action, window });
        }

        let (index, generation) = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.generation = slot.generation.wrapping_add(1);
                (index, slot.generation)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    binding: None,
                });
                ((self.slots.len() - 1) as u32, 0)
            }
        };

        let handle = BindingHandle { index, generation };
        self.slots[index as usize].binding = Some(Binding {
            handle,
            declaration,
            widget,
            window,
            accel: declaration.accel.normalized(),
            handler,
            radio_group,
        });
        if !action.is_none() {
            self.by_action.insert((action, window), handle);
        }
        self.live += 1;

        debug!(
            "Added item {}, action = {}, window = {}",
            self.live, action, window
        );
        Ok(handle)
    }

    pub fn get(&self, handle: BindingHandle) -> Option<&Binding<W>> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.binding.as_ref())
    }

    pub fn get_mut(&mut self, handle: BindingHandle) -> Option<&mut Binding<W>> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.binding.as_mut())
    }

    /// Look up the binding of `action` in `window`
    pub fn find_by_action(&self, action: Action, window: WindowId) -> Option<&Binding<W>> {
        if action.is_none() {
            return None;
        }
        self.by_action
            .get(&(action, window))
            .and_then(|handle| self.get(*handle))
    }

    /// Look up by raw action and window ids, as handed over by emulator code
    ///
    /// Out-of-range input yields `None`.
    pub fn find_by_raw_action(&self, action_id: i32, window_index: i32) -> Option<&Binding<W>> {
        let Some(window) = WindowId::from_index(window_index) else {
            warn!("Invalid window ID of {}.", window_index);
            return None;
        };
        Action::from_id(action_id).and_then(|action| self.find_by_action(action, window))
    }

    /// First binding in `window` whose effective accelerator is `accel`
    ///
    /// An unset accelerator never matches.
    pub fn find_by_hotkey(&self, accel: Accelerator, window: WindowId) -> Option<&Binding<W>> {
        if !accel.is_set() {
            return None;
        }
        let accel = accel.normalized();
        self.iter()
            .find(|b| b.window == window && b.accel == accel)
    }

    /// Positional access for enumeration; freed slots yield `None`
    pub fn find_by_index(&self, index: usize) -> Option<&Binding<W>> {
        self.slots.get(index).and_then(|slot| slot.binding.as_ref())
    }

    /// Live bindings in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Binding<W>> {
        self.slots.iter().filter_map(|slot| slot.binding.as_ref())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Binding<W>> {
        self.slots.iter_mut().filter_map(|slot| slot.binding.as_mut())
    }

    /// Bindings belonging to `window`
    pub fn window_bindings(&self, window: WindowId) -> impl Iterator<Item = &Binding<W>> {
        self.iter().filter(move |b| b.window == window)
    }

    /// Reset every binding's accelerator to unset
    ///
    /// Only touches the stored accelerators: live key dispatch is owned by the
    /// accelerator manager and must be released separately.
    pub fn clear_all_hotkeys(&mut self) {
        for binding in self.iter_mut() {
            binding.accel = Accelerator::NONE;
        }
    }

    /// Free every binding of `window` and return the removed bindings
    pub fn release_window(&mut self, window: WindowId) -> Vec<Binding<W>> {
        let mut removed = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.binding.as_ref().is_some_and(|b| b.window == window) {
                if let Some(binding) = slot.binding.take() {
                    self.by_action.remove(&(binding.action(), window));
                    self.free.push(index as u32);
                    removed.push(binding);
                }
            }
        }
        self.live -= removed.len();
        debug!("Released {} bindings of the {} window", removed.len(), window);
        removed
    }
}
