//! Live accelerator dispatch
//!
//! The [`AcceleratorManager`] owns the per-window map from key combination to
//! binding that keypresses are resolved against. Resolution is a hash lookup,
//! so it stays cheap on the input thread regardless of menu size.

use log::debug;
use std::collections::HashMap;

use crate::accel::Accelerator;
use crate::table::BindingHandle;
use crate::window::WindowId;

/// Per-window live accelerator sets
#[derive(Debug, Default)]
pub struct AcceleratorManager {
    windows: HashMap<WindowId, HashMap<Accelerator, BindingHandle>>,
}

impl AcceleratorManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate `accel` for `handle` in `window`
    ///
    /// A different binding holding the same combination loses it; its handle
    /// is returned so the caller can update that binding. Unset accelerators
    /// are ignored.
    pub fn bind(
        &mut self,
        window: WindowId,
        accel: Accelerator,
        handle: BindingHandle,
    ) -> Option<BindingHandle> {
        if !accel.is_set() {
            return None;
        }
        let previous = self
            .windows
            .entry(window)
            .or_default()
            .insert(accel, handle);
        match previous {
            Some(old) if old != handle => {
                debug!(
                    "{} in the {} window moves from slot {} to slot {}",
                    accel,
                    window,
                    old.index(),
                    handle.index()
                );
                Some(old)
            }
            _ => None,
        }
    }

    /// Remove the mapping for `accel`; absent mappings are not an error
    pub fn unbind(&mut self, window: WindowId, accel: Accelerator) -> Option<BindingHandle> {
        self.windows
            .get_mut(&window)
            .and_then(|keys| keys.remove(&accel))
    }

    /// Binding that `accel` triggers in `window`
    pub fn resolve(&self, window: WindowId, accel: Accelerator) -> Option<BindingHandle> {
        self.windows
            .get(&window)
            .and_then(|keys| keys.get(&accel))
            .copied()
    }

    /// Drop the whole live set of `window`; returns how many mappings went away
    pub fn release_window(&mut self, window: WindowId) -> usize {
        self.windows.remove(&window).map_or(0, |keys| keys.len())
    }

    pub fn release_all(&mut self) {
        self.windows.clear();
    }

    /// Number of live accelerators in `window`
    pub fn live_count(&self, window: WindowId) -> usize {
        self.windows.get(&window).map_or(0, HashMap::len)
    }

    /// Live accelerators of `window`, unordered
    pub fn iter(&self, window: WindowId) -> impl Iterator<Item = (Accelerator, BindingHandle)> + '_ {
        self.windows
            .get(&window)
            .into_iter()
            .flat_map(|keys| keys.iter().map(|(a, h)| (*a, *h)))
    }
}
