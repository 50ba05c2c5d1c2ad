//! Menu registry
//!
//! [`MenuRegistry`] owns the binding table and the live accelerator sets of
//! every open window and keeps them consistent:
//!
//! - the binding is the only place an effective accelerator is stored,
//! - every set accelerator on a binding is live in its window, and
//! - a key combination claimed by one binding is released by any other
//!   binding of the same window.
//!
//! All operations run on the UI thread and never block.

use log::{debug, info, warn};
use std::collections::BTreeSet;

use crate::accel::Accelerator;
use crate::action::Action;
use crate::declaration::Declaration;
use crate::dispatch::{ActionDispatcher, InvokeContext, InvokeSource};
use crate::error::RegistryError;
use crate::keymap::AcceleratorManager;
use crate::resources::ResourceStore;
use crate::table::{Binding, BindingHandle, BindingTable, RadioGroupId};
use crate::toolkit::{HandlerBlock, HandlerId, MenuWidget};
use crate::window::WindowId;

/// Per-window outcome of a mirrored rebind
///
/// The window the rebind was requested for comes first. When it fails no
/// other window is touched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RebindReport {
    results: Vec<(WindowId, Result<(), RegistryError>)>,
}

impl RebindReport {
    /// Result for the requesting window
    pub fn origin(&self) -> Option<&Result<(), RegistryError>> {
        self.results.first().map(|(_, r)| r)
    }

    /// The requesting window was rebound
    pub fn is_success(&self) -> bool {
        matches!(self.origin(), Some(Ok(())))
    }

    /// Every attempted window was rebound
    pub fn all_succeeded(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|(_, r)| r.is_ok())
    }

    pub fn get(&self, window: WindowId) -> Option<&Result<(), RegistryError>> {
        self.results
            .iter()
            .find(|(w, _)| *w == window)
            .map(|(_, r)| r)
    }

    pub fn failures(&self) -> impl Iterator<Item = (WindowId, &RegistryError)> {
        self.results
            .iter()
            .filter_map(|(w, r)| r.as_ref().err().map(|e| (*w, e)))
    }

    pub fn windows(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.results.iter().map(|(w, _)| *w)
    }
}

/// Registry of menu bindings and live accelerators
#[derive(Debug)]
pub struct MenuRegistry<W> {
    table: BindingTable<W>,
    keys: AcceleratorManager,
    open: BTreeSet<WindowId>,
}

impl<W: MenuWidget> Default for MenuRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: MenuWidget> MenuRegistry<W> {
    pub fn new() -> Self {
        Self::with_table(BindingTable::new())
    }

    pub fn with_table(table: BindingTable<W>) -> Self {
        Self {
            table,
            keys: AcceleratorManager::new(),
            open: BTreeSet::new(),
        }
    }

    pub fn table(&self) -> &BindingTable<W> {
        &self.table
    }

    pub fn accelerators(&self) -> &AcceleratorManager {
        &self.keys
    }

    pub fn open_window(&mut self, window: WindowId) {
        if self.open.insert(window) {
            debug!("Opened the {} window", window);
        }
    }

    pub fn is_open(&self, window: WindowId) -> bool {
        self.open.contains(&window)
    }

    /// Open windows, primary first
    pub fn open_windows(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.open.iter().copied()
    }

    /// Tear down a window: its bindings and live accelerators are released
    pub fn close_window(&mut self, window: WindowId) -> usize {
        let released = self.keys.release_window(window);
        let removed = self.table.release_window(window).len();
        self.open.remove(&window);
        debug!(
            "Closed the {} window ({} bindings, {} accelerators)",
            window, removed, released
        );
        removed
    }

    /// Register a binding and activate its default accelerator
    pub fn register(
        &mut self,
        declaration: &'static Declaration,
        widget: W,
        window: WindowId,
        handler: Option<HandlerId>,
        radio_group: Option<RadioGroupId>,
    ) -> Result<BindingHandle, RegistryError> {
        let handle = self
            .table
            .register(declaration, widget, window, handler, radio_group)?;
        self.open_window(window);
        if declaration.accel.is_set() {
            self.assign(handle, window, declaration.accel);
        }
        Ok(handle)
    }

    pub fn get(&self, handle: BindingHandle) -> Option<&Binding<W>> {
        self.table.get(handle)
    }

    pub fn find_by_action(&self, action: Action, window: WindowId) -> Option<&Binding<W>> {
        self.table.find_by_action(action, window)
    }

    pub fn find_by_hotkey(&self, accel: Accelerator, window: WindowId) -> Option<&Binding<W>> {
        self.table.find_by_hotkey(accel, window)
    }

    pub fn find_by_index(&self, index: usize) -> Option<&Binding<W>> {
        self.table.find_by_index(index)
    }

    /// Slot count, the bound for [`find_by_index`](Self::find_by_index)
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding<W>> {
        self.table.iter()
    }

    /// Effective accelerator of `action` in `window`, if the action is bound
    pub fn hotkey_for_action(&self, action: Action, window: WindowId) -> Option<Accelerator> {
        self.find_by_action(action, window)
            .map(Binding::accelerator)
    }

    /// Make `accel` the effective, live accelerator of `handle`
    ///
    /// Evicts the previous claimant of `accel` and releases the binding's own
    /// previous combination.
    fn assign(&mut self, handle: BindingHandle, window: WindowId, accel: Accelerator) {
        let accel = accel.normalized();
        let previous = match self.table.get(handle) {
            Some(binding) => binding.accelerator(),
            None => return,
        };
        if previous.is_set()
            && previous != accel
            && self.keys.resolve(window, previous) == Some(handle)
        {
            self.keys.unbind(window, previous);
        }

        if let Some(evicted) = self.keys.bind(window, accel, handle) {
            if let Some(old) = self.table.get_mut(evicted) {
                info!(
                    "{} no longer triggers {} in the {} window",
                    accel,
                    old.action(),
                    window
                );
                old.set_accelerator(Accelerator::NONE);
                old.widget().set_accel_label(Accelerator::NONE);
            }
        }

        if let Some(binding) = self.table.get_mut(handle) {
            binding.set_accelerator(accel);
            binding.widget().set_accel_label(accel);
        }
    }

    /// Rebind `action` in a single window
    pub fn rebind_in_window(
        &mut self,
        action: Action,
        window: WindowId,
        accel: Accelerator,
    ) -> Result<(), RegistryError> {
        let handle = self
            .find_by_action(action, window)
            .map(Binding::handle)
            .ok_or(RegistryError::NotFound { action, window })?;
        debug!(
            "Setting action {} for the {} window to {}",
            action, window, accel
        );
        self.assign(handle, window, accel);
        Ok(())
    }

    /// Rebind `action` to `accel` in `window` and mirror it to every other
    /// open window
    ///
    /// An unset `accel` removes the action's hotkey. Secondary failures are
    /// reported but do not roll back the requesting window.
    pub fn rebind_by_action(
        &mut self,
        action: Action,
        window: WindowId,
        accel: Accelerator,
    ) -> RebindReport {
        let mut report = RebindReport::default();
        let origin = self.rebind_in_window(action, window, accel);
        let proceed = origin.is_ok();
        report.results.push((window, origin));
        if !proceed {
            debug!("Failed to find {} in the {} window", action, window);
            return report;
        }

        let others: Vec<WindowId> = self.open.iter().copied().filter(|w| *w != window).collect();
        for other in others {
            let result = self.rebind_in_window(action, other, accel);
            if let Err(e) = &result {
                warn!("Mirrored rebind failed: {}", e);
            }
            report.results.push((other, result));
        }
        report
    }

    /// Action triggered by `accel` in `window`
    pub fn resolve(&self, accel: Accelerator, window: WindowId) -> Option<Action> {
        self.resolve_binding(accel, window).map(Binding::action)
    }

    pub fn resolve_binding(&self, accel: Accelerator, window: WindowId) -> Option<&Binding<W>> {
        self.keys
            .resolve(window, accel.normalized())
            .and_then(|handle| self.table.get(handle))
    }

    /// Resolve a keypress and run its action through `dispatcher`
    ///
    /// Returns `true` when an action ran.
    pub fn activate<D: ActionDispatcher + ?Sized>(
        &self,
        accel: Accelerator,
        window: WindowId,
        dispatcher: &mut D,
    ) -> bool {
        let Some(binding) = self.resolve_binding(accel, window) else {
            return false;
        };
        let context = InvokeContext {
            window,
            unlocked: binding.is_unlocked(),
            source: InvokeSource::Accelerator,
        };
        dispatcher.invoke(binding.action(), &context)
    }

    /// Unset every binding's stored accelerator
    ///
    /// Live accelerators are left in place; use
    /// [`reset_hotkeys`](Self::reset_hotkeys) to release them too.
    pub fn clear_all_hotkeys(&mut self) {
        self.table.clear_all_hotkeys();
    }

    /// Unset every accelerator, stored and live, and clear the labels
    pub fn reset_hotkeys(&mut self) {
        self.table.clear_all_hotkeys();
        self.keys.release_all();
        for binding in self.table.iter() {
            binding.widget().set_accel_label(Accelerator::NONE);
        }
    }

    /// Replace all hotkeys with the declared defaults
    pub fn restore_default_hotkeys(&mut self) {
        self.reset_hotkeys();
        let defaults: Vec<(BindingHandle, WindowId, Accelerator)> = self
            .table
            .iter()
            .filter(|b| b.declaration().accel.is_set())
            .map(|b| (b.handle(), b.window(), b.declaration().accel))
            .collect();
        for (handle, window, accel) in defaults {
            self.assign(handle, window, accel);
        }
    }

    /// Set a binding's checked state without running its change handler
    ///
    /// Checking a radio item unchecks the rest of its group.
    pub fn set_checked_blocked(
        &self,
        handle: BindingHandle,
        state: bool,
    ) -> Result<(), RegistryError> {
        let binding = self.table.get(handle).ok_or(RegistryError::StaleHandle)?;
        self.write_checked(binding, state);
        Ok(())
    }

    /// Write a checked state with the handlers blocked
    ///
    /// Checking a radio item first unchecks the other members of its group,
    /// each under its own block.
    fn write_checked(&self, binding: &Binding<W>, state: bool) {
        if let (true, Some(group)) = (state, binding.radio_group()) {
            for member in self.radio_group(group, binding.window()) {
                if member.handle() != binding.handle() {
                    let guard = HandlerBlock::new(member.widget(), member.handler());
                    guard.widget().set_active(false);
                }
            }
        }
        let guard = HandlerBlock::new(binding.widget(), binding.handler());
        guard.widget().set_active(state);
    }

    pub fn set_checked_by_action(
        &self,
        action: Action,
        window: WindowId,
        state: bool,
    ) -> Result<(), RegistryError> {
        let handle = self
            .find_by_action(action, window)
            .map(Binding::handle)
            .ok_or(RegistryError::NotFound { action, window })?;
        self.set_checked_blocked(handle, state)
    }

    /// Set the checked state of `action` in every open window; returns how
    /// many items were updated
    pub fn set_checked_by_action_all(&self, action: Action, state: bool) -> usize {
        self.open
            .iter()
            .filter(|w| self.set_checked_by_action(action, **w, state).is_ok())
            .count()
    }

    /// Re-evaluate every check and radio item from `store`
    ///
    /// Returns the number of items whose state was evaluated. Items whose
    /// resource cannot be read keep their state.
    pub fn sync_from_resources<S: ResourceStore + ?Sized>(&self, store: &S) -> usize {
        let mut synced = 0;
        for binding in self.table.iter() {
            match binding.declaration().checked_state(store) {
                Ok(Some(state)) => {
                    self.write_checked(binding, state);
                    synced += 1;
                }
                Ok(None) => {}
                Err(e) => warn!(
                    "Cannot sync \"{}\": {}",
                    binding.declaration().display_label(),
                    e
                ),
            }
        }
        synced
    }

    /// Members of a radio group in declaration order
    pub fn radio_group(&self, group: RadioGroupId, window: WindowId) -> Vec<&Binding<W>> {
        self.table
            .window_bindings(window)
            .filter(|b| b.radio_group() == Some(group))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::keysym;
    use crate::dispatch::ActionMap;
    use crate::headless::{HeadlessToolkit, HeadlessWidget};
    use crate::toolkit::MenuToolkit;
    use std::cell::RefCell;
    use std::rc::Rc;

    const LOAD: Declaration = Declaration::action("Load snapshot", Action::SnapshotLoad)
        .with_accel(Accelerator::ctrl(keysym::L));
    const SAVE: Declaration = Declaration::action("Save snapshot", Action::SnapshotSave)
        .with_accel(Accelerator::ctrl(keysym::S));
    const PASTE: Declaration = Declaration::action("Paste", Action::EditPaste)
        .with_accel(Accelerator::alt(keysym::V))
        .unlocked();
    const WARP: Declaration = Declaration::check("Warp mode", Action::WarpModeToggle, "WarpMode");
    const ITEMS: &[Declaration] = &[LOAD, SAVE, PASTE, WARP];

    fn setup(windows: &[WindowId]) -> (MenuRegistry<HeadlessWidget>, HeadlessToolkit) {
        let mut tk = HeadlessToolkit::new();
        let mut reg = MenuRegistry::new();
        for &window in windows {
            for decl in ITEMS {
                let widget = tk.create_item(None, decl, window);
                let handler = tk.connect_handler(&widget, decl, window);
                reg.register(decl, widget, window, Some(handler), None).unwrap();
            }
        }
        (reg, tk)
    }

    #[test]
    fn test_defaults_are_live() {
        let (reg, _tk) = setup(&[WindowId::Primary]);
        let ctrl_l = Accelerator::ctrl(keysym::L);
        assert_eq!(reg.resolve(ctrl_l, WindowId::Primary), Some(Action::SnapshotLoad));
        let binding = reg.find_by_action(Action::SnapshotLoad, WindowId::Primary).unwrap();
        assert_eq!(binding.widget().accel_label(), ctrl_l);
    }

    #[test]
    fn test_rebind_moves_hotkey() {
        let (mut reg, _tk) = setup(&[WindowId::Primary]);
        let f5 = Accelerator::key(keysym::F1 + 4);

        let report = reg.rebind_by_action(Action::SnapshotLoad, WindowId::Primary, f5);
        assert!(report.is_success());
        assert_eq!(reg.resolve(f5, WindowId::Primary), Some(Action::SnapshotLoad));
        // The old combination no longer triggers anything
        assert_eq!(reg.resolve(Accelerator::ctrl(keysym::L), WindowId::Primary), None);
        assert_eq!(
            reg.hotkey_for_action(Action::SnapshotLoad, WindowId::Primary),
            Some(f5)
        );
    }

    #[test]
    fn test_rebind_evicts_previous_claimant() {
        let (mut reg, _tk) = setup(&[WindowId::Primary]);
        let combo = Accelerator::ctrl(keysym::J);

        reg.rebind_by_action(Action::SnapshotLoad, WindowId::Primary, combo);
        reg.rebind_by_action(Action::SnapshotSave, WindowId::Primary, combo);

        let hit = reg.find_by_hotkey(combo, WindowId::Primary).unwrap();
        assert_eq!(hit.action(), Action::SnapshotSave);
        let load = reg.find_by_action(Action::SnapshotLoad, WindowId::Primary).unwrap();
        assert!(!load.accelerator().is_set());
        assert_eq!(load.widget().accel_label(), Accelerator::NONE);
        assert_eq!(reg.resolve(combo, WindowId::Primary), Some(Action::SnapshotSave));
    }

    #[test]
    fn test_rebind_unknown_action_fails() {
        let (mut reg, _tk) = setup(&[WindowId::Primary, WindowId::Secondary]);
        let report = reg.rebind_by_action(Action::Quit, WindowId::Primary, Accelerator::ctrl(keysym::Q));
        assert!(!report.is_success());
        assert_eq!(
            report.origin(),
            Some(&Err(RegistryError::NotFound {
                action: Action::Quit,
                window: WindowId::Primary
            }))
        );
        // Nothing was mirrored
        assert_eq!(report.windows().count(), 1);
    }

    #[test]
    fn test_rebind_mirrors_to_other_window() {
        let (mut reg, _tk) = setup(&[WindowId::Primary, WindowId::Secondary]);
        let combo = Accelerator::ctrl_shift(keysym::S);

        let report = reg.rebind_by_action(Action::SnapshotSave, WindowId::Primary, combo);
        assert!(report.all_succeeded());
        assert_eq!(
            report.windows().collect::<Vec<_>>(),
            vec![WindowId::Primary, WindowId::Secondary]
        );
        for window in WindowId::ALL {
            assert_eq!(reg.hotkey_for_action(Action::SnapshotSave, window), Some(combo));
            assert_eq!(reg.resolve(combo, window), Some(Action::SnapshotSave));
        }
    }

    #[test]
    fn test_mirror_failure_is_reported() {
        let (mut reg, mut tk) = setup(&[WindowId::Primary]);
        // The secondary window only carries part of the menu
        let widget = tk.create_item(None, &LOAD, WindowId::Secondary);
        reg.register(&LOAD, widget, WindowId::Secondary, None, None).unwrap();

        let combo = Accelerator::ctrl(keysym::T);
        let report = reg.rebind_by_action(Action::SnapshotSave, WindowId::Primary, combo);
        assert!(report.is_success());
        assert!(!report.all_succeeded());
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, WindowId::Secondary);
        // The primary window keeps its new hotkey
        assert_eq!(reg.resolve(combo, WindowId::Primary), Some(Action::SnapshotSave));
    }

    #[test]
    fn test_unset_accel_removes_hotkey() {
        let (mut reg, _tk) = setup(&[WindowId::Primary]);
        let report = reg.rebind_by_action(Action::SnapshotSave, WindowId::Primary, Accelerator::NONE);
        assert!(report.is_success());
        assert_eq!(reg.resolve(Accelerator::ctrl(keysym::S), WindowId::Primary), None);
        assert_eq!(
            reg.hotkey_for_action(Action::SnapshotSave, WindowId::Primary),
            Some(Accelerator::NONE)
        );
    }

    #[test]
    fn test_clear_all_hotkeys_leaves_live_set() {
        let (mut reg, _tk) = setup(&[WindowId::Primary]);
        let ctrl_s = Accelerator::ctrl(keysym::S);

        reg.clear_all_hotkeys();
        assert!(reg.iter().all(|b| !b.accelerator().is_set()));
        assert!(reg.find_by_hotkey(ctrl_s, WindowId::Primary).is_none());
        assert!(reg.accelerators().live_count(WindowId::Primary) > 0);

        reg.reset_hotkeys();
        assert_eq!(reg.resolve(ctrl_s, WindowId::Primary), None);
        assert_eq!(reg.accelerators().live_count(WindowId::Primary), 0);
    }

    #[test]
    fn test_restore_defaults() {
        let (mut reg, _tk) = setup(&[WindowId::Primary]);
        reg.rebind_by_action(Action::SnapshotLoad, WindowId::Primary, Accelerator::ctrl(keysym::S));
        assert_eq!(
            reg.hotkey_for_action(Action::SnapshotSave, WindowId::Primary),
            Some(Accelerator::NONE)
        );

        reg.restore_default_hotkeys();
        assert_eq!(
            reg.resolve(Accelerator::ctrl(keysym::S), WindowId::Primary),
            Some(Action::SnapshotSave)
        );
        assert_eq!(
            reg.resolve(Accelerator::ctrl(keysym::L), WindowId::Primary),
            Some(Action::SnapshotLoad)
        );
    }

    #[test]
    fn test_activate_passes_context() {
        let (reg, _tk) = setup(&[WindowId::Primary, WindowId::Secondary]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut map = ActionMap::new();
        let sink = Rc::clone(&seen);
        map.register(Action::EditPaste, move |ctx| sink.borrow_mut().push(*ctx));

        assert!(reg.activate(Accelerator::alt(keysym::V), WindowId::Secondary, &mut map));
        assert!(!reg.activate(Accelerator::alt(keysym::C), WindowId::Secondary, &mut map));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].window, WindowId::Secondary);
        assert!(seen[0].unlocked);
        assert_eq!(seen[0].source, InvokeSource::Accelerator);
    }

    #[test]
    fn test_programmatic_check_runs_no_handler() {
        let (reg, tk) = setup(&[WindowId::Primary, WindowId::Secondary]);

        reg.set_checked_by_action(Action::WarpModeToggle, WindowId::Primary, true)
            .unwrap();
        assert_eq!(reg.set_checked_by_action_all(Action::WarpModeToggle, false), 2);
        assert_eq!(tk.pending(), 0);

        // User interaction still reaches the handler
        let warp = reg.find_by_action(Action::WarpModeToggle, WindowId::Primary).unwrap();
        warp.widget().click();
        assert_eq!(tk.pending(), 1);
        assert!(!warp.widget().is_blocked());
    }

    #[test]
    fn test_failed_register_leaves_window_closed() {
        let mut tk = HeadlessToolkit::new();
        let mut reg = MenuRegistry::with_table(BindingTable::with_capacity(Some(1)));
        let widget = tk.create_item(None, &LOAD, WindowId::Primary);
        reg.register(&LOAD, widget, WindowId::Primary, None, None).unwrap();

        let widget = tk.create_item(None, &LOAD, WindowId::Secondary);
        let err = reg
            .register(&LOAD, widget, WindowId::Secondary, None, None)
            .unwrap_err();
        assert_eq!(err, RegistryError::CapacityExceeded { capacity: 1 });
        assert!(!reg.is_open(WindowId::Secondary));

        let report = reg.rebind_by_action(Action::SnapshotLoad, WindowId::Primary, Accelerator::ctrl(keysym::O));
        assert!(report.all_succeeded());
        assert_eq!(report.windows().collect::<Vec<_>>(), vec![WindowId::Primary]);
    }

    #[test]
    fn test_close_window_releases_everything() {
        let (mut reg, _tk) = setup(&[WindowId::Primary, WindowId::Secondary]);
        let stale = reg.find_by_action(Action::SnapshotLoad, WindowId::Secondary).unwrap().handle();

        assert_eq!(reg.close_window(WindowId::Secondary), ITEMS.len());
        assert!(!reg.is_open(WindowId::Secondary));
        assert_eq!(reg.resolve(Accelerator::ctrl(keysym::L), WindowId::Secondary), None);
        assert!(reg.get(stale).is_none());
        assert_eq!(reg.set_checked_blocked(stale, true), Err(RegistryError::StaleHandle));

        // Rebinding no longer mirrors into the closed window
        let report = reg.rebind_by_action(Action::SnapshotLoad, WindowId::Primary, Accelerator::ctrl(keysym::O));
        assert_eq!(report.windows().collect::<Vec<_>>(), vec![WindowId::Primary]);
    }
}
