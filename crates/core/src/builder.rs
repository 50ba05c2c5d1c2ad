//! Menu construction
//!
//! Walks a declaration table for one window, creates the widgets through the
//! toolkit and registers a binding for every entry. Check and radio items get
//! their initial state from the resource store before their handler is
//! connected, so building a menu never triggers an action.

use log::{debug, warn};

use crate::declaration::{Declaration, ItemKind};
use crate::error::RegistryError;
use crate::registry::MenuRegistry;
use crate::resources::ResourceStore;
use crate::table::RadioGroupId;
use crate::toolkit::{MenuToolkit, MenuWidget};
use crate::window::WindowId;

/// Builds one window's menu into a registry
pub struct MenuBuilder<'a, T: MenuToolkit, S: ResourceStore + ?Sized> {
    registry: &'a mut MenuRegistry<T::Widget>,
    toolkit: &'a mut T,
    resources: &'a S,
    window: WindowId,
    next_group: u32,
    registered: usize,
}

impl<'a, T: MenuToolkit, S: ResourceStore + ?Sized> MenuBuilder<'a, T, S> {
    pub fn new(
        registry: &'a mut MenuRegistry<T::Widget>,
        toolkit: &'a mut T,
        resources: &'a S,
        window: WindowId,
    ) -> Self {
        Self {
            registry,
            toolkit,
            resources,
            window,
            next_group: 0,
            registered: 0,
        }
    }

    /// Add `items` to the window's menu bar; returns the number of bindings
    /// registered (submenu contents included)
    ///
    /// If building the menu of a window that was not open fails, the
    /// bindings registered so far are released and the window stays closed.
    pub fn build(mut self, items: &'static [Declaration]) -> Result<usize, RegistryError> {
        let was_open = self.registry.is_open(self.window);
        if let Err(e) = self.add_items(None, items) {
            if !was_open {
                let released = self.registry.close_window(self.window);
                warn!(
                    "Dropped the partial {} window menu ({} items): {}",
                    self.window, released, e
                );
            }
            return Err(e);
        }
        debug!(
            "Built the {} window menu with {} items",
            self.window, self.registered
        );
        Ok(self.registered)
    }

    fn add_items(
        &mut self,
        parent: Option<&T::Widget>,
        items: &'static [Declaration],
    ) -> Result<(), RegistryError> {
        // A contiguous run of radio items forms one group
        let mut group: Option<RadioGroupId> = None;

        for decl in items {
            let widget = self.toolkit.create_item(parent, decl, self.window);
            let mut handler = None;
            let mut radio_group = None;

            match decl.kind {
                ItemKind::Submenu(_) | ItemKind::Separator => group = None,
                ItemKind::Action | ItemKind::Check => group = None,
                ItemKind::RadioInt(_) | ItemKind::RadioStr(_) => {
                    radio_group = Some(match group {
                        Some(id) => id,
                        None => {
                            let id = RadioGroupId(self.next_group);
                            self.next_group += 1;
                            group = Some(id);
                            id
                        }
                    });
                }
            }

            if decl.is_activatable() {
                if decl.action.is_none() {
                    // Nothing to run: grey the item out
                    widget.set_sensitive(false);
                } else {
                    self.apply_initial_state(&widget, decl);
                    handler = Some(self.toolkit.connect_handler(&widget, decl, self.window));
                }
            }

            self.registry
                .register(decl, widget.clone(), self.window, handler, radio_group)?;
            self.registered += 1;

            if let ItemKind::Submenu(children) = decl.kind {
                self.add_items(Some(&widget), children)?;
            }
        }
        Ok(())
    }

    fn apply_initial_state(&self, widget: &T::Widget, decl: &Declaration) {
        match decl.checked_state(self.resources) {
            Ok(Some(state)) => widget.set_active(state),
            Ok(None) => {}
            Err(e) => warn!("Cannot read state of \"{}\": {}", decl.display_label(), e),
        }
    }
}

/// Build `items` as the menu of `window`
pub fn build_menu<T, S>(
    registry: &mut MenuRegistry<T::Widget>,
    toolkit: &mut T,
    resources: &S,
    window: WindowId,
    items: &'static [Declaration],
) -> Result<usize, RegistryError>
where
    T: MenuToolkit,
    S: ResourceStore + ?Sized,
{
    MenuBuilder::new(registry, toolkit, resources, window).build(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::{keysym, Accelerator};
    use crate::action::Action;
    use crate::headless::{HeadlessToolkit, HeadlessWidget};
    use crate::resources::Resources;
    use crate::table::BindingTable;

    const SPEED: &str = "Speed";

    const SPEED_MENU: &[Declaration] = &[
        Declaration::radio_int("50%", Action::SpeedCpu50, SPEED, 50),
        Declaration::radio_int("100%", Action::SpeedCpu100, SPEED, 100),
        Declaration::radio_int("200%", Action::SpeedCpu200, SPEED, 200),
        Declaration::check("Warp mode", Action::WarpModeToggle, "WarpMode"),
        Declaration::radio_str("Pulse", Action::SoundDevicePulse, "SoundDeviceName", Some("pulse")),
        Declaration::radio_str("ALSA", Action::SoundDeviceAlsa, "SoundDeviceName", Some("alsa")),
    ];

    const MENU: &[Declaration] = &[
        Declaration::action("_Quit", Action::Quit).with_accel(Accelerator::ctrl(keysym::Q)),
        Declaration::separator(),
        Declaration::action("Detach cartridge", Action::None),
        Declaration::submenu("_Speed", SPEED_MENU),
    ];

    fn resources() -> Resources {
        let mut res = Resources::new();
        res.register_int(SPEED, 100);
        res.register_int("WarpMode", 1);
        res.register_string("SoundDeviceName", Some("alsa"));
        res
    }

    fn build(windows: &[WindowId]) -> (MenuRegistry<HeadlessWidget>, HeadlessToolkit, Resources) {
        let mut reg = MenuRegistry::new();
        let mut tk = HeadlessToolkit::new();
        let res = resources();
        for &window in windows {
            build_menu(&mut reg, &mut tk, &res, window, MENU).unwrap();
        }
        (reg, tk, res)
    }

    fn checked(reg: &MenuRegistry<HeadlessWidget>, action: Action) -> bool {
        reg.find_by_action(action, WindowId::Primary)
            .unwrap()
            .widget()
            .is_active()
    }

    #[test]
    fn test_build_registers_every_entry() {
        let (reg, tk, _) = build(&[WindowId::Primary]);
        assert_eq!(reg.table().live_count(), MENU.len() + SPEED_MENU.len());
        assert_eq!(tk.menu_bar(WindowId::Primary).len(), MENU.len());
        let speed = &tk.menu_bar(WindowId::Primary)[3];
        assert_eq!(speed.children().len(), SPEED_MENU.len());
        // Declaration order is kept: the submenu precedes its items
        assert_eq!(reg.find_by_index(3).unwrap().declaration().label, "_Speed");
        assert_eq!(reg.find_by_index(4).unwrap().action(), Action::SpeedCpu50);
    }

    #[test]
    fn test_initial_state_does_not_fire_handlers() {
        let (reg, tk, _) = build(&[WindowId::Primary]);
        assert!(checked(&reg, Action::WarpModeToggle));
        assert!(checked(&reg, Action::SpeedCpu100));
        assert!(checked(&reg, Action::SoundDeviceAlsa));
        assert_eq!(tk.pending(), 0);
    }

    #[test]
    fn test_items_without_action_are_greyed_out() {
        let (_reg, tk, _) = build(&[WindowId::Primary]);
        let bar = tk.menu_bar(WindowId::Primary);
        assert!(bar[0].is_sensitive());
        assert!(!bar[2].is_sensitive());
    }

    #[test]
    fn test_radio_groups_follow_declaration_order() {
        let (reg, _tk, _) = build(&[WindowId::Primary]);
        let group_of = |action| {
            reg.find_by_action(action, WindowId::Primary)
                .unwrap()
                .radio_group()
        };
        let speed = group_of(Action::SpeedCpu50).unwrap();
        assert_eq!(group_of(Action::SpeedCpu100), Some(speed));
        assert_eq!(group_of(Action::SpeedCpu200), Some(speed));
        assert_eq!(group_of(Action::WarpModeToggle), None);
        // The check item terminated the speed group
        let sound = group_of(Action::SoundDevicePulse).unwrap();
        assert_ne!(sound, speed);
        assert_eq!(group_of(Action::SoundDeviceAlsa), Some(sound));
        assert_eq!(reg.radio_group(speed, WindowId::Primary).len(), 3);
    }

    #[test]
    fn test_radio_sync_flips_selection() {
        let (reg, tk, mut res) = build(&[WindowId::Primary]);
        let group = reg
            .find_by_action(Action::SpeedCpu50, WindowId::Primary)
            .unwrap()
            .radio_group()
            .unwrap();
        let selected = |reg: &MenuRegistry<HeadlessWidget>| -> Vec<Action> {
            reg.radio_group(group, WindowId::Primary)
                .into_iter()
                .filter(|b| b.widget().is_active())
                .map(|b| b.action())
                .collect()
        };
        assert_eq!(selected(&reg), vec![Action::SpeedCpu100]);

        res.set_int(SPEED, 200).unwrap();
        reg.sync_from_resources(&res);
        assert_eq!(selected(&reg), vec![Action::SpeedCpu200]);
        assert_eq!(tk.pending(), 0);
    }

    fn speed_selection(reg: &MenuRegistry<HeadlessWidget>) -> Vec<Action> {
        let group = reg
            .find_by_action(Action::SpeedCpu50, WindowId::Primary)
            .unwrap()
            .radio_group()
            .unwrap();
        reg.radio_group(group, WindowId::Primary)
            .into_iter()
            .filter(|b| b.widget().is_active())
            .map(|b| b.action())
            .collect()
    }

    #[test]
    fn test_radio_sync_back_and_forth_is_silent() {
        let (reg, tk, mut res) = build(&[WindowId::Primary]);
        for speed in [200, 50, 100] {
            res.set_int(SPEED, speed).unwrap();
            reg.sync_from_resources(&res);
            assert_eq!(speed_selection(&reg).len(), 1);
        }
        assert_eq!(speed_selection(&reg), vec![Action::SpeedCpu100]);
        assert_eq!(tk.pending(), 0);
    }

    #[test]
    fn test_checking_radio_item_clears_group() {
        let (reg, tk, _) = build(&[WindowId::Primary]);
        reg.set_checked_by_action(Action::SpeedCpu200, WindowId::Primary, true)
            .unwrap();
        assert_eq!(speed_selection(&reg), vec![Action::SpeedCpu200]);
        assert_eq!(tk.pending(), 0);

        // Other groups are left alone
        assert!(checked(&reg, Action::SoundDeviceAlsa));
        assert!(checked(&reg, Action::WarpModeToggle));
    }

    #[test]
    fn test_clicking_radio_item_clears_group() {
        let (reg, tk, _) = build(&[WindowId::Primary]);
        let slow = reg
            .find_by_action(Action::SpeedCpu50, WindowId::Primary)
            .unwrap();
        slow.widget().click();
        assert_eq!(speed_selection(&reg), vec![Action::SpeedCpu50]);

        // The deselected item reports its change before the selected one
        let fired: Vec<Action> = tk.drain_activations().iter().map(|a| a.action).collect();
        assert_eq!(fired, vec![Action::SpeedCpu100, Action::SpeedCpu50]);
    }

    #[test]
    fn test_second_window_gets_own_widgets() {
        let (reg, tk, _) = build(&[WindowId::Primary, WindowId::Secondary]);
        let a = reg.find_by_action(Action::Quit, WindowId::Primary).unwrap();
        let b = reg.find_by_action(Action::Quit, WindowId::Secondary).unwrap();
        assert!(!a.widget().same_item(b.widget()));
        assert_eq!(tk.menu_bar(WindowId::Secondary).len(), MENU.len());
        assert_eq!(
            reg.resolve(Accelerator::ctrl(keysym::Q), WindowId::Secondary),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_capacity_exceeded_aborts_build() {
        let mut reg = MenuRegistry::with_table(BindingTable::with_capacity(Some(4)));
        let mut tk = HeadlessToolkit::new();
        let res = resources();
        let err = build_menu(&mut reg, &mut tk, &res, WindowId::Primary, MENU).unwrap_err();
        assert_eq!(err, RegistryError::CapacityExceeded { capacity: 4 });
        assert_eq!(reg.table().live_count(), 0);
        assert!(!reg.is_open(WindowId::Primary));
        assert_eq!(reg.accelerators().live_count(WindowId::Primary), 0);
    }
}
