//! Static menu declarations
//!
//! A [`Declaration`] is the immutable template for one menu entry. Menus are
//! written as `const` slices of declarations; the builder turns them into
//! per-window bindings. Declarations are never mutated at runtime: the
//! effective accelerator of an entry lives on its binding.

use crate::accel::Accelerator;
use crate::action::Action;
use crate::error::ResourceError;
use crate::resources::ResourceStore;

/// Kind of menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Plain item that triggers its action
    Action,
    /// Check item mirroring an integer resource (non-zero = checked)
    Check,
    /// Radio item, checked when the integer resource equals the value
    RadioInt(i32),
    /// Radio item, checked when the string resource equals the value
    /// (`None` matches an unset resource)
    RadioStr(Option<&'static str>),
    /// Nested menu
    Submenu(&'static [Declaration]),
    Separator,
}

/// Static description of one menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    /// Display label, `_` marks the mnemonic
    pub label: &'static str,
    pub kind: ItemKind,
    pub action: Action,
    /// Resource backing the checked state of check and radio items
    pub resource: Option<&'static str>,
    /// Default accelerator
    pub accel: Accelerator,
    /// Handler may run without holding the emulation lock
    pub unlocked: bool,
}

impl Declaration {
    const fn base(label: &'static str, kind: ItemKind, action: Action) -> Self {
        Self {
            label,
            kind,
            action,
            resource: None,
            accel: Accelerator::NONE,
            unlocked: false,
        }
    }

    pub const fn action(label: &'static str, action: Action) -> Self {
        Self::base(label, ItemKind::Action, action)
    }

    pub const fn check(label: &'static str, action: Action, resource: &'static str) -> Self {
        let mut decl = Self::base(label, ItemKind::Check, action);
        decl.resource = Some(resource);
        decl
    }

    pub const fn radio_int(
        label: &'static str,
        action: Action,
        resource: &'static str,
        value: i32,
    ) -> Self {
        let mut decl = Self::base(label, ItemKind::RadioInt(value), action);
        decl.resource = Some(resource);
        decl
    }

    pub const fn radio_str(
        label: &'static str,
        action: Action,
        resource: &'static str,
        value: Option<&'static str>,
    ) -> Self {
        let mut decl = Self::base(label, ItemKind::RadioStr(value), action);
        decl.resource = Some(resource);
        decl
    }

    pub const fn submenu(label: &'static str, items: &'static [Declaration]) -> Self {
        Self::base(label, ItemKind::Submenu(items), Action::None)
    }

    pub const fn separator() -> Self {
        Self::base("", ItemKind::Separator, Action::None)
    }

    /// Set the default accelerator
    pub const fn with_accel(mut self, accel: Accelerator) -> Self {
        self.accel = accel;
        self
    }

    /// Mark the entry as safe to run without the emulation lock
    pub const fn unlocked(mut self) -> Self {
        self.unlocked = true;
        self
    }

    pub fn is_radio(&self) -> bool {
        matches!(self.kind, ItemKind::RadioInt(_) | ItemKind::RadioStr(_))
    }

    /// Check and radio items have a checked state
    pub fn is_checkable(&self) -> bool {
        self.kind == ItemKind::Check || self.is_radio()
    }

    /// Items that can carry a handler and an accelerator
    pub fn is_activatable(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Action | ItemKind::Check | ItemKind::RadioInt(_) | ItemKind::RadioStr(_)
        )
    }

    /// Label with mnemonic markers removed
    pub fn display_label(&self) -> String {
        let mut out = String::with_capacity(self.label.len());
        let mut chars = self.label.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '_' {
                // "__" is a literal underscore
                if chars.peek() == Some(&'_') {
                    out.push('_');
                    chars.next();
                }
                continue;
            }
            out.push(c);
        }
        out
    }

    /// Checked state derived from the backing resource
    ///
    /// Returns `Ok(None)` for entries without a checked state or without a
    /// backing resource.
    pub fn checked_state<S: ResourceStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Option<bool>, ResourceError> {
        let Some(resource) = self.resource else {
            return Ok(None);
        };
        let state = match self.kind {
            ItemKind::Check => store.get_int(resource)? != 0,
            ItemKind::RadioInt(value) => store.get_int(resource)? == value,
            ItemKind::RadioStr(value) => {
                let current = store.get_string(resource)?;
                match (current.as_deref(), value) {
                    (Some(current), Some(value)) => current == value,
                    (None, None) => true,
                    _ => false,
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::keysym;
    use crate::resources::Resources;

    const SPEED: &str = "Speed";
    const DEVICE: &str = "SoundDeviceName";

    fn store() -> Resources {
        let mut res = Resources::new();
        res.register_int(SPEED, 100);
        res.register_int("WarpMode", 0);
        res.register_string(DEVICE, Some("alsa"));
        res
    }

    #[test]
    fn test_builders() {
        let decl = Declaration::check("_Warp mode", Action::WarpModeToggle, "WarpMode")
            .with_accel(Accelerator::ctrl(keysym::W))
            .unlocked();
        assert_eq!(decl.kind, ItemKind::Check);
        assert_eq!(decl.resource, Some("WarpMode"));
        assert_eq!(decl.accel, Accelerator::ctrl(keysym::W));
        assert!(decl.unlocked);
        assert!(decl.is_checkable());
        assert!(!decl.is_radio());

        let sep = Declaration::separator();
        assert_eq!(sep.action, Action::None);
        assert!(!sep.is_activatable());
    }

    #[test]
    fn test_display_label() {
        assert_eq!(Declaration::action("_Quit", Action::Quit).display_label(), "Quit");
        assert_eq!(
            Declaration::action("Drive __8", Action::DriveAttach8).display_label(),
            "Drive _8"
        );
    }

    #[test]
    fn test_checked_state_int() {
        let res = store();
        let warp = Declaration::check("Warp", Action::WarpModeToggle, "WarpMode");
        assert_eq!(warp.checked_state(&res).unwrap(), Some(false));

        let r100 = Declaration::radio_int("100%", Action::SpeedCpu100, SPEED, 100);
        let r200 = Declaration::radio_int("200%", Action::SpeedCpu200, SPEED, 200);
        assert_eq!(r100.checked_state(&res).unwrap(), Some(true));
        assert_eq!(r200.checked_state(&res).unwrap(), Some(false));
    }

    #[test]
    fn test_checked_state_string() {
        let mut res = store();
        let alsa = Declaration::radio_str("ALSA", Action::SoundDeviceAlsa, DEVICE, Some("alsa"));
        let unset = Declaration::radio_str("Default", Action::SoundDeviceDummy, DEVICE, None);
        assert_eq!(alsa.checked_state(&res).unwrap(), Some(true));
        assert_eq!(unset.checked_state(&res).unwrap(), Some(false));

        res.set_string(DEVICE, None).unwrap();
        assert_eq!(alsa.checked_state(&res).unwrap(), Some(false));
        assert_eq!(unset.checked_state(&res).unwrap(), Some(true));
    }

    #[test]
    fn test_checked_state_without_resource() {
        let res = store();
        let plain = Declaration::action("Quit", Action::Quit);
        assert_eq!(plain.checked_state(&res).unwrap(), None);

        let missing = Declaration::check("Sound", Action::SoundToggle, "Sound");
        assert!(matches!(
            missing.checked_state(&res),
            Err(ResourceError::Unknown(_))
        ));
    }
}
