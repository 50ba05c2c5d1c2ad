//! UI toolkit seam
//!
//! The registry never talks to a widget framework directly. A toolkit adapter
//! implements [`MenuToolkit`] to create menu items and connect their change
//! handlers, and its widgets implement [`MenuWidget`].

use crate::accel::Accelerator;
use crate::declaration::Declaration;
use crate::window::WindowId;

/// Identifier of a connected change handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub u64);

/// A concrete menu item created by the toolkit
///
/// Widgets are handles: cloning one refers to the same item, so all methods
/// take `&self`.
pub trait MenuWidget {
    /// Set the checked state; emits the change handler unless blocked
    fn set_active(&self, active: bool);

    fn is_active(&self) -> bool;

    /// Greyed-out items cannot be activated by the user
    fn set_sensitive(&self, sensitive: bool);

    /// Update the accelerator hint shown next to the label
    fn set_accel_label(&self, accel: Accelerator);

    fn block_handler(&self, handler: HandlerId);

    fn unblock_handler(&self, handler: HandlerId);
}

/// Factory for menu items
pub trait MenuToolkit {
    type Widget: MenuWidget + Clone;

    /// Create the item for `decl` and append it to `parent`, or to the menu
    /// bar of `window` when `parent` is `None`
    fn create_item(
        &mut self,
        parent: Option<&Self::Widget>,
        decl: &'static Declaration,
        window: WindowId,
    ) -> Self::Widget;

    /// Connect the activation handler of `widget`
    fn connect_handler(
        &mut self,
        widget: &Self::Widget,
        decl: &'static Declaration,
        window: WindowId,
    ) -> HandlerId;
}

/// Scoped block of a widget's change handler
///
/// The handler is blocked on construction and unblocked when the guard is
/// dropped, on every exit path.
pub struct HandlerBlock<'w, W: MenuWidget> {
    widget: &'w W,
    handler: Option<HandlerId>,
}

impl<'w, W: MenuWidget> HandlerBlock<'w, W> {
    pub fn new(widget: &'w W, handler: Option<HandlerId>) -> Self {
        if let Some(id) = handler {
            widget.block_handler(id);
        }
        Self { widget, handler }
    }

    pub fn widget(&self) -> &W {
        self.widget
    }
}

impl<W: MenuWidget> Drop for HandlerBlock<'_, W> {
    fn drop(&mut self) {
        if let Some(id) = self.handler {
            self.widget.unblock_handler(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Probe {
        blocked: Cell<u32>,
        calls: RefCell<Vec<&'static str>>,
    }

    impl MenuWidget for Probe {
        fn set_active(&self, _active: bool) {
            self.calls.borrow_mut().push("set_active");
        }
        fn is_active(&self) -> bool {
            false
        }
        fn set_sensitive(&self, _sensitive: bool) {}
        fn set_accel_label(&self, _accel: Accelerator) {}
        fn block_handler(&self, _handler: HandlerId) {
            self.blocked.set(self.blocked.get() + 1);
            self.calls.borrow_mut().push("block");
        }
        fn unblock_handler(&self, _handler: HandlerId) {
            self.blocked.set(self.blocked.get() - 1);
            self.calls.borrow_mut().push("unblock");
        }
    }

    #[test]
    fn test_block_order() {
        let probe = Probe::default();
        {
            let guard = HandlerBlock::new(&probe, Some(HandlerId(7)));
            assert_eq!(probe.blocked.get(), 1);
            guard.widget().set_active(true);
        }
        assert_eq!(probe.blocked.get(), 0);
        assert_eq!(*probe.calls.borrow(), vec!["block", "set_active", "unblock"]);
    }

    #[test]
    fn test_unblock_on_early_return() {
        fn fails(probe: &Probe) -> Result<(), ()> {
            let _guard = HandlerBlock::new(probe, Some(HandlerId(1)));
            let write: Result<(), ()> = Err(());
            write?;
            probe.set_active(true);
            Ok(())
        }

        let probe = Probe::default();
        assert!(fails(&probe).is_err());
        assert_eq!(probe.blocked.get(), 0);
    }

    #[test]
    fn test_no_handler_is_noop() {
        let probe = Probe::default();
        drop(HandlerBlock::new(&probe, None));
        assert!(probe.calls.borrow().is_empty());
    }
}
