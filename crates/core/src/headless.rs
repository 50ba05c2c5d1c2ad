//! Headless menu toolkit
//!
//! An in-process implementation of the toolkit seam. Widgets keep their label,
//! checked state, sensitivity and accelerator hint, and emit activations into a
//! queue shared with the toolkit. Used by command-line tools and tests that
//! drive the registry without a display.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::accel::Accelerator;
use crate::action::Action;
use crate::declaration::{Declaration, ItemKind};
use crate::dispatch::{ActionDispatcher, InvokeContext, InvokeSource};
use crate::toolkit::{HandlerId, MenuToolkit, MenuWidget};
use crate::window::WindowId;

/// A queued handler invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub action: Action,
    pub window: WindowId,
    pub unlocked: bool,
}

type EventQueue = Rc<RefCell<Vec<Activation>>>;

/// Members of one radio group; at most one of them is active
type RadioSet = Rc<RefCell<Vec<Weak<RefCell<WidgetState>>>>>;

#[derive(Debug)]
struct WidgetState {
    decl: &'static Declaration,
    window: WindowId,
    active: bool,
    sensitive: bool,
    accel_label: Accelerator,
    handler: Option<HandlerId>,
    /// Block count; the handler only fires at zero
    blocked: u32,
    children: Vec<HeadlessWidget>,
    radio: Option<RadioSet>,
}

/// Handle to a headless menu item
#[derive(Debug, Clone)]
pub struct HeadlessWidget {
    state: Rc<RefCell<WidgetState>>,
    events: EventQueue,
}

impl HeadlessWidget {
    fn new(decl: &'static Declaration, window: WindowId, events: EventQueue) -> Self {
        Self {
            state: Rc::new(RefCell::new(WidgetState {
                decl,
                window,
                active: false,
                sensitive: true,
                accel_label: Accelerator::NONE,
                handler: None,
                blocked: 0,
                children: Vec::new(),
                radio: None,
            })),
            events,
        }
    }

    pub fn declaration(&self) -> &'static Declaration {
        self.state.borrow().decl
    }

    pub fn label(&self) -> String {
        self.state.borrow().decl.display_label()
    }

    pub fn window(&self) -> WindowId {
        self.state.borrow().window
    }

    pub fn is_sensitive(&self) -> bool {
        self.state.borrow().sensitive
    }

    pub fn accel_label(&self) -> Accelerator {
        self.state.borrow().accel_label
    }

    pub fn is_blocked(&self) -> bool {
        self.state.borrow().blocked > 0
    }

    pub fn children(&self) -> Vec<HeadlessWidget> {
        self.state.borrow().children.clone()
    }

    /// Two handles refer to the same item
    pub fn same_item(&self, other: &HeadlessWidget) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Simulate a user click
    ///
    /// Plain items emit their handler, check items toggle and radio items
    /// become active. Insensitive items ignore clicks.
    pub fn click(&self) {
        let (kind, active) = {
            let state = self.state.borrow();
            if !state.sensitive {
                return;
            }
            (state.decl.kind, state.active)
        };
        match kind {
            ItemKind::Action => self.emit(),
            ItemKind::Check => self.set_active(!active),
            ItemKind::RadioInt(_) | ItemKind::RadioStr(_) => self.set_active(true),
            ItemKind::Submenu(_) | ItemKind::Separator => {}
        }
    }

    fn emit(&self) {
        let activation = {
            let state = self.state.borrow();
            match state.handler {
                Some(_) if state.blocked == 0 => Some(Activation {
                    action: state.decl.action,
                    window: state.window,
                    unlocked: state.decl.unlocked,
                }),
                _ => None,
            }
        };
        if let Some(activation) = activation {
            self.events.borrow_mut().push(activation);
        }
    }
}

impl HeadlessWidget {
    fn deselect_siblings(&self) {
        let siblings: Vec<Rc<RefCell<WidgetState>>> = match &self.state.borrow().radio {
            Some(set) => set
                .borrow()
                .iter()
                .filter_map(Weak::upgrade)
                .filter(|s| !Rc::ptr_eq(s, &self.state))
                .collect(),
            None => return,
        };
        for state in siblings {
            let sibling = HeadlessWidget {
                state,
                events: Rc::clone(&self.events),
            };
            sibling.set_active(false);
        }
    }
}

impl MenuWidget for HeadlessWidget {
    fn set_active(&self, active: bool) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = state.active != active;
            state.active = active;
            changed
        };
        if changed {
            if active {
                self.deselect_siblings();
            }
            self.emit();
        }
    }

    fn is_active(&self) -> bool {
        self.state.borrow().active
    }

    fn set_sensitive(&self, sensitive: bool) {
        self.state.borrow_mut().sensitive = sensitive;
    }

    fn set_accel_label(&self, accel: Accelerator) {
        self.state.borrow_mut().accel_label = accel;
    }

    fn block_handler(&self, handler: HandlerId) {
        let mut state = self.state.borrow_mut();
        if state.handler == Some(handler) {
            state.blocked += 1;
        }
    }

    fn unblock_handler(&self, handler: HandlerId) {
        let mut state = self.state.borrow_mut();
        if state.handler == Some(handler) {
            state.blocked = state.blocked.saturating_sub(1);
        }
    }
}

/// Toolkit creating [`HeadlessWidget`]s
#[derive(Debug, Default)]
pub struct HeadlessToolkit {
    events: EventQueue,
    menu_bars: HashMap<WindowId, Vec<HeadlessWidget>>,
    next_handler: u64,
}

impl HeadlessToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level items of a window's menu bar
    pub fn menu_bar(&self, window: WindowId) -> &[HeadlessWidget] {
        self.menu_bars
            .get(&window)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Drop a window's menu bar (the widgets die with the window)
    pub fn destroy_window(&mut self, window: WindowId) {
        self.menu_bars.remove(&window);
    }

    pub fn pending(&self) -> usize {
        self.events.borrow().len()
    }

    /// Take all queued activations
    pub fn drain_activations(&self) -> Vec<Activation> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Forward queued activations to `dispatcher`; returns how many ran
    pub fn dispatch_pending<D: ActionDispatcher + ?Sized>(&self, dispatcher: &mut D) -> usize {
        self.drain_activations()
            .into_iter()
            .filter(|a| {
                let context = InvokeContext {
                    window: a.window,
                    unlocked: a.unlocked,
                    source: InvokeSource::Menu,
                };
                dispatcher.invoke(a.action, &context)
            })
            .count()
    }
}

impl MenuToolkit for HeadlessToolkit {
    type Widget = HeadlessWidget;

    fn create_item(
        &mut self,
        parent: Option<&HeadlessWidget>,
        decl: &'static Declaration,
        window: WindowId,
    ) -> HeadlessWidget {
        let widget = HeadlessWidget::new(decl, window, Rc::clone(&self.events));

        // Contiguous radio items at one level share a group
        if decl.is_radio() {
            let previous = match parent {
                Some(parent) => parent.state.borrow().children.last().cloned(),
                None => self.menu_bars.get(&window).and_then(|bar| bar.last().cloned()),
            };
            let set: RadioSet = previous
                .as_ref()
                .and_then(|p| p.state.borrow().radio.clone())
                .unwrap_or_default();
            set.borrow_mut().push(Rc::downgrade(&widget.state));
            widget.state.borrow_mut().radio = Some(set);
        }
        match parent {
            Some(parent) => parent.state.borrow_mut().children.push(widget.clone()),
            None => self
                .menu_bars
                .entry(window)
                .or_default()
                .push(widget.clone()),
        }
        widget
    }

    fn connect_handler(
        &mut self,
        widget: &HeadlessWidget,
        _decl: &'static Declaration,
        _window: WindowId,
    ) -> HandlerId {
        self.next_handler += 1;
        let id = HandlerId(self.next_handler);
        widget.state.borrow_mut().handler = Some(id);
        id
    }
}
