//! Menu action and hotkey registry for the emulator frontends.
//!
//! Every top-level window builds its menu from the static declarations in
//! [`menus`]. The [`MenuRegistry`] keeps the action, hotkey and widget views of
//! those menus consistent while hotkeys are rebound at runtime, and resolves
//! keypresses to actions for an [`ActionDispatcher`].

pub mod accel;
pub mod action;
pub mod builder;
pub mod declaration;
pub mod dispatch;
pub mod error;
pub mod headless;
pub mod hotkeys;
pub mod keymap;
pub mod menus;
pub mod registry;
pub mod resources;
pub mod table;
pub mod toolkit;
pub mod window;

pub use accel::{Accelerator, Modifiers};
pub use action::Action;
pub use builder::{build_menu, MenuBuilder};
pub use declaration::{Declaration, ItemKind};
pub use dispatch::{ActionDispatcher, ActionMap, InvokeContext, InvokeSource};
pub use error::{AccelParseError, ProfileError, RegistryError, ResourceError};
pub use headless::{HeadlessToolkit, HeadlessWidget};
pub use hotkeys::HotkeyProfile;
pub use registry::{MenuRegistry, RebindReport};
pub use resources::{ResourceStore, ResourceValue, Resources};
pub use table::{Binding, BindingHandle, BindingTable, RadioGroupId};
pub use toolkit::{HandlerBlock, HandlerId, MenuToolkit, MenuWidget};
pub use window::WindowId;
