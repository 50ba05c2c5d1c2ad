//! Emulator menu declarations
//!
//! The main menu shared by the primary and the secondary window, plus the
//! resources its check and radio items mirror.

use crate::accel::{keysym, Accelerator, Modifiers};
use crate::action::Action;
use crate::declaration::Declaration;
use crate::resources::Resources;

pub const RES_WARP_MODE: &str = "WarpMode";
pub const RES_PAUSE: &str = "Pause";
pub const RES_FULLSCREEN: &str = "FullscreenEnable";
pub const RES_MOUSE_GRAB: &str = "Mouse";
pub const RES_STATUSBAR: &str = "ShowStatusbar";
pub const RES_SPEED: &str = "Speed";
pub const RES_SOUND: &str = "Sound";
pub const RES_SOUND_DEVICE: &str = "SoundDeviceName";

const RESET_MENU: &[Declaration] = &[
    Declaration::action("_Soft reset", Action::ResetSoft).with_accel(Accelerator::alt(keysym::F9)),
    Declaration::action("_Hard reset", Action::ResetHard)
        .with_accel(Accelerator::new(keysym::F12, Modifiers::ALT)),
];

pub const FILE_MENU: &[Declaration] = &[
    Declaration::action("_Smart attach...", Action::SmartAttach)
        .with_accel(Accelerator::ctrl(keysym::O)),
    Declaration::separator(),
    Declaration::action("Attach disk image to drive _8...", Action::DriveAttach8)
        .with_accel(Accelerator::alt(keysym::KEY_8)),
    Declaration::action("Detach disk image from drive 8", Action::DriveDetach8),
    Declaration::action("Attach _tape image...", Action::TapeAttach1)
        .with_accel(Accelerator::alt(keysym::T)),
    Declaration::action("Detach tape image", Action::TapeDetach1),
    // Cartridges are machine specific and not wired up here
    Declaration::action("Attach cartridge image...", Action::None),
    Declaration::separator(),
    Declaration::submenu("_Reset", RESET_MENU),
    Declaration::separator(),
    Declaration::action("E_xit emulator", Action::Quit).with_accel(Accelerator::ctrl(keysym::Q)),
];

pub const EDIT_MENU: &[Declaration] = &[
    Declaration::action("_Copy", Action::EditCopy)
        .with_accel(Accelerator::alt(keysym::C))
        .unlocked(),
    Declaration::action("_Paste", Action::EditPaste)
        .with_accel(Accelerator::alt(keysym::V))
        .unlocked(),
];

pub const SNAPSHOT_MENU: &[Declaration] = &[
    Declaration::action("_Load snapshot image...", Action::SnapshotLoad)
        .with_accel(Accelerator::ctrl(keysym::L)),
    Declaration::action("_Save snapshot image...", Action::SnapshotSave)
        .with_accel(Accelerator::ctrl(keysym::S)),
    Declaration::separator(),
    Declaration::action("Quickload snapshot", Action::SnapshotQuickload)
        .with_accel(Accelerator::key(keysym::F10)),
    Declaration::action("Quicksave snapshot", Action::SnapshotQuicksave)
        .with_accel(Accelerator::key(keysym::F11)),
    Declaration::separator(),
    Declaration::action("Save screenshot", Action::ScreenshotQuicksave)
        .with_accel(Accelerator::key(keysym::F12)),
];

const SPEED_MENU: &[Declaration] = &[
    Declaration::radio_int("_50%", Action::SpeedCpu50, RES_SPEED, 50),
    Declaration::radio_int("_100%", Action::SpeedCpu100, RES_SPEED, 100),
    Declaration::radio_int("_200%", Action::SpeedCpu200, RES_SPEED, 200),
    Declaration::separator(),
    Declaration::check("_Warp mode", Action::WarpModeToggle, RES_WARP_MODE)
        .with_accel(Accelerator::ctrl(keysym::W)),
];

const SOUND_MENU: &[Declaration] = &[
    Declaration::check("_Enable sound", Action::SoundToggle, RES_SOUND),
    Declaration::separator(),
    Declaration::radio_str("_PulseAudio", Action::SoundDevicePulse, RES_SOUND_DEVICE, Some("pulse")),
    Declaration::radio_str("_ALSA", Action::SoundDeviceAlsa, RES_SOUND_DEVICE, Some("alsa")),
    Declaration::radio_str("_Dummy", Action::SoundDeviceDummy, RES_SOUND_DEVICE, Some("dummy")),
];

pub const MACHINE_MENU: &[Declaration] = &[
    Declaration::check("_Pause emulation", Action::PauseToggle, RES_PAUSE)
        .with_accel(Accelerator::ctrl(keysym::P)),
    Declaration::action("_Advance frame", Action::AdvanceFrame)
        .with_accel(Accelerator::ctrl_shift(keysym::P)),
    Declaration::submenu("_Speed", SPEED_MENU),
    Declaration::separator(),
    Declaration::action("Activate _monitor", Action::MonitorOpen)
        .with_accel(Accelerator::ctrl(keysym::H)),
];

pub const SETTINGS_MENU: &[Declaration] = &[
    Declaration::check("_Fullscreen", Action::FullscreenToggle, RES_FULLSCREEN)
        .with_accel(Accelerator::ctrl(keysym::D)),
    Declaration::check("_Grab mouse events", Action::MouseGrabToggle, RES_MOUSE_GRAB)
        .with_accel(Accelerator::ctrl(keysym::M)),
    Declaration::check("Show _status bar", Action::StatusbarToggle, RES_STATUSBAR),
    Declaration::submenu("S_ound", SOUND_MENU),
    Declaration::separator(),
    Declaration::action("_Settings...", Action::SettingsDialog)
        .with_accel(Accelerator::ctrl(keysym::KEY_0))
        .unlocked(),
    Declaration::action("Restore _default hotkeys", Action::HotkeysDefault),
    Declaration::action("_Clear all hotkeys", Action::HotkeysClear),
];

pub const HELP_MENU: &[Declaration] = &[
    Declaration::action("_Browse manual", Action::HelpManual)
        .with_accel(Accelerator::key(keysym::F1))
        .unlocked(),
    Declaration::action("_Command line options...", Action::HelpCommandLine).unlocked(),
    Declaration::separator(),
    Declaration::action("_About", Action::HelpAbout).unlocked(),
];

/// Menu bar of every emulator window
pub const MAIN_MENU: &[Declaration] = &[
    Declaration::submenu("_File", FILE_MENU),
    Declaration::submenu("_Edit", EDIT_MENU),
    Declaration::submenu("S_napshot", SNAPSHOT_MENU),
    Declaration::submenu("_Machine", MACHINE_MENU),
    Declaration::submenu("_Settings", SETTINGS_MENU),
    Declaration::submenu("_Help", HELP_MENU),
];

/// Resources backing the check and radio items of [`MAIN_MENU`]
pub fn default_resources() -> Resources {
    let mut res = Resources::new();
    res.register_int(RES_WARP_MODE, 0);
    res.register_int(RES_PAUSE, 0);
    res.register_int(RES_FULLSCREEN, 0);
    res.register_int(RES_MOUSE_GRAB, 0);
    res.register_int(RES_STATUSBAR, 1);
    res.register_int(RES_SPEED, 100);
    res.register_int(RES_SOUND, 1);
    res.register_string(RES_SOUND_DEVICE, Some("pulse"));
    res
}

/// Visit every declaration of `items`, submenus included, in menu order
pub fn walk(items: &'static [Declaration], visit: &mut dyn FnMut(&'static Declaration)) {
    for decl in items {
        visit(decl);
        if let crate::declaration::ItemKind::Submenu(children) = decl.kind {
            walk(children, visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn all_declarations() -> Vec<&'static Declaration> {
        let mut out = Vec::new();
        walk(MAIN_MENU, &mut |d| out.push(d));
        out
    }

    #[test]
    fn test_actions_declared_once() {
        let mut seen = HashSet::new();
        for decl in all_declarations() {
            if !decl.action.is_none() {
                assert!(seen.insert(decl.action), "{} declared twice", decl.action);
            }
        }
    }

    #[test]
    fn test_default_hotkeys_are_unique() {
        let mut seen = HashMap::new();
        for decl in all_declarations().into_iter().filter(|d| d.accel.is_set()) {
            if let Some(other) = seen.insert(decl.accel, decl.action) {
                panic!("{} shared by {} and {}", decl.accel, other, decl.action);
            }
        }
    }

    #[test]
    fn test_resources_cover_menu() {
        let res = default_resources();
        for decl in all_declarations() {
            if let Some(name) = decl.resource {
                assert!(res.contains(name), "missing resource {}", name);
                assert!(decl.checked_state(&res).is_ok());
            }
        }
    }
}
