//! UI action identifiers
//!
//! Every user-triggerable emulator capability (menu item, hotkey) is named by an
//! [`Action`]. The identifier space is closed and contiguous: valid ids satisfy
//! `Action::NONE < id < Action::COUNT`. Each action also carries a stable
//! kebab-case name which is what hotkey profiles store on disk.

use std::fmt;

macro_rules! define_actions {
    ($( $(#[$meta:meta])* $variant:ident => $name:literal, )+) => {
        /// Abstract, emulator-defined identifier for a user-triggerable operation
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(i32)]
        pub enum Action {
            /// Placeholder for menu entries without an action (separators, submenus)
            None = 0,
            $( $(#[$meta])* $variant, )+
        }

        impl Action {
            const VALID: &'static [Action] = &[$(Action::$variant),+];

            /// Stable name used in hotkey profiles
            pub fn name(self) -> &'static str {
                match self {
                    Action::None => "none",
                    $( Action::$variant => $name, )+
                }
            }
        }
    };
}

define_actions! {
    // Machine
    Quit => "quit",
    ResetSoft => "reset-soft",
    ResetHard => "reset-hard",
    PauseToggle => "pause-toggle",
    AdvanceFrame => "advance-frame",
    WarpModeToggle => "warp-mode-toggle",
    MonitorOpen => "monitor-open",

    // Media
    SmartAttach => "smart-attach",
    DriveAttach8 => "drive-attach-8:0",
    DriveDetach8 => "drive-detach-8:0",
    TapeAttach1 => "tape-attach-1",
    TapeDetach1 => "tape-detach-1",

    // Clipboard
    EditCopy => "edit-copy",
    EditPaste => "edit-paste",

    // Snapshots
    SnapshotLoad => "snapshot-load",
    SnapshotSave => "snapshot-save",
    SnapshotQuickload => "snapshot-quickload",
    SnapshotQuicksave => "snapshot-quicksave",
    ScreenshotQuicksave => "screenshot-quicksave",

    // Display
    FullscreenToggle => "fullscreen-toggle",
    MouseGrabToggle => "mouse-grab-toggle",
    StatusbarToggle => "statusbar-toggle",

    // Emulation speed (radio group)
    SpeedCpu50 => "speed-cpu-50",
    SpeedCpu100 => "speed-cpu-100",
    SpeedCpu200 => "speed-cpu-200",

    // Sound
    SoundToggle => "sound-toggle",
    SoundDevicePulse => "sound-device-pulse",
    SoundDeviceAlsa => "sound-device-alsa",
    SoundDeviceDummy => "sound-device-dummy",

    // Settings
    SettingsDialog => "settings-dialog",
    HotkeysClear => "hotkeys-clear",
    HotkeysDefault => "hotkeys-default",

    // Help
    HelpManual => "help-manual",
    HelpCommandLine => "help-command-line",
    HelpAbout => "help-about",
}

impl Action {
    /// Alias for [`Action::None`], the lower (exclusive) bound of the id space
    pub const NONE: Action = Action::None;

    /// Upper (exclusive) bound of the id space
    pub const COUNT: i32 = Self::VALID.len() as i32 + 1;

    /// Check whether a raw id falls inside the valid range
    pub fn is_valid(id: i32) -> bool {
        id > Action::NONE.id() && id < Self::COUNT
    }

    /// Look up an action by raw id
    pub fn from_id(id: i32) -> Option<Action> {
        if Self::is_valid(id) {
            Self::VALID.get((id - 1) as usize).copied()
        } else {
            None
        }
    }

    /// Look up an action by its profile name
    pub fn from_name(name: &str) -> Option<Action> {
        Self::VALID.iter().copied().find(|a| a.name() == name)
    }

    /// Raw integer id
    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn is_none(self) -> bool {
        self == Action::None
    }

    /// All valid actions in id order (excludes [`Action::None`])
    pub fn all() -> &'static [Action] {
        Self::VALID
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
