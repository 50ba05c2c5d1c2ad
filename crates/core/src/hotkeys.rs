//! Hotkey profiles
//!
//! User hotkeys are persisted as a JSON map from action name to accelerator
//! string. A profile is captured from the primary window of a registry and
//! applied back through [`MenuRegistry::rebind_by_action`], which mirrors every
//! hotkey into the other open windows.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::accel::Accelerator;
use crate::action::Action;
use crate::error::ProfileError;
use crate::registry::MenuRegistry;
use crate::toolkit::MenuWidget;
use crate::window::WindowId;

/// Persisted hotkey assignments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyProfile {
    /// Drop every hotkey, defaults included, before applying `hotkeys`
    #[serde(default)]
    pub clear: bool,
    /// Action name to accelerator string ("none" unbinds)
    #[serde(default)]
    pub hotkeys: BTreeMap<String, String>,
}

impl HotkeyProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the profile file path relative to the executable
    pub fn config_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("hotkeys.json");
        path
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Load `path`, falling back to an empty profile if it is missing or
    /// unreadable
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Ignoring hotkey profile {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ProfileError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Set the hotkey of `action`
    pub fn set(&mut self, action: Action, accel: Accelerator) {
        self.hotkeys.insert(action.name().to_string(), accel.to_string());
    }

    /// Snapshot the effective hotkeys of `window`
    ///
    /// Every bound action is recorded, unset ones as "none", and `clear` is
    /// set so that applying the profile reproduces the snapshot exactly.
    pub fn capture<W: MenuWidget>(registry: &MenuRegistry<W>, window: WindowId) -> Self {
        let mut profile = Self {
            clear: true,
            hotkeys: BTreeMap::new(),
        };
        for binding in registry.table().window_bindings(window) {
            if binding.action().is_none() {
                continue;
            }
            profile.set(binding.action(), binding.accelerator());
        }
        profile
    }

    /// Parse every entry; nothing is applied if one of them is invalid
    pub fn parse(&self) -> Result<Vec<(Action, Accelerator)>, ProfileError> {
        self.hotkeys
            .iter()
            .map(|(name, accel)| {
                let action = Action::from_name(name)
                    .ok_or_else(|| ProfileError::UnknownAction(name.clone()))?;
                let accel = accel
                    .parse::<Accelerator>()
                    .map_err(|source| ProfileError::BadAccelerator {
                        action: name.clone(),
                        source,
                    })?;
                Ok((action, accel))
            })
            .collect()
    }

    /// Apply the profile to every open window of `registry`
    ///
    /// Returns the number of hotkeys set. Actions the menu does not contain
    /// are skipped with a warning.
    pub fn apply<W: MenuWidget>(&self, registry: &mut MenuRegistry<W>) -> Result<usize, ProfileError> {
        let entries = self.parse()?;
        if self.clear {
            debug!("Clearing all hotkeys before applying profile");
            registry.reset_hotkeys();
        }

        let mut applied = 0;
        for (action, accel) in entries {
            let report = registry.rebind_by_action(action, WindowId::Primary, accel);
            if report.is_success() {
                applied += 1;
            } else {
                warn!("Hotkey for {} skipped: not in the menu", action);
            }
        }
        info!("Applied {} hotkeys", applied);
        Ok(applied)
    }
}
