//! Configuration store used by check and radio items
//!
//! Menu entries mirror persisted configuration values ("resources"). The
//! registry only needs the four accessors of [`ResourceStore`]; [`Resources`]
//! is an in-memory implementation that persists to JSON.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ResourceError;

/// Configuration store collaborator
pub trait ResourceStore {
    fn get_int(&self, name: &str) -> Result<i32, ResourceError>;
    fn get_string(&self, name: &str) -> Result<Option<String>, ResourceError>;
    fn set_int(&mut self, name: &str, value: i32) -> Result<(), ResourceError>;
    fn set_string(&mut self, name: &str, value: Option<&str>) -> Result<(), ResourceError>;
}

/// Resource value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceValue {
    Int(i32),
    Str(Option<String>),
}

impl ResourceValue {
    fn type_name(&self) -> &'static str {
        match self {
            ResourceValue::Int(_) => "integer",
            ResourceValue::Str(_) => "string",
        }
    }
}

/// In-memory resource store
///
/// Resources must be registered with a default before they can be read or
/// written; unknown names are an error, like the emulator's resource layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resources {
    values: BTreeMap<String, ResourceValue>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an integer resource with its default value
    pub fn register_int(&mut self, name: &str, default: i32) {
        self.values
            .insert(name.to_string(), ResourceValue::Int(default));
    }

    /// Register a string resource with its default value
    pub fn register_string(&mut self, name: &str, default: Option<&str>) {
        self.values.insert(
            name.to_string(),
            ResourceValue::Str(default.map(str::to_string)),
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get the resource file path relative to the executable
    pub fn config_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("resources.json");
        path
    }

    /// Overlay values stored in `path` onto the registered resources
    ///
    /// Unknown names are skipped and values of the wrong type are ignored, so
    /// an outdated file never clobbers the registered defaults.
    pub fn load_from(&mut self, path: &Path) -> Result<usize, ResourceError> {
        let contents = fs::read_to_string(path)?;
        let stored: BTreeMap<String, ResourceValue> = serde_json::from_str(&contents)?;
        let mut applied = 0;
        for (name, value) in stored {
            match self.values.get_mut(&name) {
                Some(current) if current.type_name() == value.type_name() => {
                    *current = value;
                    applied += 1;
                }
                Some(current) => warn!(
                    "Resource {} in {} has type {}, expected {}",
                    name,
                    path.display(),
                    value.type_name(),
                    current.type_name()
                ),
                None => debug!("Skipping unknown resource {} in {}", name, path.display()),
            }
        }
        Ok(applied)
    }

    /// Save all resources to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ResourceError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<&ResourceValue, ResourceError> {
        self.values
            .get(name)
            .ok_or_else(|| ResourceError::Unknown(name.to_string()))
    }

    fn lookup_mut(&mut self, name: &str) -> Result<&mut ResourceValue, ResourceError> {
        self.values
            .get_mut(name)
            .ok_or_else(|| ResourceError::Unknown(name.to_string()))
    }
}

impl ResourceStore for Resources {
    fn get_int(&self, name: &str) -> Result<i32, ResourceError> {
        match self.lookup(name)? {
            ResourceValue::Int(v) => Ok(*v),
            ResourceValue::Str(_) => Err(ResourceError::TypeMismatch {
                name: name.to_string(),
                expected: "integer",
            }),
        }
    }

    fn get_string(&self, name: &str) -> Result<Option<String>, ResourceError> {
        match self.lookup(name)? {
            ResourceValue::Str(v) => Ok(v.clone()),
            ResourceValue::Int(_) => Err(ResourceError::TypeMismatch {
                name: name.to_string(),
                expected: "string",
            }),
        }
    }

    fn set_int(&mut self, name: &str, value: i32) -> Result<(), ResourceError> {
        match self.lookup_mut(name)? {
            ResourceValue::Int(v) => {
                *v = value;
                Ok(())
            }
            ResourceValue::Str(_) => Err(ResourceError::TypeMismatch {
                name: name.to_string(),
                expected: "integer",
            }),
        }
    }

    fn set_string(&mut self, name: &str, value: Option<&str>) -> Result<(), ResourceError> {
        match self.lookup_mut(name)? {
            ResourceValue::Str(v) => {
                *v = value.map(str::to_string);
                Ok(())
            }
            ResourceValue::Int(_) => Err(ResourceError::TypeMismatch {
                name: name.to_string(),
                expected: "string",
            }),
        }
    }
}
