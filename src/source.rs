use std::fmt;
use std::path::Path;

use crate::{BridgeError, Result};

/// Where a configuration lives: a local directory, or a hub repository
/// pinned to an optional revision (`org/name@revision`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub name_or_path: String,
    pub revision: Option<String>,
}

impl ConfigSource {
    pub fn parse(s: &str) -> Result<ConfigSource> {
        let parts: Vec<&str> = s.split('@').collect();
        match parts.as_slice() {
            [name_or_path] => Ok(ConfigSource { name_or_path: name_or_path.to_string(), revision: None }),
            [name_or_path, revision] => Ok(ConfigSource {
                name_or_path: name_or_path.to_string(),
                revision: Some(revision.to_string()),
            }),
            _ => Err(BridgeError::InvalidSource(s.to_string())),
        }
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn as_local_dir(&self) -> Option<&Path> {
        let path = Path::new(&self.name_or_path);
        if path.is_dir() {
            Some(path)
        } else {
            None
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(revision) => write!(f, "{}@{}", self.name_or_path, revision),
            None => write!(f, "{}", self.name_or_path),
        }
    }
}
