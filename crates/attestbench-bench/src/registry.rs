//! Deployed verifier addresses, per scheme.
//!
//! The registry is a plain value: load it, pass it where needed, save it.
//! Entries for schemes this tool does not know are preserved on save.

use attestbench_canonical::{Address, Scheme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default registry file, relative to the working directory.
pub const DEFAULT_REGISTRY: &str = "addresses.sepolia.json";

/// Errors raised by registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// I/O error on the registry file.
    #[error("registry {path}: {source}")]
    Io {
        /// Registry path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a registry document.
    #[error("registry {path}: invalid JSON: {message}")]
    Json {
        /// Registry path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// A stored address does not parse.
    #[error("registry entry for {scheme}: {message}")]
    BadAddress {
        /// Scheme tag of the entry.
        scheme: String,
        /// Parse error.
        message: String,
    },
}

/// `{ "verifiers": { scheme: address }, "history": { scheme: [address, ...] } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Current verifier per scheme tag.
    #[serde(default)]
    pub verifiers: BTreeMap<String, String>,
    /// Every verifier ever recorded per scheme tag, oldest first.
    #[serde(default)]
    pub history: BTreeMap<String, Vec<String>>,
}

impl Registry {
    /// Loads a registry; a missing file is an empty registry.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(RegistryError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|e| RegistryError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Writes the registry as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RegistryError> {
        let path = path.as_ref();
        let mut text = serde_json::to_string_pretty(self).map_err(|e| RegistryError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        text.push('\n');
        std::fs::write(path, text).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Current verifier for `scheme`, if registered.
    pub fn lookup(&self, scheme: Scheme) -> Result<Option<Address>, RegistryError> {
        self.verifiers
            .get(scheme.as_str())
            .map(|raw| {
                raw.parse::<Address>().map_err(|message| RegistryError::BadAddress {
                    scheme: scheme.to_string(),
                    message,
                })
            })
            .transpose()
    }

    /// Sets the current verifier for `scheme` and appends it to the history.
    pub fn record(&mut self, scheme: Scheme, address: Address) {
        let tag = scheme.as_str().to_string();
        let address = address.to_string();
        self.verifiers.insert(tag.clone(), address.clone());
        self.history.entry(tag).or_default().push(address);
    }

    /// Recorded history for `scheme`, oldest first.
    pub fn history_of(&self, scheme: Scheme) -> &[String] {
        self.history
            .get(scheme.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
