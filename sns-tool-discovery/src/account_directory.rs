//! Account directory: friendly labels for AWS account numbers.
//!
//! The default table is embedded at build time. A JSON file with the same
//! shape (an object of account number to label) can replace it at startup.
//! The directory is read-only once built and is handed to the discovery
//! engine by reference.

use crate::errors::{AuditError, Result};
use rust_embed::RustEmbed;
use std::{collections::BTreeMap, fs, path::Path};

/// Embedded account directory data
#[derive(RustEmbed)]
#[folder = "resources/config"]
#[include = "account-directory.json"]
struct EmbeddedAccountDirectory;

const EMBEDDED_FILE: &str = "account-directory.json";

/// Read-only mapping of account number to human-readable label
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountDirectory {
    labels: BTreeMap<String, String>,
}

impl AccountDirectory {
    /// Build a directory from explicit entries
    #[must_use]
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            labels: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load the table compiled into the binary
    ///
    /// # Errors
    /// Returns `AuditError::Configuration` if the embedded file is missing or
    /// does not parse.
    pub fn embedded() -> Result<Self> {
        let embedded_file = EmbeddedAccountDirectory::get(EMBEDDED_FILE)
            .ok_or_else(|| AuditError::configuration("Embedded account directory not found"))?;

        let json_str = std::str::from_utf8(&embedded_file.data).map_err(|e| {
            AuditError::configuration_with_source("Invalid UTF-8 in embedded account directory", e)
        })?;

        Self::from_json(json_str)
    }

    /// Load a directory from a JSON file on disk
    ///
    /// # Errors
    /// Returns `AuditError::Configuration` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json_str = fs::read_to_string(path).map_err(|e| {
            AuditError::configuration_with_source(
                format!("Unable to read account directory '{}'", path.display()),
                e,
            )
        })?;

        let directory = Self::from_json(&json_str)?;
        log::debug!(
            "Loaded {} account labels from {}",
            directory.len(),
            path.display()
        );
        Ok(directory)
    }

    fn from_json(json_str: &str) -> Result<Self> {
        let labels: BTreeMap<String, String> = serde_json::from_str(json_str).map_err(|e| {
            AuditError::configuration_with_source("Failed to parse account directory JSON", e)
        })?;
        Ok(Self { labels })
    }

    /// Friendly name for an account, if known
    #[must_use]
    pub fn label(&self, account_id: &str) -> Option<&str> {
        self.labels.get(account_id).map(String::as_str)
    }

    /// Display form of an owner: `Name (account)` when known, the raw number otherwise
    #[must_use]
    pub fn display_owner(&self, account_id: &str) -> String {
        match self.label(account_id) {
            Some(name) => format!("{name} ({account_id})"),
            None => account_id.to_string(),
        }
    }

    /// Number of labelled accounts
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no account has a label
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
