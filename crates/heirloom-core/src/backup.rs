//! Lock backup file handed to the owner when the lock was made.
//!
//! Loading one replaces the wizard's snapshot wholesale; nothing from the
//! previous session carries over.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::contract::{AddressType, ContractSnapshot, NetworkChoice};

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported backup version {0}")]
    UnsupportedVersion(u32),
}

/// Serializable lock backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractBackup {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Locking address (P2SH or P2WSH)
    pub address: String,
    /// Locking script (hex)
    pub script_hex: String,
    /// Relative lock length in days
    pub days_locked: String,
    /// Owner's key, if the backup carries it
    #[serde(
        rename = "ownerPrivateKeyWIF",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub owner_private_key_wif: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_choice: Option<NetworkChoice>,
    /// Unix milliseconds when the lock was created or last reset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

fn default_version() -> u32 {
    1
}

impl ContractBackup {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn from_json(json: &str) -> Result<Self, BackupError> {
        let backup: ContractBackup = serde_json::from_str(json)?;
        if backup.version > Self::CURRENT_VERSION {
            return Err(BackupError::UnsupportedVersion(backup.version));
        }
        Ok(backup)
    }

    /// Read and parse a backup file.
    pub fn load(path: &Path) -> Result<Self, BackupError> {
        let contents = fs::read_to_string(path)?;
        let backup = Self::from_json(&contents)?;
        log::info!("Loaded backup for {} from {}", backup.address, path.display());
        Ok(backup)
    }

    pub fn to_json(&self) -> Result<String, BackupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fresh snapshot seeded from this backup on top of `defaults`.
    ///
    /// Derived and selection fields always come from `defaults`.
    pub fn into_snapshot(self, defaults: &ContractSnapshot) -> ContractSnapshot {
        let address_type = AddressType::from_address_prefix(&self.address);
        ContractSnapshot {
            owner_private_key_wif: self.owner_private_key_wif.unwrap_or_default(),
            change_address: self.address.clone(),
            address: self.address,
            script_hex: self.script_hex,
            network_choice: self.network_choice,
            address_type,
            days_locked: self.days_locked,
            ..defaults.clone()
        }
    }

    /// Lock length as a day count, if it parses.
    pub fn days(&self) -> Option<u32> {
        self.days_locked.trim().parse().ok()
    }
}
