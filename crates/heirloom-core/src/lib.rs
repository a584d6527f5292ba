//! Heirloom Core
//!
//! Shared types for the owner-side spend wizard of a time-locked
//! inheritance output.
//!
//! # Pieces
//!
//! - [`ContractSnapshot`]: the single record the wizard works on
//! - [`ContractUpdate`]: partial updates, the only way a snapshot changes
//! - [`amount`]: satoshi fixed-point parsing and formatting
//! - [`Classifier`] / [`TransactionBuilder`]: seams to bitcoin primitives
//! - [`ContractBackup`]: the backup file that seeds a session
//! - [`countdown`]: lock time left / elapsed

pub mod amount;
pub mod backup;
pub mod contract;
pub mod countdown;
pub mod primitives;

pub use backup::{BackupError, ContractBackup};
pub use contract::{AddressType, ContractSnapshot, ContractUpdate, NetworkChoice};
pub use countdown::{lock_countdown, LockCountdown};
pub use primitives::{Classifier, DraftTransaction, TransactionBuilder};
