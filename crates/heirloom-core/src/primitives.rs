//! Seams to the bitcoin primitives the wizard depends on.
//!
//! The reconciler and validator never parse keys, addresses or scripts
//! themselves; they ask a [`Classifier`] and a [`TransactionBuilder`].
//! `heirloom-tx` provides the rust-bitcoin implementation.

use bitcoin::consensus::encode::serialize_hex;
use bitcoin::Transaction;
use serde::{Deserialize, Serialize};

use crate::contract::{ContractSnapshot, NetworkChoice};

/// Classifies credentials by network. `None` means invalid or unknown.
pub trait Classifier {
    fn classify_private_key(&self, wif: &str) -> Option<NetworkChoice>;
    fn classify_address(&self, address: &str) -> Option<NetworkChoice>;
}

/// Builds a draft transaction from the current snapshot.
///
/// `None` means the snapshot cannot produce a transaction yet.
pub trait TransactionBuilder {
    fn build_transaction(&self, contract: &ContractSnapshot) -> Option<DraftTransaction>;
}

/// An unsigned draft plus the virtual size it will have once satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftTransaction {
    unsigned: Transaction,
    vsize: u64,
}

impl DraftTransaction {
    /// Wrap a transaction whose inputs already carry their final
    /// (or size-equivalent) satisfaction.
    pub fn measured(tx: Transaction) -> Self {
        let vsize = tx.vsize() as u64;
        Self {
            unsigned: tx,
            vsize,
        }
    }

    /// Wrap an unsigned transaction with a size measured elsewhere.
    pub fn with_vsize(unsigned: Transaction, vsize: u64) -> Self {
        Self { unsigned, vsize }
    }

    pub fn virtual_size(&self) -> u64 {
        self.vsize
    }

    pub fn transaction(&self) -> &Transaction {
        &self.unsigned
    }

    /// Consensus hex of the unsigned transaction.
    pub fn to_hex(&self) -> String {
        serialize_hex(&self.unsigned)
    }
}
