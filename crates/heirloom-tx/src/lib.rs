//! Heirloom bitcoin primitives
//!
//! rust-bitcoin backed implementation of the [`Classifier`] and
//! [`TransactionBuilder`] seams used by the wizard.
//!
//! - [`classify`]: WIF and address network detection
//! - [`owner_tx`]: unsigned owner-path draft with measured virtual size
//!
//! Signing and broadcasting are out of scope; drafts are never signed here.

pub mod classify;
pub mod owner_tx;

#[cfg(test)]
pub(crate) mod test_utils;

pub use classify::{checked_address, classify_address, classify_private_key};
pub use owner_tx::{build_owner_transaction, LockKind, OwnerTxError};

use heirloom_core::{Classifier, ContractSnapshot, DraftTransaction, NetworkChoice, TransactionBuilder};

/// The production collaborator handed to the wizard session.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitcoinPrimitives;

impl BitcoinPrimitives {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for BitcoinPrimitives {
    fn classify_private_key(&self, wif: &str) -> Option<NetworkChoice> {
        classify_private_key(wif)
    }

    fn classify_address(&self, address: &str) -> Option<NetworkChoice> {
        classify_address(address)
    }
}

impl TransactionBuilder for BitcoinPrimitives {
    fn build_transaction(&self, contract: &ContractSnapshot) -> Option<DraftTransaction> {
        match build_owner_transaction(contract) {
            Ok(draft) => Some(draft),
            Err(e) => {
                log::debug!("no draft transaction: {}", e);
                None
            }
        }
    }
}
