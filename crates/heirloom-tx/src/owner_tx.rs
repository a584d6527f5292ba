//! Owner-path draft transaction.
//!
//! Spends the selected lock UTXOs through the owner's immediate branch and
//! pays the destination and/or the change back to the lock address. The
//! result is unsigned; its virtual size is measured on a copy whose inputs
//! carry a placeholder satisfaction at least as large as the real one.
//!
//! # Placeholder satisfaction
//!
//! The owner branch of an inheritance lock is satisfied by a single ECDSA
//! signature. Compiled as `or_d(pk(OWNER), ...)` it needs nothing else;
//! compiled as `or_i(...)` it also needs a one-byte branch selector. The
//! placeholder always carries the selector so either shape is covered:
//!
//! ```text
//! P2WSH witness:   <sig> <1> <witness_script>
//! P2SH script_sig: <sig> OP_1 <redeem_script>
//! ```
//!
//! A DER signature plus sighash byte is at most 72 bytes, so the estimate
//! never undershoots. For `or_d` locks it overshoots by under 1 vB
//! (P2WSH) or 1 byte (P2SH). The placeholder only sizes the draft and is
//! never a valid spend.

use bitcoin::hashes::Hash;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::transaction::Version;
use bitcoin::{
    absolute::LockTime, Address, Amount, OutPoint, ScriptBuf, ScriptHash, Sequence, Transaction,
    TxIn, TxOut, Txid, WScriptHash, Witness,
};
use heirloom_core::amount::sats_or_zero;
use heirloom_core::{ContractSnapshot, DraftTransaction, NetworkChoice};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

use crate::classify::{checked_address, classify_private_key};

/// Upper bound of a DER-encoded ECDSA signature with sighash flag.
const MAX_ECDSA_SIG_LEN: usize = 72;

#[derive(Error, Debug)]
pub enum OwnerTxError {
    #[error("No network chosen")]
    NoNetwork,

    #[error("Private key is not a valid {0} WIF")]
    InvalidKey(NetworkChoice),

    #[error("Lock address is not a valid {0} address")]
    InvalidLockAddress(NetworkChoice),

    #[error("Lock script is not valid hex: {0}")]
    InvalidScriptHex(String),

    #[error("Lock script does not hash to address {0}")]
    ScriptMismatch(String),

    #[error("Lock script too large for a P2SH push ({0} bytes)")]
    ScriptTooLarge(usize),

    #[error("No UTXOs selected")]
    NoUtxos,

    #[error("Malformed UTXO key {0:?}")]
    InvalidUtxoKey(String),

    #[error("Destination is not a valid {0} address")]
    InvalidDestination(NetworkChoice),

    #[error("Change address is not a valid {0} address")]
    InvalidChangeAddress(NetworkChoice),

    #[error("Negative output amount {0}")]
    NegativeAmount(String),

    #[error("Transaction would have no outputs")]
    NoOutputs,
}

/// How the lock script is committed to by the lock address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    P2sh,
    P2wsh,
}

impl LockKind {
    /// Match the script against the address's script pubkey.
    pub fn detect(script: &ScriptBuf, address: &Address) -> Option<Self> {
        let spk = address.script_pubkey();
        if spk == ScriptBuf::new_p2wsh(&WScriptHash::hash(script.as_bytes())) {
            Some(LockKind::P2wsh)
        } else if spk == ScriptBuf::new_p2sh(&ScriptHash::hash(script.as_bytes())) {
            Some(LockKind::P2sh)
        } else {
            None
        }
    }

    /// Fill `input` with a satisfaction no smaller than the owner's real one.
    fn fill_placeholder(&self, input: &mut TxIn, script: &ScriptBuf) -> Result<(), OwnerTxError> {
        let sig = vec![0u8; MAX_ECDSA_SIG_LEN];
        match self {
            LockKind::P2wsh => {
                input.witness = Witness::from_slice(&[sig, vec![1u8], script.to_bytes()]);
            }
            LockKind::P2sh => {
                let redeem = PushBytesBuf::try_from(script.to_bytes())
                    .map_err(|_| OwnerTxError::ScriptTooLarge(script.len()))?;
                let sig = PushBytesBuf::try_from(sig)
                    .map_err(|_| OwnerTxError::ScriptTooLarge(MAX_ECDSA_SIG_LEN))?;
                input.script_sig = Builder::new()
                    .push_slice(sig)
                    .push_int(1)
                    .push_slice(redeem)
                    .into_script();
            }
        }
        Ok(())
    }
}

/// Build the owner's unsigned draft from a reconciled snapshot.
pub fn build_owner_transaction(
    contract: &ContractSnapshot,
) -> Result<DraftTransaction, OwnerTxError> {
    let choice = contract.network_choice.ok_or(OwnerTxError::NoNetwork)?;

    if classify_private_key(&contract.owner_private_key_wif) != Some(choice) {
        return Err(OwnerTxError::InvalidKey(choice));
    }

    let lock_address = checked_address(&contract.address, choice)
        .ok_or(OwnerTxError::InvalidLockAddress(choice))?;

    let script_bytes = hex::decode(contract.script_hex.trim())
        .map_err(|e| OwnerTxError::InvalidScriptHex(e.to_string()))?;
    let script = ScriptBuf::from_bytes(script_bytes);
    let lock = LockKind::detect(&script, &lock_address)
        .ok_or_else(|| OwnerTxError::ScriptMismatch(contract.address.clone()))?;

    let inputs: Vec<TxIn> = selected_outpoints(&contract.selected_utxo)?
        .into_iter()
        .map(|outpoint| TxIn {
            previous_output: outpoint,
            script_sig: ScriptBuf::new(),
            sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
            witness: Witness::default(),
        })
        .collect();

    let outputs = owner_outputs(contract, choice, &lock_address)?;

    let unsigned = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: inputs,
        output: outputs,
    };

    let mut satisfied = unsigned.clone();
    for input in satisfied.input.iter_mut() {
        lock.fill_placeholder(input, &script)?;
    }
    let vsize = satisfied.vsize() as u64;

    log::debug!(
        "built {:?} owner draft: {} inputs, {} outputs, {} vB",
        lock,
        unsigned.input.len(),
        unsigned.output.len(),
        vsize
    );

    Ok(DraftTransaction::with_vsize(unsigned, vsize))
}

/// Outpoints for every selected `txid-vout` key.
fn selected_outpoints(
    selected: &BTreeMap<String, String>,
) -> Result<Vec<OutPoint>, OwnerTxError> {
    if selected.is_empty() {
        return Err(OwnerTxError::NoUtxos);
    }
    selected
        .keys()
        .map(|key| {
            let (txid, vout) = ContractSnapshot::split_utxo_key(key);
            let txid =
                Txid::from_str(txid).map_err(|_| OwnerTxError::InvalidUtxoKey(key.clone()))?;
            let vout = vout
                .parse::<u32>()
                .map_err(|_| OwnerTxError::InvalidUtxoKey(key.clone()))?;
            Ok(OutPoint { txid, vout })
        })
        .collect()
}

/// Destination first, then change back to the lock.
fn owner_outputs(
    contract: &ContractSnapshot,
    choice: NetworkChoice,
    lock_address: &Address,
) -> Result<Vec<TxOut>, OwnerTxError> {
    let mut outputs = Vec::new();

    if contract.spending {
        let to_sats = non_negative(&contract.to_amount)?;
        if to_sats > 0 {
            let destination = checked_address(&contract.to_address, choice)
                .ok_or(OwnerTxError::InvalidDestination(choice))?;
            outputs.push(TxOut {
                value: Amount::from_sat(to_sats),
                script_pubkey: destination.script_pubkey(),
            });
        }
    }

    if contract.change {
        let change_sats = non_negative(&contract.change_amount)?;
        let change_address = if contract.change_address.is_empty() {
            lock_address.clone()
        } else {
            checked_address(&contract.change_address, choice)
                .ok_or(OwnerTxError::InvalidChangeAddress(choice))?
        };
        outputs.push(TxOut {
            value: Amount::from_sat(change_sats),
            script_pubkey: change_address.script_pubkey(),
        });
    }

    if outputs.is_empty() {
        return Err(OwnerTxError::NoOutputs);
    }
    Ok(outputs)
}

fn non_negative(amount: &str) -> Result<u64, OwnerTxError> {
    u64::try_from(sats_or_zero(amount)).map_err(|_| OwnerTxError::NegativeAmount(amount.into()))
}
