//! Amount reconciliation.
//!
//! Keeps input value, fee, destination amount and change consistent.
//! Priority when value runs short:
//!
//! ```text
//! fee  >  destination amount  >  change
//! ```
//!
//! The fee is always paid in full. Change only gets what is left after the
//! destination; if nothing is left the destination absorbs the deficit.
//!
//! Both passes are pure: they read a snapshot and return a
//! [`ContractUpdate`] for the caller to apply.

use heirloom_core::amount::{fee_for_vsize, format_sats, sats_or_zero};
use heirloom_core::{ContractSnapshot, ContractUpdate};

/// Input pass: sum the selected UTXOs, pin the change address to the lock,
/// and route everything to change when not spending.
pub fn reconcile_inputs(contract: &ContractSnapshot) -> ContractUpdate {
    let total: i64 = contract
        .selected_utxo
        .values()
        .map(String::as_str)
        .map(sats_or_zero)
        .fold(0, i64::saturating_add);

    let mut update = ContractUpdate {
        sum_of_utxo: Some(format_sats(total)),
        // change must go back to the lock so no value leaves it by accident
        change_address: Some(contract.address.clone()),
        ..Default::default()
    };

    if !contract.spending {
        update.to_amount = Some("0".to_string());
        update.change = Some(true);
    }

    update
}

/// Amount pass: derive fee, destination and change from the current size
/// estimate.
///
/// The size comes from the draft transaction when one is present, otherwise
/// from the last derived `v_size`.
pub fn reconcile_amounts(contract: &ContractSnapshot) -> ContractUpdate {
    let v_size = contract
        .tx
        .as_ref()
        .map(|draft| draft.virtual_size())
        .unwrap_or(contract.v_size);

    let fee_rate = sats_or_zero(&contract.fee_rate);
    let min_fee = fee_for_vsize(v_size, fee_rate);
    let inputs = contract.input_sats();
    let mut target = sats_or_zero(&contract.to_amount);

    let mut remaining = inputs.saturating_sub(min_fee).saturating_sub(target);
    if remaining <= 0 || !contract.change || target < 0 {
        target = target.saturating_add(remaining);
        remaining = 0;
    }

    log::debug!(
        "reconciled {} vB: inputs {} fee {} target {} change {}",
        v_size,
        inputs,
        min_fee,
        target,
        remaining
    );

    ContractUpdate {
        v_size: Some(v_size),
        fee_amount: Some(format_sats(min_fee)),
        to_amount: Some(format_sats(target)),
        change_amount: Some(format_sats(remaining)),
        change: Some(remaining != 0),
        ..Default::default()
    }
}

/// Both passes in order, the second seeing the first's result.
pub fn reconcile(contract: &ContractSnapshot) -> ContractUpdate {
    let inputs = reconcile_inputs(contract);
    let amounts = reconcile_amounts(&contract.updated(&inputs));
    inputs.merge(amounts)
}
