//! Wizard validation.
//!
//! Turns a reconciled snapshot into per-page validity, page usability and
//! an issue report for display. Every pass recomputes everything from the
//! snapshot; nothing from an earlier pass survives.

use heirloom_core::amount::{format_sats, sats_or_zero, SATS_PER_COIN};
use heirloom_core::{AddressType, Classifier, ContractSnapshot, ContractUpdate, NetworkChoice};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::pages::Pages;

/// Minimum fee rate most nodes relay, in 1e-8 sat/vB.
pub const MIN_RELAY_FEE_RATE: i64 = SATS_PER_COIN;

/// Page-3 conditions that get a message while failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Page3Issue {
    /// Destination blank while spending.
    #[serde(rename = "isToAddressDone")]
    ToAddressBlank,
    /// Destination on a different network than the lock.
    #[serde(rename = "isNetworkMatch")]
    NetworkMismatch,
    #[serde(rename = "isFeeRateEnough")]
    FeeRateTooLow,
    /// Nothing left for either output after the fee.
    #[serde(rename = "enoughForFee")]
    InsufficientFunds,
    /// Only change left; the owner may just want to reset the timer.
    #[serde(rename = "isToAmountEnough")]
    ToAmountZero,
}

/// Result of the checks. Booleans are `true` when the check FAILS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuesReport {
    #[serde(rename = "ownerPrivateKeyWIF")]
    pub owner_private_key_wif: bool,
    #[serde(rename = "ownerPrivateKeyWIFInfo")]
    pub owner_private_key_wif_info: Option<NetworkChoice>,
    pub address: bool,
    pub address_info: Option<NetworkChoice>,
    pub address_network: bool,
    pub relative_lock_time: bool,
    pub script_hex: bool,
    /// Messages for currently failing page-3 conditions only.
    pub page3: BTreeMap<Page3Issue, String>,
}

impl IssuesReport {
    pub fn page3_message(&self, issue: Page3Issue) -> Option<&str> {
        self.page3.get(&issue).map(String::as_str)
    }
}

/// Everything one validation pass produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub issues: IssuesReport,
    pub pages: Pages,
    /// Derived `network_choice` and `address_type`.
    pub update: ContractUpdate,
}

/// Network and address type implied by the credentials.
///
/// The network is only set when key and lock address agree.
pub fn identity_update<C: Classifier + ?Sized>(
    contract: &ContractSnapshot,
    classifier: &C,
) -> ContractUpdate {
    let key_network = classifier.classify_private_key(&contract.owner_private_key_wif);
    let address_network = classifier.classify_address(&contract.address);
    ContractUpdate {
        network_choice: Some(agreed_network(key_network, address_network)),
        address_type: Some(AddressType::from_address_prefix(&contract.address)),
        ..Default::default()
    }
}

fn agreed_network(
    key: Option<NetworkChoice>,
    address: Option<NetworkChoice>,
) -> Option<NetworkChoice> {
    match (key, address) {
        (Some(k), Some(a)) if k == a => Some(k),
        _ => None,
    }
}

/// Validate with the default minimum relay fee rate.
pub fn validate<C: Classifier + ?Sized>(contract: &ContractSnapshot, classifier: &C) -> Validation {
    validate_with_min_fee(contract, classifier, MIN_RELAY_FEE_RATE)
}

/// Validate all pages. `min_fee_rate` is in 1e-8 sat/vB.
pub fn validate_with_min_fee<C: Classifier + ?Sized>(
    contract: &ContractSnapshot,
    classifier: &C,
    min_fee_rate: i64,
) -> Validation {
    let mut issues = IssuesReport::default();

    // page 1
    let key_network = classifier.classify_private_key(&contract.owner_private_key_wif);
    issues.owner_private_key_wif = key_network.is_none();
    issues.owner_private_key_wif_info = key_network;

    let address_network = classifier.classify_address(&contract.address);
    issues.address = address_network.is_none();
    issues.address_info = address_network;

    let network_choice = agreed_network(key_network, address_network);
    issues.address_network = network_choice.is_none();

    let has_lock_time = is_positive_days(&contract.days_locked);
    issues.relative_lock_time = !has_lock_time;

    let has_script = !contract.script_hex.trim().is_empty();
    issues.script_hex = !has_script;

    let page1_valid = key_network.is_some()
        && address_network.is_some()
        && network_choice.is_some()
        && has_lock_time
        && has_script;

    // page 2
    let utxo_keys_done = contract.selected_utxo.keys().all(|key| {
        let (txid, vout) = ContractSnapshot::split_utxo_key(key);
        !txid.is_empty() && !vout.is_empty()
    });
    let enough_utxo = contract.input_sats() > 0;
    let page2_valid = utxo_keys_done && enough_utxo;

    // page 3
    let to_address_done = !contract.to_address.trim().is_empty();
    let change_amount_done = !contract.change_amount.is_empty();
    let fee_rate_done = !contract.fee_rate.trim().is_empty();
    let to_amount_enough = sats_or_zero(&contract.to_amount) > 0;
    let change_amount_enough = sats_or_zero(&contract.change_amount) > 0;
    let fee_rate_enough = sats_or_zero(&contract.fee_rate) >= min_fee_rate;
    let tx_ready = contract.tx.is_some();

    let to_network = classifier.classify_address(&contract.to_address);
    let network_match = to_network == network_choice;

    let page3_valid = ((to_address_done && to_network.is_some()) || !contract.spending)
        && (change_amount_done || !contract.change)
        && fee_rate_done
        && (to_amount_enough || change_amount_enough)
        && fee_rate_enough
        && tx_ready;

    if contract.spending && !to_address_done {
        issues
            .page3
            .insert(Page3Issue::ToAddressBlank, "Address can't be blank".into());
    }
    if contract.spending && to_address_done && !network_match {
        let expected = network_choice.map(|n| n.as_str()).unwrap_or("");
        issues.page3.insert(
            Page3Issue::NetworkMismatch,
            format!("Address appears invalid for {}", expected),
        );
    }
    if !fee_rate_enough {
        issues.page3.insert(
            Page3Issue::FeeRateTooLow,
            format!(
                "Fee must be > {} sat/vByte to be relayed by most nodes.",
                display_rate(min_fee_rate)
            ),
        );
    }
    if contract.spending && !to_amount_enough && !change_amount_enough {
        issues.page3.insert(
            Page3Issue::InsufficientFunds,
            "Need Amount > 0. Insufficient funds after fee.".into(),
        );
    }
    if contract.spending && !to_amount_enough && change_amount_enough {
        issues.page3.insert(
            Page3Issue::ToAmountZero,
            "Need Amount > 0. Maybe you want to only reset timer?".into(),
        );
    }

    log::debug!(
        "validated pages: {} {} {}",
        page1_valid,
        page2_valid,
        page3_valid
    );

    Validation {
        issues,
        pages: Pages::from_validity(page1_valid, page2_valid, page3_valid),
        update: ContractUpdate {
            network_choice: Some(network_choice),
            address_type: Some(AddressType::from_address_prefix(&contract.address)),
            ..Default::default()
        },
    }
}

fn is_positive_days(days: &str) -> bool {
    matches!(days.trim().parse::<u32>(), Ok(d) if d > 0)
}

/// "1" for 1e8, "1.5" for 1.5e8.
fn display_rate(rate: i64) -> String {
    let formatted = format_sats(rate);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
