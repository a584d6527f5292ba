//! The contract snapshot threaded through reconciliation and validation.
//!
//! A [`ContractSnapshot`] is only ever changed by applying a
//! [`ContractUpdate`]: caller input, reconciler output and validator output
//! all take that shape, so every field change goes through one path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::amount;
use crate::primitives::DraftTransaction;

/// Default destination amount: larger than any real input, so the
/// reconciler folds it down to "everything after fee".
pub const DEFAULT_TO_AMOUNT: &str = "21000000";

/// Default fee rate in sat/vB.
pub const DEFAULT_FEE_RATE: &str = "1.000";

/// Placeholder virtual size used until a draft transaction exists.
pub const DEFAULT_VSIZE: u64 = 100;

/// Network a key or address belongs to, as far as WIF and address
/// encodings can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkChoice {
    Bitcoin,
    Testnet,
}

impl NetworkChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkChoice::Bitcoin => "bitcoin",
            NetworkChoice::Testnet => "testnet",
        }
    }

    /// The rust-bitcoin network used when building for this choice.
    pub fn network(&self) -> bitcoin::Network {
        match self {
            NetworkChoice::Bitcoin => bitcoin::Network::Bitcoin,
            NetworkChoice::Testnet => bitcoin::Network::Testnet,
        }
    }
}

impl fmt::Display for NetworkChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bitcoin::NetworkKind> for NetworkChoice {
    fn from(kind: bitcoin::NetworkKind) -> Self {
        match kind {
            bitcoin::NetworkKind::Main => NetworkChoice::Bitcoin,
            bitcoin::NetworkKind::Test => NetworkChoice::Testnet,
        }
    }
}

/// Output type of the locking address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    P2sh,
    P2wsh,
}

impl AddressType {
    /// Guess the type from the address prefix. Display hint only.
    pub fn from_address_prefix(address: &str) -> Option<Self> {
        if address.starts_with('3') || address.starts_with('2') {
            Some(AddressType::P2sh)
        } else if address.starts_with("bc") || address.starts_with("tb") {
            Some(AddressType::P2wsh)
        } else {
            None
        }
    }
}

/// Everything the owner wizard knows about the spend being drafted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSnapshot {
    // existing contract
    #[serde(rename = "ownerPrivateKeyWIF")]
    pub owner_private_key_wif: String,
    pub address: String,
    pub script_hex: String,
    pub network_choice: Option<NetworkChoice>,
    pub address_type: Option<AddressType>,
    /// Lock duration in days, as typed.
    pub days_locked: String,

    // outputs to spend, keyed by `txid-vout`, valued in whole coins
    #[serde(rename = "selectedUTXO")]
    pub selected_utxo: BTreeMap<String, String>,
    #[serde(rename = "sumOfUTXO")]
    pub sum_of_utxo: String,
    /// Pay a destination at all.
    pub spending: bool,
    /// Return change to the locking address, resetting the timer.
    pub change: bool,

    // destination
    pub to_address: String,
    pub to_amount: String,
    /// sat/vB
    pub fee_rate: String,
    pub change_address: String,
    pub fee_amount: String,
    pub change_amount: String,
    pub v_size: u64,

    /// Most recent draft built from this snapshot.
    pub tx: Option<DraftTransaction>,
}

impl Default for ContractSnapshot {
    fn default() -> Self {
        Self {
            owner_private_key_wif: String::new(),
            address: String::new(),
            script_hex: String::new(),
            network_choice: None,
            address_type: None,
            days_locked: String::new(),
            selected_utxo: BTreeMap::new(),
            sum_of_utxo: String::new(),
            spending: true,
            change: true,
            to_address: String::new(),
            to_amount: DEFAULT_TO_AMOUNT.to_string(),
            fee_rate: DEFAULT_FEE_RATE.to_string(),
            change_address: String::new(),
            fee_amount: "0".to_string(),
            change_amount: "0".to_string(),
            v_size: DEFAULT_VSIZE,
            tx: None,
        }
    }
}

impl ContractSnapshot {
    /// Apply a partial update, returning the new snapshot.
    pub fn updated(&self, update: &ContractUpdate) -> Self {
        let mut next = self.clone();
        update.apply(&mut next);
        next
    }

    /// Selected input value in satoshis, from the derived sum.
    pub fn input_sats(&self) -> i64 {
        amount::sats_or_zero(&self.sum_of_utxo)
    }

    /// Split a selected-UTXO key into its `txid` and `vout` parts.
    ///
    /// Keys without a separator yield an empty `vout`.
    pub fn split_utxo_key(key: &str) -> (&str, &str) {
        match key.split_once('-') {
            Some((txid, rest)) => (txid, rest.split('-').next().unwrap_or("")),
            None => (key, ""),
        }
    }
}

/// A partial snapshot: `Some` fields overwrite, `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractUpdate {
    #[serde(rename = "ownerPrivateKeyWIF")]
    pub owner_private_key_wif: Option<String>,
    pub address: Option<String>,
    pub script_hex: Option<String>,
    pub network_choice: Option<Option<NetworkChoice>>,
    pub address_type: Option<Option<AddressType>>,
    pub days_locked: Option<String>,
    #[serde(rename = "selectedUTXO")]
    pub selected_utxo: Option<BTreeMap<String, String>>,
    #[serde(rename = "sumOfUTXO")]
    pub sum_of_utxo: Option<String>,
    pub spending: Option<bool>,
    pub change: Option<bool>,
    pub to_address: Option<String>,
    pub to_amount: Option<String>,
    pub fee_rate: Option<String>,
    pub change_address: Option<String>,
    pub fee_amount: Option<String>,
    pub change_amount: Option<String>,
    pub v_size: Option<u64>,
    /// `Some(None)` clears the draft.
    pub tx: Option<Option<DraftTransaction>>,
}

impl ContractUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if applying this update would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, contract: &mut ContractSnapshot) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }

        set(&mut contract.owner_private_key_wif, &self.owner_private_key_wif);
        set(&mut contract.address, &self.address);
        set(&mut contract.script_hex, &self.script_hex);
        set(&mut contract.network_choice, &self.network_choice);
        set(&mut contract.address_type, &self.address_type);
        set(&mut contract.days_locked, &self.days_locked);
        set(&mut contract.selected_utxo, &self.selected_utxo);
        set(&mut contract.sum_of_utxo, &self.sum_of_utxo);
        set(&mut contract.spending, &self.spending);
        set(&mut contract.change, &self.change);
        set(&mut contract.to_address, &self.to_address);
        set(&mut contract.to_amount, &self.to_amount);
        set(&mut contract.fee_rate, &self.fee_rate);
        set(&mut contract.change_address, &self.change_address);
        set(&mut contract.fee_amount, &self.fee_amount);
        set(&mut contract.change_amount, &self.change_amount);
        set(&mut contract.v_size, &self.v_size);
        set(&mut contract.tx, &self.tx);
    }

    /// Layer `later` over `self`; fields set in `later` win.
    pub fn merge(mut self, later: ContractUpdate) -> Self {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.owner_private_key_wif, later.owner_private_key_wif);
        take(&mut self.address, later.address);
        take(&mut self.script_hex, later.script_hex);
        take(&mut self.network_choice, later.network_choice);
        take(&mut self.address_type, later.address_type);
        take(&mut self.days_locked, later.days_locked);
        take(&mut self.selected_utxo, later.selected_utxo);
        take(&mut self.sum_of_utxo, later.sum_of_utxo);
        take(&mut self.spending, later.spending);
        take(&mut self.change, later.change);
        take(&mut self.to_address, later.to_address);
        take(&mut self.to_amount, later.to_amount);
        take(&mut self.fee_rate, later.fee_rate);
        take(&mut self.change_address, later.change_address);
        take(&mut self.fee_amount, later.fee_amount);
        take(&mut self.change_amount, later.change_amount);
        take(&mut self.v_size, later.v_size);
        take(&mut self.tx, later.tx);
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_private_key(mut self, wif: impl Into<String>) -> Self {
        self.owner_private_key_wif = Some(wif.into());
        self
    }

    pub fn with_script_hex(mut self, script_hex: impl Into<String>) -> Self {
        self.script_hex = Some(script_hex.into());
        self
    }

    pub fn with_days_locked(mut self, days: impl Into<String>) -> Self {
        self.days_locked = Some(days.into());
        self
    }

    pub fn with_selected_utxo(mut self, utxos: BTreeMap<String, String>) -> Self {
        self.selected_utxo = Some(utxos);
        self
    }

    pub fn with_spending(mut self, spending: bool) -> Self {
        self.spending = Some(spending);
        self
    }

    pub fn with_change(mut self, change: bool) -> Self {
        self.change = Some(change);
        self
    }

    pub fn with_to_address(mut self, address: impl Into<String>) -> Self {
        self.to_address = Some(address.into());
        self
    }

    pub fn with_to_amount(mut self, amount: impl Into<String>) -> Self {
        self.to_amount = Some(amount.into());
        self
    }

    pub fn with_fee_rate(mut self, rate: impl Into<String>) -> Self {
        self.fee_rate = Some(rate.into());
        self
    }
}
