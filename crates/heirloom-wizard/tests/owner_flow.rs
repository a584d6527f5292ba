//! End-to-end owner wizard flow against the real bitcoin primitives.
//!
//! Locks are compiled from a miniscript inheritance policy, so the drafts,
//! the measured sizes and the fees are the ones a real lock produces.
//!
//! Run with: cargo test -p heirloom-wizard --test owner_flow

use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Secp256k1, SecretKey};
use bitcoin::{Address, Amount, NetworkKind, PrivateKey, PublicKey, ScriptBuf, WScriptHash};
use chrono::{TimeZone, Utc};
use heirloom_core::amount::parse_fixed8;
use heirloom_core::{AddressType, ContractBackup, ContractUpdate, NetworkChoice};
use heirloom_tx::BitcoinPrimitives;
use heirloom_wizard::{OwnerSession, Page3Issue, WizardConfig, WizardEvent};
use miniscript::policy::Concrete;
use miniscript::{Miniscript, Segwitv0};
use std::collections::BTreeMap;
use std::io::Write;
use std::str::FromStr;

const TESTNET_DESTINATION: &str = "tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sl5k7";
const MAINNET_DESTINATION: &str = "bc1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3qccfmv3";

// ============================================================================
// Fixtures
// ============================================================================

fn private_key(seed_byte: u8) -> PrivateKey {
    let mut secret_bytes = [0u8; 32];
    secret_bytes[0] = 0x01;
    secret_bytes[31] = seed_byte;
    let sk = SecretKey::from_slice(&secret_bytes).unwrap();
    PrivateKey::new(sk, NetworkKind::Test)
}

fn public_key(seed_byte: u8) -> PublicKey {
    private_key(seed_byte).public_key(&Secp256k1::new())
}

/// Owner can spend any time; heir after `blocks`.
fn inheritance_script(blocks: u32) -> ScriptBuf {
    let policy = Concrete::<PublicKey>::from_str(&format!(
        "or(pk({}),and(pk({}),older({})))",
        public_key(1),
        public_key(2),
        blocks
    ))
    .unwrap();
    let ms: Miniscript<PublicKey, Segwitv0> = policy.compile().unwrap();
    ms.encode()
}

struct Lock {
    wif: String,
    address: String,
    script_hex: String,
}

fn testnet_lock() -> Lock {
    let script = inheritance_script(4320);
    let spk = ScriptBuf::new_p2wsh(&WScriptHash::hash(script.as_bytes()));
    let address = Address::from_script(&spk, bitcoin::Network::Testnet).unwrap();
    Lock {
        wif: private_key(1).to_wif(),
        address: address.to_string(),
        script_hex: hex::encode(script.as_bytes()),
    }
}

fn credentials(lock: &Lock) -> ContractUpdate {
    ContractUpdate::new()
        .with_private_key(lock.wif.clone())
        .with_address(lock.address.clone())
        .with_script_hex(lock.script_hex.clone())
        .with_days_locked("30")
}

fn utxos(values: &[&str]) -> BTreeMap<String, String> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let txid = hex::encode([i as u8 + 0x11; 32]);
            (format!("{}-{}", txid, i), value.to_string())
        })
        .collect()
}

fn sats(value: &str) -> i64 {
    parse_fixed8(value).unwrap()
}

fn new_session() -> OwnerSession<BitcoinPrimitives> {
    OwnerSession::new(BitcoinPrimitives::new(), WizardConfig::default())
}

// ============================================================================
// Flows
// ============================================================================

#[test]
fn test_spend_with_change_back_to_lock() {
    let lock = testnet_lock();
    let mut session = new_session();

    session.change_contract_values(credentials(&lock));
    assert_eq!(
        session.contract().network_choice,
        Some(NetworkChoice::Testnet)
    );
    assert_eq!(session.contract().address_type, Some(AddressType::P2wsh));
    assert_eq!(
        session.change_page(2),
        vec![WizardEvent::PageSelected {
            previous: 1,
            page: 2
        }]
    );

    // max-send default: everything minus the fee goes to the destination
    session.change_contract_values(
        ContractUpdate::new()
            .with_selected_utxo(utxos(&["0.001"]))
            .with_to_address(TESTNET_DESTINATION),
    );
    let c = session.contract();
    let draft = c.tx.as_ref().expect("draft for a complete contract");
    assert_eq!(draft.virtual_size(), c.v_size);
    assert_eq!(draft.transaction().output.len(), 1);
    assert_eq!(sats(&c.fee_amount), c.v_size as i64);
    assert_eq!(sats(&c.to_amount) + sats(&c.fee_amount), 100_000);
    assert!(!c.change);
    let single_output_size = c.v_size;

    // partial spend: change output returns to the lock
    session.change_contract_values(
        ContractUpdate::new()
            .with_to_amount("0.0005")
            .with_change(true),
    );
    let c = session.contract();
    let draft = c.tx.as_ref().unwrap();
    assert!(c.v_size > single_output_size);
    assert_eq!(draft.virtual_size(), c.v_size);
    assert_eq!(c.to_amount, "0.00050000");
    assert!(c.change);
    assert_eq!(
        sats(&c.to_amount) + sats(&c.fee_amount) + sats(&c.change_amount),
        100_000
    );

    let tx = draft.transaction();
    assert_eq!(tx.output.len(), 2);
    assert_eq!(tx.output[0].value, Amount::from_sat(50_000));
    assert_eq!(
        tx.output[1].value,
        Amount::from_sat(sats(&c.change_amount) as u64)
    );
    assert_eq!(c.change_address, lock.address);

    assert!(session.pages().iter().all(|p| p.valid && p.usable));
    assert!(session.issues().page3.is_empty());
    assert_eq!(
        session.change_page(4),
        vec![WizardEvent::PageSelected {
            previous: 2,
            page: 4
        }]
    );
}

#[test]
fn test_reset_timer_only() {
    let lock = testnet_lock();
    let mut session = new_session();
    session.change_contract_values(credentials(&lock));
    session.change_contract_values(
        ContractUpdate::new()
            .with_selected_utxo(utxos(&["0.0007", "0.0003"]))
            .with_spending(false),
    );

    let c = session.contract();
    assert_eq!(c.sum_of_utxo, "0.00100000");
    assert_eq!(c.to_amount, "0.00000000");
    assert!(c.change);
    assert_eq!(sats(&c.change_amount) + sats(&c.fee_amount), 100_000);

    let tx = c.tx.as_ref().unwrap().transaction();
    assert_eq!(tx.input.len(), 2);
    assert_eq!(tx.output.len(), 1);
    assert!(session.pages().page(3).unwrap().valid);
    assert!(session.issues().page3.is_empty());
}

#[test]
fn test_destination_on_wrong_network() {
    let lock = testnet_lock();
    let mut session = new_session();
    session.change_contract_values(credentials(&lock));
    session.change_contract_values(
        ContractUpdate::new()
            .with_selected_utxo(utxos(&["0.001"]))
            .with_to_address(MAINNET_DESTINATION),
    );

    assert!(session.contract().tx.is_none());
    assert_eq!(
        session.issues().page3_message(Page3Issue::NetworkMismatch),
        Some("Address appears invalid for testnet")
    );
    assert!(!session.pages().page(3).unwrap().valid);
    assert_eq!(
        session.change_page(4),
        vec![WizardEvent::PageRejected { requested: 4 }]
    );
}

#[test]
fn test_low_fee_rate_blocks_transaction_page() {
    let lock = testnet_lock();
    let mut session = new_session();
    session.change_contract_values(credentials(&lock));
    session.change_contract_values(
        ContractUpdate::new()
            .with_selected_utxo(utxos(&["0.001"]))
            .with_to_address(TESTNET_DESTINATION)
            .with_fee_rate("0.5"),
    );

    // the draft still builds; only the relay floor fails
    assert!(session.contract().tx.is_some());
    assert!(session
        .issues()
        .page3
        .contains_key(&Page3Issue::FeeRateTooLow));
    assert!(!session.pages().is_usable(4));
}

#[test]
fn test_load_backup_file() {
    let lock = testnet_lock();
    let backup = ContractBackup {
        version: 1,
        address: lock.address.clone(),
        script_hex: lock.script_hex.clone(),
        days_locked: "30".into(),
        owner_private_key_wif: Some(lock.wif.clone()),
        network_choice: Some(NetworkChoice::Testnet),
        created_at: Some(1_700_000_000_000),
    };
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", backup.to_json().unwrap()).unwrap();

    let mut session = new_session();
    let events = session.change_file(ContractBackup::load(file.path()).unwrap());
    assert_eq!(
        events[0],
        WizardEvent::BackupLoaded {
            address: lock.address.clone()
        }
    );
    assert!(session.pages().page(1).unwrap().valid);
    assert!(session.pages().is_usable(2));
    assert_eq!(session.backup(), Some(&backup));

    let unlock_at =
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap() + chrono::Duration::days(30);
    let countdown = session
        .lock_countdown(unlock_at - chrono::Duration::hours(5))
        .unwrap();
    assert!(!countdown.is_unlocked);
    assert_eq!(countdown.short_form, "0 days 5 hours left");
}
