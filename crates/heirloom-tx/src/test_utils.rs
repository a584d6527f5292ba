//! Shared test utilities for heirloom-tx tests.
//!
//! Deterministic keys and inheritance locking scripts compiled with
//! miniscript, so fixtures look like real locks.

use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Secp256k1, SecretKey};
use bitcoin::{Address, NetworkKind, PrivateKey, PublicKey, ScriptBuf, ScriptHash, WScriptHash};
use heirloom_core::NetworkChoice;
use miniscript::policy::Concrete;
use miniscript::{Legacy, Miniscript, ScriptContext, Segwitv0};
use std::str::FromStr;

/// BIP-173 P2WSH mainnet vector.
pub const TEST_P2WSH_MAINNET: &str =
    "bc1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3qccfmv3";

/// Deterministic private key `[0x01, 0.., seed]` on the given network.
pub fn test_private_key(seed_byte: u8, choice: NetworkChoice) -> PrivateKey {
    let mut secret_bytes = [0u8; 32];
    secret_bytes[31] = seed_byte;
    secret_bytes[0] = 0x01;
    let sk = SecretKey::from_slice(&secret_bytes).unwrap();
    let kind = match choice {
        NetworkChoice::Bitcoin => NetworkKind::Main,
        NetworkChoice::Testnet => NetworkKind::Test,
    };
    PrivateKey::new(sk, kind)
}

pub fn test_public_key(seed_byte: u8) -> PublicKey {
    let secp = Secp256k1::new();
    test_private_key(seed_byte, NetworkChoice::Testnet).public_key(&secp)
}

/// `or(pk(owner), and(pk(heir), older(blocks)))` compiled for context `Ctx`.
fn inheritance_script<Ctx: ScriptContext>(blocks: u32) -> ScriptBuf {
    let policy = Concrete::<PublicKey>::from_str(&format!(
        "or(pk({}),and(pk({}),older({})))",
        test_public_key(1),
        test_public_key(2),
        blocks
    ))
    .unwrap();
    let ms: Miniscript<PublicKey, Ctx> = policy.compile().unwrap();
    ms.encode()
}

/// Witness script of a P2WSH inheritance lock.
pub fn wsh_inheritance_script(blocks: u32) -> ScriptBuf {
    inheritance_script::<Segwitv0>(blocks)
}

/// Redeem script of a legacy P2SH inheritance lock.
pub fn sh_inheritance_script(blocks: u32) -> ScriptBuf {
    inheritance_script::<Legacy>(blocks)
}

pub fn p2wsh_address(script: &ScriptBuf, choice: NetworkChoice) -> Address {
    let spk = ScriptBuf::new_p2wsh(&WScriptHash::hash(script.as_bytes()));
    Address::from_script(&spk, choice.network()).unwrap()
}

pub fn p2sh_address(script: &ScriptBuf, choice: NetworkChoice) -> Address {
    let spk = ScriptBuf::new_p2sh(&ScriptHash::hash(script.as_bytes()));
    Address::from_script(&spk, choice.network()).unwrap()
}

/// A `txid-vout` key with a txid made of `byte` repeated.
pub fn utxo_key(byte: u8, vout: u32) -> String {
    format!("{}-{}", hex::encode([byte; 32]), vout)
}
