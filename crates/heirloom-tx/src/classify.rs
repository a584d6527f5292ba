//! Network classification of keys and addresses.

use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Network, PrivateKey};
use heirloom_core::NetworkChoice;

/// Networks that share the test-net address and WIF encodings.
const TEST_NETWORKS: [Network; 3] = [Network::Testnet, Network::Signet, Network::Regtest];

/// Which network a WIF private key is encoded for.
pub fn classify_private_key(wif: &str) -> Option<NetworkChoice> {
    PrivateKey::from_wif(wif).ok().map(|key| key.network.into())
}

/// Which network an address is valid for.
pub fn classify_address(address: &str) -> Option<NetworkChoice> {
    let unchecked: Address<NetworkUnchecked> = address.parse().ok()?;
    network_of(&unchecked)
}

/// Parse an address and accept it only if it belongs to `choice`.
pub fn checked_address(address: &str, choice: NetworkChoice) -> Option<Address> {
    let unchecked: Address<NetworkUnchecked> = address.parse().ok()?;
    if network_of(&unchecked)? != choice {
        return None;
    }
    Some(unchecked.assume_checked())
}

fn network_of(address: &Address<NetworkUnchecked>) -> Option<NetworkChoice> {
    if address.is_valid_for_network(Network::Bitcoin) {
        Some(NetworkChoice::Bitcoin)
    } else if TEST_NETWORKS
        .iter()
        .any(|network| address.is_valid_for_network(*network))
    {
        Some(NetworkChoice::Testnet)
    } else {
        None
    }
}
