//! address format classification
//!
//! An Abelian address is a hex string in one of three encodings: the
//! 462-char long form, the 134-char legacy short form (`abe3...`) and the
//! 136-char MLP short form (`abe010...` mainnet, `abe012...` testnet).

use crate::constants::{
    LONG_ADDRESS_LEN, MAINNET_PREFIX, SHORT_LEGACY_LEN, SHORT_LEGACY_PREFIX, SHORT_MLP_LEN,
    TESTNET_PREFIX,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressKind {
    Long,
    ShortLegacy,
    ShortMlp,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl AddressKind {
    pub fn is_short(self) -> bool {
        matches!(self, AddressKind::ShortLegacy | AddressKind::ShortMlp)
    }

    pub fn is_valid(self) -> bool {
        self != AddressKind::Invalid
    }

    /// network tag carried by an address, only MLP short addresses have one
    pub fn network(self, address: &str) -> Option<Network> {
        if self != AddressKind::ShortMlp {
            return None;
        }
        if address.starts_with(MAINNET_PREFIX) {
            Some(Network::Mainnet)
        } else if address.starts_with(TESTNET_PREFIX) {
            Some(Network::Testnet)
        } else {
            None
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressKind::Long => "long",
            AddressKind::ShortLegacy => "short (legacy)",
            AddressKind::ShortMlp => "short (mlp)",
            AddressKind::Invalid => "invalid",
        };
        f.write_str(name)
    }
}

fn is_hex(address: &str) -> bool {
    !address.is_empty() && address.bytes().all(|b| b.is_ascii_hexdigit())
}

/// classify an address string, total over all inputs
pub fn classify(address: &str) -> AddressKind {
    if !is_hex(address) {
        return AddressKind::Invalid;
    }

    match address.len() {
        LONG_ADDRESS_LEN => AddressKind::Long,
        SHORT_LEGACY_LEN if address.starts_with(SHORT_LEGACY_PREFIX) => AddressKind::ShortLegacy,
        SHORT_MLP_LEN
            if address.starts_with(MAINNET_PREFIX) || address.starts_with(TESTNET_PREFIX) =>
        {
            AddressKind::ShortMlp
        }
        _ => AddressKind::Invalid,
    }
}

pub fn is_long(address: &str) -> bool {
    classify(address) == AddressKind::Long
}

pub fn is_short(address: &str) -> bool {
    classify(address).is_short()
}

/// shorten for display: first 10 and last 10 characters
pub fn abbreviate(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 20 {
        return address.to_string();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 10..].iter().collect();
    format!("{}...{}", head, tail)
}
