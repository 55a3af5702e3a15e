//! Identity: an immutable holder of `{node, network_id, private_key?,
//! address?, debug}` (SPEC_FULL.md §4.3), grounded on `subxt_signer::eth`'s
//! secp256k1 + Keccak-256 address derivation (`signer/src/eth.rs`).

use crate::error::Error;
use keccak_hash::keccak;
use secp256k1::{Secp256k1, SecretKey};
use std::fmt;
use url::Url;

/// ICON's network id tags and their default node base URL (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkId {
    Mainnet,
    Lisbon,
    Berlin,
    Sejong,
    Btp,
}

impl NetworkId {
    pub fn hex(self) -> i64 {
        match self {
            NetworkId::Mainnet => 0x1,
            NetworkId::Lisbon => 0x2,
            NetworkId::Berlin => 0x7,
            NetworkId::Sejong => 0x53,
            NetworkId::Btp => 0x42,
        }
    }

    pub fn default_node(self) -> &'static str {
        match self {
            NetworkId::Mainnet => "https://ctz.solidwallet.io",
            NetworkId::Lisbon => "https://lisbon.net.solidwallet.io",
            NetworkId::Berlin => "https://berlin.net.solidwallet.io",
            NetworkId::Sejong => "https://sejong.net.solidwallet.io",
            NetworkId::Btp => "https://btp.net.solidwallet.io",
        }
    }

    /// Parse a network id given as a tag (`"mainnet"`), a `0x`-hex string, or
    /// a plain decimal string.
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "mainnet" => return Ok(NetworkId::Mainnet),
            "lisbon" => return Ok(NetworkId::Lisbon),
            "berlin" => return Ok(NetworkId::Berlin),
            "sejong" => return Ok(NetworkId::Sejong),
            "btp" => return Ok(NetworkId::Btp),
            _ => {}
        }
        let value = if let Some(hex) = s.strip_prefix("0x") {
            i64::from_str_radix(hex, 16).map_err(|_| Error::from("invalid network id"))?
        } else {
            s.parse::<i64>().map_err(|_| Error::from("invalid network id"))?
        };
        Self::from_hex(value).ok_or_else(|| Error::from("unknown network id"))
    }

    fn from_hex(value: i64) -> Option<Self> {
        match value {
            0x1 => Some(NetworkId::Mainnet),
            0x2 => Some(NetworkId::Lisbon),
            0x7 => Some(NetworkId::Berlin),
            0x53 => Some(NetworkId::Sejong),
            0x42 => Some(NetworkId::Btp),
            _ => None,
        }
    }
}

/// Options accepted by [`Identity::new`].
#[derive(Default)]
pub struct IdentityOptions {
    pub node: Option<String>,
    pub network_id: Option<NetworkId>,
    pub private_key: Option<[u8; 32]>,
    pub debug: bool,
}

/// Immutable holder of `{node URL, network id, optional private key,
/// derived address, debug flag}` (§3, §4.3).
#[derive(Clone)]
pub struct Identity {
    node: Url,
    network_id: NetworkId,
    private_key: Option<SecretKey>,
    address: Option<String>,
    debug: bool,
}

impl Identity {
    pub fn new(options: IdentityOptions) -> Result<Self, Error> {
        let network_id = options.network_id.unwrap_or(NetworkId::Mainnet);
        let node = match options.node {
            Some(n) => Url::parse(&n)?,
            None => Url::parse(network_id.default_node()).expect("default node URLs are valid"),
        };

        let (private_key, address) = match options.private_key {
            Some(bytes) => {
                let secret = SecretKey::from_slice(&bytes)?;
                let address = derive_address(&secret);
                (Some(secret), Some(address))
            }
            None => (None, None),
        };

        Ok(Identity {
            node,
            network_id,
            private_key,
            address,
            debug: options.debug,
        })
    }

    /// An identity with no wallet, pointed at mainnet — the default used by
    /// [`crate::stream`] constructors when no identity is supplied (§4.5).
    pub fn anonymous() -> Self {
        Identity::new(IdentityOptions::default()).expect("default options are always valid")
    }

    pub fn node(&self) -> &Url {
        &self.node
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn has_address(&self) -> bool {
        self.address.is_some()
    }

    pub fn can_sign(&self) -> bool {
        self.private_key.is_some()
    }

    pub(crate) fn secret_key(&self) -> Option<&SecretKey> {
        self.private_key.as_ref()
    }

    /// The URL for standard calls (`{node}/api/v3`) or debug calls
    /// (`{node}/api/v3d`) depending on `debug` (§4.4).
    pub fn api_url(&self) -> String {
        let suffix = if self.debug { "api/v3d" } else { "api/v3" };
        format!("{}{}", self.node.as_str().trim_end_matches('/'), format_args!("/{suffix}"))
    }
}

fn derive_address(secret: &SecretKey) -> String {
    let secp = Secp256k1::new();
    let public = secp256k1::PublicKey::from_secret_key(&secp, secret);
    derive_address_from_public(&public)
}

/// Same derivation as [`derive_address`], starting from a public key — used
/// by [`crate::request::verify`] to check a recovered signer against
/// `params.from` without ever seeing the private key.
pub(crate) fn derive_address_from_public(public: &secp256k1::PublicKey) -> String {
    let uncompressed = public.serialize_uncompressed();
    // Drop the leading 0x04 tag byte before hashing (§4.3).
    let hash = keccak(&uncompressed[1..]);
    let tail = &hash.as_bytes()[12..];
    format!("hx{}", hex::encode(tail))
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("node", &self.node.as_str())
            .field("network_id", &self.network_id.hex())
            .field("private_key", &self.private_key.as_ref().map(RedactedKey))
            .field("address", &self.address)
            .field("debug", &self.debug)
            .finish()
    }
}

/// Redacts a private key to its first 4 hex characters followed by an
/// ellipsis whenever an [`Identity`] is inspected (§4.3).
struct RedactedKey<'a>(&'a SecretKey);

impl fmt::Debug for RedactedKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.secret_bytes();
        write!(f, "{}…", hex::encode(&bytes[..2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_from_hex(hex_str: &str) -> [u8; 32] {
        let bytes = hex::decode(hex_str.trim_start_matches("0x")).unwrap();
        bytes.try_into().unwrap()
    }

    #[test]
    fn derives_address_from_private_key() {
        // Scenario 3: private key -> from == hxfd7e4560ba363f5aabd32caac7317feeee70ea57
        let key = key_from_hex("8ad9889bcee734a2605a6c4c50dd8acd28f54e62b828b2c8991aa46bd32976bf");
        let identity = Identity::new(IdentityOptions {
            private_key: Some(key),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            identity.address(),
            Some("hxfd7e4560ba363f5aabd32caac7317feeee70ea57")
        );
        assert!(identity.can_sign());
    }

    #[test]
    fn without_key_has_no_address_and_cannot_sign() {
        let identity = Identity::anonymous();
        assert!(!identity.has_address());
        assert!(!identity.can_sign());
    }

    #[test]
    fn network_id_parses_tag_hex_and_decimal() {
        assert_eq!(NetworkId::parse("lisbon").unwrap().hex(), 0x2);
        assert_eq!(NetworkId::parse("0x2").unwrap(), NetworkId::Lisbon);
        assert_eq!(NetworkId::parse("2").unwrap(), NetworkId::Lisbon);
    }

    #[test]
    fn debug_redacts_private_key() {
        let key = key_from_hex("8ad9889bcee734a2605a6c4c50dd8acd28f54e62b828b2c8991aa46bd32976bf");
        let identity = Identity::new(IdentityOptions {
            private_key: Some(key),
            ..Default::default()
        })
        .unwrap();
        let debug = format!("{identity:?}");
        assert!(!debug.contains("8ad9889b"));
    }

    #[test]
    fn debug_node_picks_v3d_suffix() {
        let identity = Identity::new(IdentityOptions {
            debug: true,
            ..Default::default()
        })
        .unwrap();
        assert!(identity.api_url().ends_with("/api/v3d"));
    }
}
