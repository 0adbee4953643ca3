//! Signing capability for the UTXO side of a swap.
//!
//! A `SigningAccount` is built once from a WIF key (or freshly generated) and
//! is never mutated afterwards. Everything else in the crate only sees its
//! address, public key and `sign`.

use std::fmt;
use std::str::FromStr;

use bitcoin::address::NetworkUnchecked;
use bitcoin::ecdsa;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{rand, All, Message, Secp256k1};
use bitcoin::sighash::{EcdsaSighashType, LegacySighash};
use bitcoin::{Address, NetworkKind, PrivateKey, PublicKey};

use crate::config::BtcNetwork;
use crate::types::{BtcWalletError, Result};

pub struct SigningAccount {
    secp: Secp256k1<All>,
    private_key: PrivateKey,
    public_key: PublicKey,
    address: Address,
    network: BtcNetwork,
}

impl SigningAccount {
    /// Imports a WIF key; its network byte must match `network`.
    pub fn from_wif(wif: &str, network: BtcNetwork) -> Result<Self> {
        let private_key = PrivateKey::from_wif(wif.trim())
            .map_err(|err| BtcWalletError::InvalidKey(err.to_string()))?;
        if private_key.network != NetworkKind::from(network.to_bitcoin()) {
            return Err(BtcWalletError::InvalidKey(format!(
                "key is not for {network:?}"
            )));
        }
        Ok(Self::from_private_key(private_key, network))
    }

    pub fn generate(network: BtcNetwork) -> Self {
        let secp = Secp256k1::new();
        let (secret_key, _) = secp.generate_keypair(&mut rand::thread_rng());
        Self::from_private_key(PrivateKey::new(secret_key, network.to_bitcoin()), network)
    }

    pub fn from_private_key(private_key: PrivateKey, network: BtcNetwork) -> Self {
        let secp = Secp256k1::new();
        let public_key = private_key.public_key(&secp);
        let address = Address::p2pkh(public_key.pubkey_hash(), network.to_bitcoin());
        Self {
            secp,
            private_key,
            public_key,
            address,
            network,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn network(&self) -> BtcNetwork {
        self.network
    }

    /// Signs a legacy sighash with `SIGHASH_ALL`.
    pub fn sign(&self, sighash: LegacySighash) -> ecdsa::Signature {
        let message = Message::from_digest(sighash.to_byte_array());
        ecdsa::Signature {
            signature: self.secp.sign_ecdsa(&message, &self.private_key.inner),
            sighash_type: EcdsaSighashType::All,
        }
    }

    /// WIF encoding of the private key.
    pub fn export_private_key(&self) -> String {
        self.private_key.to_wif()
    }

    /// Parses a destination address and checks it belongs to this account's network.
    pub fn parse_address(&self, value: &str) -> Result<Address> {
        parse_address(value, self.network)
    }
}

impl fmt::Debug for SigningAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningAccount")
            .field("address", &self.address.to_string())
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

pub fn parse_address(value: &str, network: BtcNetwork) -> Result<Address> {
    let invalid = |message: String| BtcWalletError::InvalidAddress {
        address: value.to_string(),
        message,
    };
    Address::<NetworkUnchecked>::from_str(value.trim())
        .map_err(|err| invalid(err.to_string()))?
        .require_network(network.to_bitcoin())
        .map_err(|err| invalid(err.to_string()))
}
