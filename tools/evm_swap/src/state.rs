//! Swap state as observed through contract reads.
//!
//! The contract owns the transitions; this side only classifies what it reads.

use alloy::primitives::{Address, FixedBytes, B256, U256};
use serde::{Deserialize, Serialize};

/// One `swaps(owner, participant)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub token: Address,
    pub target_wallet: Address,
    pub secret: B256,
    pub secret_hash: FixedBytes<20>,
    pub created_at: U256,
    pub balance: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapState {
    None,
    Funded,
    Withdrawn,
    Refunded,
}

impl SwapRecord {
    pub fn is_funded(&self) -> bool {
        !self.balance.is_zero()
    }

    pub fn target_wallet(&self) -> Option<Address> {
        (!self.target_wallet.is_zero()).then_some(self.target_wallet)
    }

    pub fn revealed_secret(&self) -> Option<B256> {
        (!self.secret.is_zero()).then_some(self.secret)
    }

    /// Classifies the entry. A drained entry is `Withdrawn` when the secret
    /// was revealed and `Refunded` otherwise.
    pub fn state(&self) -> SwapState {
        if self.is_funded() {
            SwapState::Funded
        } else if self.revealed_secret().is_some() {
            SwapState::Withdrawn
        } else if !self.secret_hash.is_zero() || !self.created_at.is_zero() {
            SwapState::Refunded
        } else {
            SwapState::None
        }
    }
}

impl SwapState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Withdrawn | Self::Refunded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SwapRecord {
        SwapRecord {
            token: Address::repeat_byte(0x11),
            target_wallet: Address::ZERO,
            secret: B256::ZERO,
            secret_hash: FixedBytes::repeat_byte(0xaa),
            created_at: U256::from(1_700_000_000u64),
            balance: U256::from(5u64),
        }
    }

    #[test]
    fn classifies_lifecycle() {
        let funded = record();
        assert_eq!(funded.state(), SwapState::Funded);
        assert!(!funded.state().is_terminal());

        let withdrawn = SwapRecord {
            balance: U256::ZERO,
            secret: B256::repeat_byte(0x42),
            ..record()
        };
        assert_eq!(withdrawn.state(), SwapState::Withdrawn);
        assert_eq!(withdrawn.revealed_secret(), Some(B256::repeat_byte(0x42)));

        let refunded = SwapRecord {
            balance: U256::ZERO,
            ..record()
        };
        assert_eq!(refunded.state(), SwapState::Refunded);
        assert!(refunded.state().is_terminal());

        let empty = SwapRecord {
            token: Address::ZERO,
            target_wallet: Address::ZERO,
            secret: B256::ZERO,
            secret_hash: FixedBytes::ZERO,
            created_at: U256::ZERO,
            balance: U256::ZERO,
        };
        assert_eq!(empty.state(), SwapState::None);
        assert_eq!(empty.target_wallet(), None);
    }

    #[test]
    fn state_serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&SwapState::Withdrawn).unwrap(), "\"withdrawn\"");
        let parsed: SwapState = serde_json::from_str("\"funded\"").unwrap();
        assert_eq!(parsed, SwapState::Funded);
    }
}
