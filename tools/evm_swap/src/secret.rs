//! Recovers the swap secret from a mined `withdraw` transaction.

use alloy::sol_types::SolInterface;
use tracing::warn;

use crate::contract::ISwap::ISwapCalls;

/// Secret revealed by a `withdraw` call input, hex without `0x`.
///
/// Inputs that do not decode as `withdraw` yield `None`, so polling a hash
/// of any other swap call ends in `PollExhausted`.
pub fn decode_withdraw_secret(input: &[u8]) -> Option<String> {
    match ISwapCalls::abi_decode(input) {
        Ok(ISwapCalls::withdraw(call)) => Some(swap_sdk::hex::encode(call._secret)),
        Ok(other) => {
            warn!(
                selector = %swap_sdk::hex::encode(other.selector()),
                "Transaction input is not a withdraw call"
            );
            None
        }
        Err(err) => {
            warn!(error = %err, "Cannot decode swap call input");
            None
        }
    }
}
