//! Fixed-delay polling for reads that lag behind a just-submitted transaction.
//!
//! Contract state and explorer indexes are eventually consistent: a balance,
//! target wallet or mined transaction may read back as "empty" for a while
//! after the write that produces it. [`repeat_to_result`] keeps asking until a
//! non-empty value shows up or the attempt budget runs out.

use std::future::Future;
use std::time::Duration;

use alloy_primitives::{Address, FixedBytes, U256};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Default spacing between polls.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(5_000);

/// Re-poll budget used for balance confirmation and secret recovery.
pub const CONFIRMATION_REPOLLS: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempts {
    /// Number of re-polls allowed after the first call.
    Bounded(u32),
    Unbounded,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{label}: result still empty after {attempts} attempts")]
pub struct PollExhausted {
    pub label: &'static str,
    pub attempts: u32,
}

/// Values that can read back as "not there yet".
pub trait PollValue {
    fn is_empty_result(&self) -> bool;
}

macro_rules! impl_poll_value_for_ints {
    ($($ty:ty),*) => {
        $(impl PollValue for $ty {
            fn is_empty_result(&self) -> bool {
                *self == 0
            }
        })*
    };
}

impl_poll_value_for_ints!(u8, u16, u32, u64, u128, usize, i64);

impl PollValue for String {
    fn is_empty_result(&self) -> bool {
        self.is_empty()
    }
}

impl PollValue for U256 {
    fn is_empty_result(&self) -> bool {
        self.is_zero()
    }
}

impl PollValue for Address {
    fn is_empty_result(&self) -> bool {
        self.is_zero()
    }
}

impl<const N: usize> PollValue for FixedBytes<N> {
    fn is_empty_result(&self) -> bool {
        self.is_zero()
    }
}

impl<T: PollValue> PollValue for Option<T> {
    fn is_empty_result(&self) -> bool {
        self.as_ref().map_or(true, PollValue::is_empty_result)
    }
}

/// Calls `action` until it yields a non-empty value.
///
/// Errors from `action` are returned immediately; only empty results are
/// retried. A bounded budget that runs out yields [`PollExhausted`].
pub async fn repeat_to_result<T, E, F, Fut>(
    label: &'static str,
    attempts: Attempts,
    delay: Duration,
    mut action: F,
) -> Result<T, E>
where
    T: PollValue,
    E: From<PollExhausted>,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut remaining = attempts;
    let mut calls = 0u32;
    loop {
        let value = action().await?;
        calls = calls.saturating_add(1);
        if !value.is_empty_result() {
            return Ok(value);
        }

        remaining = match remaining {
            Attempts::Unbounded => Attempts::Unbounded,
            Attempts::Bounded(0) => {
                warn!(label, attempts = calls, "Polling budget exhausted");
                return Err(PollExhausted {
                    label,
                    attempts: calls,
                }
                .into());
            }
            Attempts::Bounded(left) => Attempts::Bounded(left - 1),
        };

        debug!(label, attempt = calls, delay_ms = delay.as_millis() as u64, "Empty result; polling again");
        sleep(delay).await;
    }
}
