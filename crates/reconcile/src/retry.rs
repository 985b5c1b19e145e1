//! Bounded retry with exponential backoff
//!
//! Wraps one fallible provider call. Errors whose kind the policy lists as
//! retryable are absorbed until the attempt ceiling is reached; any other
//! error aborts at once. Waiting happens synchronously through a
//! [`Sleeper`], inside the current invocation.

use crate::context::Sleeper;
use crate::error::{ApiError, ApiErrorKind, ApiResult};
use std::time::Duration;

/// Retry limits and the error kinds they apply to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Wait after the first failure; doubles after each further failure
    pub base_delay: Duration,
    pub retryable: Vec<ApiErrorKind>,
}

impl Default for RetryPolicy {
    /// Default: 14 attempts, 2ms doubling, transient provider errors.
    fn default() -> Self {
        Self {
            max_attempts: 14,
            base_delay: Duration::from_millis(2),
            retryable: ApiErrorKind::TRANSIENT.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Wait after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    pub fn is_retryable(&self, err: &ApiError) -> bool {
        self.retryable.contains(&err.kind())
    }
}

/// One finished attempt, as reported to a [`RetryListener`]
#[derive(Debug)]
pub struct Attempt<'a> {
    /// 1-based attempt number
    pub number: u32,
    /// Total time waited between attempts so far
    pub delay_since_first: Duration,
    /// The failure, if the attempt failed
    pub error: Option<&'a ApiError>,
}

/// Observer of retry attempts
///
/// Called synchronously after every attempt. Listeners only observe; they
/// cannot change whether another attempt is made.
pub trait RetryListener {
    fn on_attempt(&mut self, attempt: &Attempt<'_>);
}

/// Listener that ignores every attempt
pub struct NoListener;

impl RetryListener for NoListener {
    fn on_attempt(&mut self, _attempt: &Attempt<'_>) {}
}

/// Listener that writes each attempt to the log
pub struct LogRetryListener {
    call: String,
    identifier: String,
    max_attempts: u32,
}

impl LogRetryListener {
    pub fn new(call: impl Into<String>, identifier: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            call: call.into(),
            identifier: identifier.into(),
            max_attempts,
        }
    }
}

impl RetryListener for LogRetryListener {
    fn on_attempt(&mut self, attempt: &Attempt<'_>) {
        let delay_ms = attempt.delay_since_first.as_millis();
        match attempt.error {
            None => log::info!(
                "{} [{}]: retry attempt {}/{} successful. Total delay since first attempt: {}ms",
                self.call,
                self.identifier,
                attempt.number,
                self.max_attempts,
                delay_ms
            ),
            Some(err) => log::warn!(
                "{} [{}]: retry attempt {}/{} failed with error message: {}. Total delay since first attempt: {}ms",
                self.call,
                self.identifier,
                attempt.number,
                self.max_attempts,
                err.message(),
                delay_ms
            ),
        }
    }
}

/// Why a retried call finally failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryError {
    /// Every attempt failed with a retryable error
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        delay_since_first: Duration,
        last: ApiError,
    },

    /// An attempt failed with an error the policy does not retry
    #[error(transparent)]
    NotRetryable(ApiError),
}

/// Bookkeeping for one retried call; never outlives it
#[derive(Debug, Default)]
struct RetryState {
    attempts: u32,
    delay_since_first: Duration,
}

/// Run `op` until it succeeds, fails terminally, or runs out of attempts
pub fn call_with_retry<T, F>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    listener: &mut dyn RetryListener,
    mut op: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> ApiResult<T>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut state = RetryState::default();

    loop {
        state.attempts += 1;
        let outcome = op();

        listener.on_attempt(&Attempt {
            number: state.attempts,
            delay_since_first: state.delay_since_first,
            error: outcome.as_ref().err(),
        });

        let err = match outcome {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !policy.is_retryable(&err) {
            return Err(RetryError::NotRetryable(err));
        }

        if state.attempts >= max_attempts {
            return Err(RetryError::Exhausted {
                attempts: state.attempts,
                delay_since_first: state.delay_since_first,
                last: err,
            });
        }

        let wait = policy.delay_after(state.attempts);
        log::debug!("Retrying in {}ms", wait.as_millis());
        sleeper.sleep(wait);
        state.delay_since_first += wait;
    }
}
