//! Retry bookkeeping for a single invocation.
//!
//! ```text
//! Init -> Attempting -> Success
//!                    -> FatalError
//!                    -> TimeoutRetry -> Attempting   (attempt_count < max_retries)
//!                    -> Exhausted                    (attempt_count == max_retries)
//! ```

use std::time::Duration;

/// Exponential backoff applied between timed-out attempts.
///
/// The delay before retry `n + 1` is `unit * 2^n`, optionally capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Base time unit (default: one second).
    pub unit: Duration,
    /// Upper bound on a single delay (default: none).
    pub max_delay: Option<Duration>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            max_delay: None,
        }
    }
}

impl BackoffPolicy {
    /// Sets the base time unit.
    #[must_use]
    pub const fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Caps every delay at `max_delay`.
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Delay to wait after the `attempt`-th timed-out attempt (1-indexed).
    #[must_use]
    pub fn delay_after(&self, attempt: usize) -> Duration {
        let factor = u32::try_from(attempt)
            .ok()
            .and_then(|exp| 2u32.checked_pow(exp))
            .unwrap_or(u32::MAX);
        let delay = self.unit.saturating_mul(factor);
        self.max_delay.map_or(delay, |max| delay.min(max))
    }
}

/// Where an invocation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    /// Nothing sent yet.
    Init,
    /// A request is in flight.
    Attempting,
    /// The last attempt timed out and another one is scheduled.
    TimeoutRetry,
    /// The service answered.
    Success,
    /// A non-retryable error ended the invocation.
    FatalError,
    /// Every allowed attempt timed out.
    Exhausted,
}

impl RetryPhase {
    /// Returns `true` once the invocation has resolved.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::FatalError | Self::Exhausted)
    }
}

/// Outcome of recording a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutTransition {
    /// Wait this long, then attempt again.
    Retry(Duration),
    /// No attempts left.
    Exhausted,
}

/// Attempt counter and phase for one invocation.
#[derive(Debug, Clone)]
pub struct RetryState {
    attempt_count: usize,
    max_retries: usize,
    phase: RetryPhase,
    backoff: BackoffPolicy,
}

impl RetryState {
    /// Creates a state in [`RetryPhase::Init`].
    #[must_use]
    pub const fn new(max_retries: usize, backoff: BackoffPolicy) -> Self {
        Self {
            attempt_count: 0,
            max_retries,
            phase: RetryPhase::Init,
            backoff,
        }
    }

    /// Attempts started so far.
    #[must_use]
    pub const fn attempt_count(&self) -> usize {
        self.attempt_count
    }

    /// Attempt ceiling.
    #[must_use]
    pub const fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> RetryPhase {
        self.phase
    }

    /// Starts the next attempt and returns its 1-indexed number.
    ///
    /// Returns `None` when the state is terminal or the ceiling is reached.
    pub fn begin_attempt(&mut self) -> Option<usize> {
        if self.phase.is_terminal() || self.attempt_count >= self.max_retries {
            return None;
        }
        self.attempt_count += 1;
        self.phase = RetryPhase::Attempting;
        Some(self.attempt_count)
    }

    /// Records a timeout on the current attempt.
    pub fn on_timeout(&mut self) -> TimeoutTransition {
        if self.attempt_count >= self.max_retries {
            self.phase = RetryPhase::Exhausted;
            TimeoutTransition::Exhausted
        } else {
            self.phase = RetryPhase::TimeoutRetry;
            TimeoutTransition::Retry(self.backoff.delay_after(self.attempt_count))
        }
    }

    /// Records a successful reply.
    pub fn on_success(&mut self) {
        self.phase = RetryPhase::Success;
    }

    /// Records a non-retryable failure.
    pub fn on_fatal(&mut self) {
        self.phase = RetryPhase::FatalError;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(4));
        assert_eq!(policy.delay_after(3), Duration::from_secs(8));
    }

    #[test]
    fn test_delay_cap_and_overflow() {
        let capped = BackoffPolicy::default().with_max_delay(Duration::from_secs(5));
        assert_eq!(capped.delay_after(2), Duration::from_secs(4));
        assert_eq!(capped.delay_after(3), Duration::from_secs(5));

        let huge = BackoffPolicy::default().delay_after(200);
        assert_eq!(huge, Duration::from_secs(u64::from(u32::MAX)));
    }

    #[test]
    fn test_state_machine_until_exhausted() {
        let mut state = RetryState::new(3, BackoffPolicy::default());
        assert_eq!(state.phase(), RetryPhase::Init);

        assert_eq!(state.begin_attempt(), Some(1));
        assert_eq!(state.phase(), RetryPhase::Attempting);
        assert_eq!(state.on_timeout(), TimeoutTransition::Retry(Duration::from_secs(2)));
        assert_eq!(state.phase(), RetryPhase::TimeoutRetry);

        assert_eq!(state.begin_attempt(), Some(2));
        assert_eq!(state.on_timeout(), TimeoutTransition::Retry(Duration::from_secs(4)));

        assert_eq!(state.begin_attempt(), Some(3));
        assert_eq!(state.on_timeout(), TimeoutTransition::Exhausted);
        assert_eq!(state.phase(), RetryPhase::Exhausted);

        assert_eq!(state.begin_attempt(), None);
        assert_eq!(state.attempt_count(), 3);
    }

    #[test]
    fn test_terminal_states_stop_attempts() {
        let mut state = RetryState::new(3, BackoffPolicy::default());
        assert_eq!(state.begin_attempt(), Some(1));
        state.on_fatal();
        assert!(state.phase().is_terminal());
        assert_eq!(state.begin_attempt(), None);

        let mut state = RetryState::new(3, BackoffPolicy::default());
        assert_eq!(state.begin_attempt(), Some(1));
        state.on_success();
        assert_eq!(state.phase(), RetryPhase::Success);
        assert_eq!(state.begin_attempt(), None);
    }
}
