//! Bounded retry policy for register writes.
//!
//! Fixed attempt count, no backoff: each attempt is already bounded by the
//! bus timeout and a failed attempt has reset the bus.

/// Outcome of a retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempts<T, E> {
    /// Last result: the first success, or the final failure.
    pub result: Result<T, E>,
    /// Attempts made, in `1..=max_attempts`.
    pub attempts: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u8,
}

impl RetryPolicy {
    /// Policy for codec register writes: 5 attempts.
    pub const REGISTER_WRITE: Self = Self::new(5);

    pub const fn new(max_attempts: u8) -> Self {
        assert!(max_attempts > 0, "at least one attempt is required");
        Self { max_attempts }
    }

    #[inline]
    pub fn max_attempts(&self) -> u8 {
        self.max_attempts
    }

    /// Run `op` until it succeeds or the attempts are used up.
    pub fn run<T, E>(&self, mut op: impl FnMut() -> Result<T, E>) -> Attempts<T, E> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let result = op();
            if result.is_ok() || attempts >= self.max_attempts {
                return Attempts { result, attempts };
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::REGISTER_WRITE
    }
}
