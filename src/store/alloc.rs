//! Identifier allocation with collision checking
//!
//! Ids are short random strings drawn from a space large enough that
//! collisions are astronomically unlikely. Uniqueness is still enforced,
//! not assumed: every candidate is re-checked against the live index and
//! redrawn on collision, within a bounded retry budget.

use rand::rngs::OsRng;
use rand::RngCore;

use super::errors::{StoreError, StoreResult};

/// Bytes of OS randomness per identifier (hex-encoded to twice as many
/// characters).
pub const ID_BYTES: usize = 5;

/// Default number of candidates drawn before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Collision-checked identifier allocator.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    max_attempts: u32,
}

impl IdAllocator {
    /// Create an allocator with the default retry budget.
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Create an allocator with a custom retry budget.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Allocate a fresh identifier.
    ///
    /// `is_taken` must answer against the set of committed ids; the caller
    /// is responsible for holding its write serialization point across
    /// allocation and commit so the answer cannot go stale.
    ///
    /// # Errors
    ///
    /// `AllocationExhausted` when every candidate in the budget collided.
    pub fn allocate<F>(&self, is_taken: F) -> StoreResult<String>
    where
        F: Fn(&str) -> bool,
    {
        for _ in 0..self.max_attempts {
            let candidate = random_id();
            if !is_taken(&candidate) {
                return Ok(candidate);
            }
        }

        Err(StoreError::AllocationExhausted(self.max_attempts))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw `ID_BYTES` bytes of OS randomness, hex-encoded.
fn random_id() -> String {
    let mut bytes = [0u8; ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
