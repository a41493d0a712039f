use log::debug;
use thiserror::Error;

use super::block::Block;
use super::digest::sha256_hex;

/// How often the unbounded search reports progress at debug level
const PROGRESS_INTERVAL: u64 = 1_000_000;

/// Errors that can occur during proof-of-work operations
#[derive(Debug, Error)]
pub enum PowError {
    #[error("Search aborted: no valid nonce within {attempts} attempts")]
    AttemptsExhausted { attempts: u64 },
}

/// A solved proof-of-work puzzle: the winning nonce and its digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// The first nonce (counting up from 0) whose digest meets the target
    pub nonce: u64,

    /// Hex digest of `prefix ++ decimal(nonce)`
    pub digest: String,
}

/// Brute-force proof-of-work over a leading-zero-hex-digit target
///
/// The difficulty is the number of leading `'0'` characters required of the
/// hex digest. Each additional digit multiplies the expected search cost by
/// 16; verification stays a single digest.
#[derive(Debug, Clone)]
pub struct ProofOfWork {
    difficulty: u32,
    target: String,
}

impl ProofOfWork {
    /// Creates a proof-of-work instance for the given difficulty
    pub fn new(difficulty: u32) -> Self {
        let target = "0".repeat(difficulty as usize);
        ProofOfWork { difficulty, target }
    }

    /// The configured number of required leading zeros
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Builds the chained-protocol prefix for mining on top of `block`
    ///
    /// The prefix is the block's own `previous_hash` followed by its `proof`
    /// in decimal. The next block's proof is searched against exactly this
    /// string, which ties every proof to its predecessor but not to the
    /// successor's transaction content.
    pub fn chain_prefix(block: &Block) -> String {
        format!("{}{}", block.previous_hash, block.proof)
    }

    /// Searches for the lowest nonce whose digest meets the target
    ///
    /// Nonces are tried in ascending order starting at 0, so repeated calls
    /// with the same prefix always return the same solution. The loop is
    /// unbounded: termination is expected (geometric in `16^-difficulty`)
    /// but not guaranteed within any fixed number of attempts.
    ///
    /// # Arguments
    ///
    /// * `prefix` - The string the decimal nonce is appended to
    ///
    /// # Returns
    ///
    /// The first satisfying nonce together with its digest
    pub fn search(&self, prefix: &str) -> Solution {
        let mut nonce: u64 = 0;

        loop {
            let digest = self.candidate(prefix, nonce);
            if digest.starts_with(&self.target) {
                return Solution { nonce, digest };
            }

            nonce += 1;
            if nonce % PROGRESS_INTERVAL == 0 {
                debug!(
                    "Still searching at difficulty {}: {} attempts",
                    self.difficulty, nonce
                );
            }
        }
    }

    /// Searches like [`search`](Self::search) but gives up after `max_attempts` nonces
    ///
    /// Trying nonces `0..max_attempts`, this returns the same solution as the
    /// unbounded search whenever that solution lies within the bound, and
    /// `PowError::AttemptsExhausted` otherwise. Useful for tests and for
    /// callers that must bound worst-case latency.
    pub fn search_bounded(&self, prefix: &str, max_attempts: u64) -> Result<Solution, PowError> {
        for nonce in 0..max_attempts {
            let digest = self.candidate(prefix, nonce);
            if digest.starts_with(&self.target) {
                return Ok(Solution { nonce, digest });
            }
        }

        Err(PowError::AttemptsExhausted {
            attempts: max_attempts,
        })
    }

    /// Checks whether `nonce` solves the puzzle for `prefix`
    ///
    /// Recomputes one digest and tests the leading-zero condition; this is
    /// the cheap counterpart to the expensive search.
    pub fn verify(&self, prefix: &str, nonce: u64) -> bool {
        self.candidate(prefix, nonce).starts_with(&self.target)
    }

    /// Digest of `prefix ++ decimal(nonce)`
    fn candidate(&self, prefix: &str, nonce: u64) -> String {
        sha256_hex(format!("{}{}", prefix, nonce).as_bytes())
    }
}
