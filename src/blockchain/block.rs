use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::digest::sha256_hex;
use super::transaction::Transaction;

/// Proof recorded in the genesis block; arbitrary, since nothing was solved
pub const GENESIS_PROOF: u64 = 100;

/// Length in characters of a hex-encoded SHA-256 digest
const DIGEST_HEX_LEN: usize = 64;

/// Sentinel standing in for the hash of the (nonexistent) block before genesis
fn genesis_previous_hash() -> String {
    "1".repeat(DIGEST_HEX_LEN)
}

/// Represents a block in the blockchain
///
/// A block is sealed when it is appended to the chain and never modified
/// afterwards. It carries no cached hash of itself: the digest is recomputed
/// from the canonical serialization whenever a successor or a validation pass
/// needs it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Block {
    /// Position in the chain, starting at 1 for the genesis block
    pub index: u64,

    /// When the block was created; informational, not consensus-critical
    #[schema(value_type = String, example = "2023-01-01T12:00:00Z")]
    pub timestamp: DateTime<Utc>,

    /// Transactions sealed into this block
    pub transactions: Vec<Transaction>,

    /// The nonce that solved the proof-of-work for this block
    pub proof: u64,

    /// Hex digest of the previous block's canonical serialization
    pub previous_hash: String,
}

impl Block {
    /// Creates a new block stamped with the current time
    ///
    /// # Arguments
    ///
    /// * `index` - The index of the block in the chain
    /// * `transactions` - The transactions to seal into the block
    /// * `proof` - The solved proof-of-work nonce
    /// * `previous_hash` - The hash of the previous block
    ///
    /// # Returns
    ///
    /// A new Block instance
    pub fn new(index: u64, transactions: Vec<Transaction>, proof: u64, previous_hash: String) -> Self {
        Block {
            index,
            timestamp: Utc::now(),
            transactions,
            proof,
            previous_hash,
        }
    }

    /// Creates the fixed first block of a chain
    ///
    /// No proof-of-work is solved for genesis: the proof is the
    /// [`GENESIS_PROOF`] constant and the previous hash is an all-ones
    /// sentinel rather than a real digest.
    pub fn genesis() -> Self {
        Block::new(1, Vec::new(), GENESIS_PROOF, genesis_previous_hash())
    }

    /// Serializes the block into its canonical hashing form
    ///
    /// The canonical form is a compact JSON object whose keys appear in
    /// sorted order (serde_json's default map is a BTreeMap, and the keys
    /// are listed pre-sorted here), so identical field values always produce
    /// identical bytes regardless of how the block was assembled.
    /// Transactions serialize in their declared field order as part of the
    /// same format.
    pub fn canonical_json(&self) -> String {
        let block_data = serde_json::json!({
            "index": self.index,
            "previous_hash": self.previous_hash,
            "proof": self.proof,
            "timestamp": self.timestamp,
            "transactions": self.transactions,
        });

        serde_json::to_string(&block_data).unwrap()
    }

    /// Calculates the hash of the block
    ///
    /// # Returns
    ///
    /// The SHA-256 digest of the canonical serialization, as a 64-character
    /// lowercase hex string
    pub fn calculate_hash(&self) -> String {
        sha256_hex(self.canonical_json().as_bytes())
    }
}
