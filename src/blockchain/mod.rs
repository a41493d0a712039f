// Blockchain module
//
// This module contains the core blockchain implementation including:
// - Block structure
// - Blockchain structure
// - Transaction structure
// - Hashing and proof of work primitives
// - RSA signing utilities

pub mod block;
pub mod chain;
pub mod crypto;
pub mod digest;
pub mod pow;
pub mod transaction;

// Re-export main components for easier access
pub use block::Block;
pub use chain::{Blockchain, DEFAULT_DIFFICULTY, MINING_REWARD};
pub use crypto::{DigitalSignature, KeyPair};
pub use pow::ProofOfWork;
pub use transaction::Transaction;
