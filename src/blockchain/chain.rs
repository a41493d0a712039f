use log::info;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::block::Block;
use super::pow::ProofOfWork;
use super::transaction::Transaction;

/// Leading zeros required of a chained proof digest
pub const DEFAULT_DIFFICULTY: u32 = 5;

/// Reward credited to the miner address on each mined block
pub const MINING_REWARD: f64 = 0.1;

/// Represents the blockchain
///
/// Owns the append-only chain of sealed blocks and the buffer of pending
/// transactions waiting for the next block. Both live behind mutexes so the
/// multi-threaded HTTP driver can share one instance; mutations take the
/// pending lock first and the chain lock second, and `mine_block` holds the
/// pending lock across the whole search so the read-and-clear of the buffer
/// is atomic with respect to concurrent `add_transaction` calls.
#[derive(Debug, Clone)]
pub struct Blockchain {
    /// The chain of blocks
    chain: Arc<Mutex<Vec<Block>>>,

    /// Pending transactions to be included in the next block
    pending_transactions: Arc<Mutex<Vec<Transaction>>>,

    /// Mining difficulty (number of leading zeros required in the digest)
    difficulty: u32,

    /// Mining reward
    mining_reward: f64,
}

impl Blockchain {
    /// Creates a new blockchain with a genesis block
    ///
    /// # Returns
    ///
    /// A new Blockchain instance at the default difficulty
    pub fn new() -> Self {
        Self::with_difficulty(DEFAULT_DIFFICULTY)
    }

    /// Creates a new blockchain mining at the given difficulty
    ///
    /// Lower difficulties keep tests and demos fast; the genesis block and
    /// every other rule are identical to [`Blockchain::new`].
    pub fn with_difficulty(difficulty: u32) -> Self {
        Blockchain {
            chain: Arc::new(Mutex::new(vec![Block::genesis()])),
            pending_transactions: Arc::new(Mutex::new(Vec::new())),
            difficulty,
            mining_reward: MINING_REWARD,
        }
    }

    /// The configured mining difficulty
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Gets the last block in the chain
    ///
    /// # Returns
    ///
    /// The last block in the chain
    pub fn get_last_block(&self) -> Block {
        let chain = self.chain.lock().unwrap();
        chain.last().unwrap().clone()
    }

    /// Gets the entire blockchain
    ///
    /// # Returns
    ///
    /// A vector of all blocks in the chain
    pub fn get_chain(&self) -> Vec<Block> {
        self.chain.lock().unwrap().clone()
    }

    /// Gets all pending transactions
    ///
    /// # Returns
    ///
    /// A vector of all pending transactions
    pub fn get_pending_transactions(&self) -> Vec<Transaction> {
        self.pending_transactions.lock().unwrap().clone()
    }

    /// Adds a new transaction to the pending buffer
    ///
    /// No identity or balance checks are performed; there is no account
    /// model. The transaction stays pending until the next `mine_block`
    /// call seals it.
    ///
    /// # Arguments
    ///
    /// * `sender` - The address of the sender
    /// * `recipient` - The address of the recipient
    /// * `amount` - The amount to transfer
    ///
    /// # Returns
    ///
    /// The index of the block that will include this transaction
    pub fn add_transaction(&self, sender: &str, recipient: &str, amount: f64) -> u64 {
        self.pending_transactions
            .lock()
            .unwrap()
            .push(Transaction::new(sender, recipient, amount));

        self.get_last_block().index + 1
    }

    /// Mines a new block with the pending transactions
    ///
    /// Appends the miner's reward to the pending buffer, solves the chained
    /// proof-of-work against the last block's `previous_hash` and `proof`,
    /// then seals buffer, solution and the last block's digest into a new
    /// block. The search is unbounded, so this only returns once a proof is
    /// found.
    ///
    /// # Arguments
    ///
    /// * `miner_address` - The address credited with the mining reward
    ///
    /// # Returns
    ///
    /// The newly mined block
    pub fn mine_block(&self, miner_address: &str) -> Block {
        let started = Instant::now();

        // Reward goes into the same block as the pending transfers
        let mut pending = self.pending_transactions.lock().unwrap();
        pending.push(Transaction::reward(miner_address, self.mining_reward));

        let transactions = pending.clone();
        pending.clear();

        // Solve against the predecessor's previous_hash and proof; the
        // pending lock stays held so nothing slips into the cleared buffer
        // believing it will land in this block
        let last_block = self.get_last_block();
        let pow = ProofOfWork::new(self.difficulty);
        let solution = pow.search(&ProofOfWork::chain_prefix(&last_block));

        let block = Block::new(
            last_block.index + 1,
            transactions,
            solution.nonce,
            last_block.calculate_hash(),
        );

        self.chain.lock().unwrap().push(block.clone());

        info!(
            "Mined block {} (proof {}, {} transactions) in {:.2}s",
            block.index,
            block.proof,
            block.transactions.len(),
            started.elapsed().as_secs_f64()
        );

        block
    }

    /// Validates the blockchain
    ///
    /// # Returns
    ///
    /// true if the blockchain is valid, false otherwise
    pub fn is_valid(&self) -> bool {
        Self::validate_blocks(&self.chain.lock().unwrap(), self.difficulty)
    }

    /// Validates a sequence of blocks at the given difficulty
    ///
    /// For every adjacent pair this recomputes the previous block's digest
    /// and re-checks its successor's proof-of-work against the chained
    /// prefix. Any tampering with a sealed block breaks one of the two
    /// checks for the pair that follows it. A sequence of fewer than two
    /// blocks is trivially valid. Read-only; one digest and one verify per
    /// pair.
    pub fn validate_blocks(blocks: &[Block], difficulty: u32) -> bool {
        let pow = ProofOfWork::new(difficulty);

        for i in 1..blocks.len() {
            let current = &blocks[i];
            let previous = &blocks[i - 1];

            // Check that the hash link is intact
            if current.previous_hash != previous.calculate_hash() {
                return false;
            }

            // Check that the proof was solved against the predecessor
            if !pow.verify(&ProofOfWork::chain_prefix(previous), current.proof) {
                return false;
            }
        }

        true
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::transaction::SYSTEM_SENDER;

    #[test]
    fn test_new_blockchain() {
        let blockchain = Blockchain::new();
        let chain = blockchain.get_chain();

        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].index, 1);
        assert_eq!(chain[0].proof, 100);
        assert_eq!(blockchain.difficulty(), DEFAULT_DIFFICULTY);
        assert!(blockchain.is_valid());
    }

    #[test]
    fn test_add_transaction() {
        let blockchain = Blockchain::with_difficulty(1);

        let block_index = blockchain.add_transaction("alice", "bob", 4.2);

        assert_eq!(block_index, 2);
        let pending = blockchain.get_pending_transactions();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0], Transaction::new("alice", "bob", 4.2));
    }

    #[test]
    fn test_mine_block_appends_and_clears() {
        let blockchain = Blockchain::with_difficulty(2);
        blockchain.add_transaction("alice", "bob", 4.2);
        let old_last = blockchain.get_last_block();

        let block = blockchain.mine_block("miner");

        assert_eq!(blockchain.get_chain().len(), 2);
        assert_eq!(block.index, old_last.index + 1);
        assert_eq!(block.previous_hash, old_last.calculate_hash());
        assert!(blockchain.get_pending_transactions().is_empty());
        assert!(blockchain.is_valid());
    }

    #[test]
    fn test_mine_block_rewards_miner_last() {
        let blockchain = Blockchain::with_difficulty(2);
        blockchain.add_transaction("alice", "bob", 1.0);
        blockchain.add_transaction("carol", "dave", 2.0);

        let block = blockchain.mine_block("miner");

        assert_eq!(block.transactions.len(), 3);
        let reward = block.transactions.last().unwrap();
        assert_eq!(reward.sender, SYSTEM_SENDER);
        assert_eq!(reward.recipient, "miner");
        assert_eq!(reward.amount, MINING_REWARD);
    }

    #[test]
    fn test_mined_proof_chains_to_predecessor() {
        let blockchain = Blockchain::with_difficulty(2);
        let genesis = blockchain.get_last_block();

        let block = blockchain.mine_block("miner");

        let pow = ProofOfWork::new(2);
        assert!(pow.verify(&ProofOfWork::chain_prefix(&genesis), block.proof));
    }

    #[test]
    fn test_validate_detects_tampered_amount() {
        let blockchain = Blockchain::with_difficulty(2);
        blockchain.add_transaction("alice", "bob", 4.2);
        blockchain.mine_block("miner");
        blockchain.mine_block("miner");

        let mut blocks = blockchain.get_chain();
        assert!(Blockchain::validate_blocks(&blocks, 2));

        // Rewriting history in block 2 breaks the hash link to block 3
        blocks[1].transactions[0].amount = 999.9;
        assert!(!Blockchain::validate_blocks(&blocks, 2));
    }

    #[test]
    fn test_validate_detects_tampered_index() {
        let blockchain = Blockchain::with_difficulty(2);
        blockchain.mine_block("miner");
        blockchain.mine_block("miner");

        let mut blocks = blockchain.get_chain();
        blocks[1].index = 9;
        assert!(!Blockchain::validate_blocks(&blocks, 2));
    }

    #[test]
    fn test_validate_detects_inserted_transaction() {
        let blockchain = Blockchain::with_difficulty(2);
        blockchain.add_transaction("alice", "bob", 4.2);
        blockchain.mine_block("miner");
        blockchain.mine_block("miner");

        let mut blocks = blockchain.get_chain();
        blocks[1]
            .transactions
            .push(Transaction::new("mallory", "mallory", 1000.0));
        assert!(!Blockchain::validate_blocks(&blocks, 2));
    }

    #[test]
    fn test_validate_detects_tampered_proof() {
        let blockchain = Blockchain::with_difficulty(2);
        blockchain.add_transaction("alice", "bob", 4.2);
        blockchain.mine_block("miner");
        blockchain.mine_block("miner");
        blockchain.mine_block("miner");

        let mut blocks = blockchain.get_chain();
        assert_eq!(blocks.len(), 4);
        assert!(Blockchain::validate_blocks(&blocks, 2));

        blocks[2].proof = 12345678;
        assert!(!Blockchain::validate_blocks(&blocks, 2));
    }

    #[test]
    fn test_validate_detects_broken_link() {
        let blockchain = Blockchain::with_difficulty(2);
        blockchain.mine_block("miner");
        blockchain.mine_block("miner");

        let mut blocks = blockchain.get_chain();
        blocks[1].previous_hash = "f".repeat(64);
        assert!(!Blockchain::validate_blocks(&blocks, 2));
    }

    #[test]
    fn test_three_block_chain_is_valid() {
        let blockchain = Blockchain::with_difficulty(2);

        for round in 0..3 {
            blockchain.add_transaction("alice", "bob", 1.0 + round as f64);
            blockchain.mine_block("miner");
        }

        assert_eq!(blockchain.get_chain().len(), 4);
        assert!(blockchain.is_valid());
    }
}
