use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sentinel sender for system-issued rewards; no account is debited
pub const SYSTEM_SENDER: &str = "0";

/// Represents a transfer recorded in a block
///
/// The field declaration order (`sender`, `recipient`, `amount`) is part of
/// the canonical serialization format and must not change, or every block
/// hash changes with it. Identities are opaque strings; the chain enforces
/// no format and keeps no balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// The sender's address, or [`SYSTEM_SENDER`] for a mining reward
    pub sender: String,

    /// The recipient's address
    pub recipient: String,

    /// Amount being transferred
    pub amount: f64,
}

impl Transaction {
    /// Creates a new transaction
    ///
    /// # Arguments
    ///
    /// * `sender` - The address of the sender
    /// * `recipient` - The address of the recipient
    /// * `amount` - The amount to transfer
    ///
    /// # Returns
    ///
    /// A new Transaction instance
    pub fn new(sender: &str, recipient: &str, amount: f64) -> Self {
        Transaction {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            amount,
        }
    }

    /// Creates a system-issued reward transaction for a miner
    ///
    /// The sender is the [`SYSTEM_SENDER`] sentinel, so the reward credits
    /// the miner without debiting anyone.
    pub fn reward(miner_address: &str, amount: f64) -> Self {
        Transaction {
            sender: SYSTEM_SENDER.to_string(),
            recipient: miner_address.to_string(),
            amount,
        }
    }

    /// Checks whether this transaction is a system-issued reward
    pub fn is_reward(&self) -> bool {
        self.sender == SYSTEM_SENDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction() {
        let transaction = Transaction::new("alice", "bob", 3.5);

        assert_eq!(transaction.sender, "alice");
        assert_eq!(transaction.recipient, "bob");
        assert_eq!(transaction.amount, 3.5);
        assert!(!transaction.is_reward());
    }

    #[test]
    fn test_reward_transaction() {
        let transaction = Transaction::reward("miner-address", 0.1);

        assert_eq!(transaction.sender, SYSTEM_SENDER);
        assert_eq!(transaction.recipient, "miner-address");
        assert_eq!(transaction.amount, 0.1);
        assert!(transaction.is_reward());
    }

    #[test]
    fn test_serializes_in_declaration_order() {
        let transaction = Transaction::new("a", "b", 1.5);
        let json = serde_json::to_string(&transaction).unwrap();

        assert_eq!(json, r#"{"sender":"a","recipient":"b","amount":1.5}"#);
    }
}
