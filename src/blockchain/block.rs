use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Transaction;

/// Proof carried by the genesis block.
pub const GENESIS_PROOF: u64 = 100;
/// Stand-in previous hash of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// A sealed set of transactions linked to its predecessor by hash and proof.
///
/// On the wire the timestamp is an RFC 3339 string; the hash is computed
/// from the decoded value so peers agree on it after a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Block {
        Block {
            index,
            timestamp: Utc::now(),
            transactions,
            proof,
            previous_hash,
        }
    }

    pub fn genesis() -> Block {
        Block::new(1, Vec::new(), GENESIS_PROOF, GENESIS_PREVIOUS_HASH.to_string())
    }

    pub fn hash(&self) -> String {
        crate::utils::digest(self)
    }
}
