use serde::{Deserialize, Serialize};

/// Sender recorded on system-minted mining rewards.
pub const REWARD_SENDER: &str = "0";
/// Amount minted for each mined block.
pub const MINING_REWARD: u64 = 1;

/// A transfer of value between two identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    pub fn reward(recipient: impl Into<String>) -> Self {
        Self::new(REWARD_SENDER, recipient, MINING_REWARD)
    }
}
