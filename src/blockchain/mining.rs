use log::{info, warn};
use std::sync::RwLock;
use thiserror::Error;

use super::{Block, Consensus, Ledger, LedgerError, Transaction};

#[derive(Debug, Error)]
pub enum MiningError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("proof search worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Who receives the reward for a mined block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardPolicy {
    /// Every reward goes to the same node identifier.
    Node(String),
    /// A fresh identifier is generated for each block.
    PerBlock,
}

impl RewardPolicy {
    pub fn recipient(&self) -> String {
        match self {
            RewardPolicy::Node(id) => id.clone(),
            RewardPolicy::PerBlock => new_node_identifier(),
        }
    }
}

/// A UUID v4 rendered without dashes.
pub fn new_node_identifier() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Mines one block on top of the current tip and runs until it is appended.
///
/// The proof search runs on a blocking worker with no lock held. The reward
/// is queued and the block appended under a single write lock, after checking
/// that the tip is still the block the proof was found against; if another
/// block landed in the meantime the search starts over on the new tip.
pub async fn mine_block<C: Consensus>(
    ledger: &RwLock<Ledger<C>>,
    reward: &RewardPolicy,
) -> Result<Block, MiningError> {
    mine_with(ledger, reward, |consensus: &C, last_proof| {
        consensus.find_proof(last_proof)
    })
    .await
}

async fn mine_with<C, F>(
    ledger: &RwLock<Ledger<C>>,
    reward: &RewardPolicy,
    search: F,
) -> Result<Block, MiningError>
where
    C: Consensus,
    F: Fn(&C, u64) -> u64 + Clone + Send + 'static,
{
    loop {
        let (last_block, consensus) = {
            let chain = ledger.read().unwrap_or_else(|e| e.into_inner());
            (chain.last_block()?.clone(), chain.consensus().clone())
        };

        let last_proof = last_block.proof;
        let search = search.clone();
        let proof =
            tokio::task::spawn_blocking(move || search(&consensus, last_proof)).await?;

        if let Some(block) = seal_on_tip(ledger, &last_block, proof, reward)? {
            return Ok(block);
        }
        warn!("chain changed during mining, discarding proof {}", proof);
    }
}

// Appends only if `tip` is still the last block; `None` when it moved.
fn seal_on_tip<C: Consensus>(
    ledger: &RwLock<Ledger<C>>,
    tip: &Block,
    proof: u64,
    reward: &RewardPolicy,
) -> Result<Option<Block>, MiningError> {
    let mut chain = ledger.write().unwrap_or_else(|e| e.into_inner());
    if chain.last_block()? != tip {
        return Ok(None);
    }
    let reward_tx = Transaction::reward(reward.recipient());
    chain.queue_transaction(reward_tx.sender, reward_tx.recipient, reward_tx.amount)?;
    info!(
        "sealing {} pending transaction(s) with proof {}",
        chain.pending_count(),
        proof
    );
    let block = chain.append_block(proof, tip.hash()).clone();
    Ok(Some(block))
}
