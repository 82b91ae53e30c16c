use log::info;
use thiserror::Error;

use super::{Block, Consensus, Mempool, ProofOfWork, Transaction, VerifiedChain};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("chain has no blocks")]
    EmptyChain,
}

/// The chain plus the pool of transactions waiting for the next block.
///
/// Both sequences are private; blocks only enter through
/// [`Ledger::append_block`] or a wholesale [`Ledger::replace_chain`].
#[derive(Debug, Clone)]
pub struct Ledger<C: Consensus = ProofOfWork> {
    chain: Vec<Block>,
    mempool: Mempool,
    consensus: C,
}

impl<C: Consensus> Ledger<C> {
    pub fn new(consensus: C) -> Self {
        let mut ledger = Ledger {
            chain: Vec::new(),
            mempool: Mempool::new(),
            consensus,
        };
        ledger.create_genesis_block();
        ledger
    }

    fn create_genesis_block(&mut self) {
        self.chain.push(Block::genesis());
    }

    /// Seals the pending pool into a new block on top of the chain.
    pub fn append_block(&mut self, proof: u64, previous_hash: String) -> &Block {
        let index = self.chain.len() as u64 + 1;
        let transactions = self.mempool.take_pending();
        let block = Block::new(index, transactions, proof, previous_hash);
        info!(
            "appended block {} with {} transaction(s)",
            block.index,
            block.transactions.len()
        );
        self.chain.push(block);
        &self.chain[self.chain.len() - 1]
    }

    /// Queues a transaction and returns the index of the block that will hold it.
    pub fn queue_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> Result<u64, LedgerError> {
        let next_index = self.last_block()?.index + 1;
        self.mempool
            .add_transaction(Transaction::new(sender, recipient, amount));
        Ok(next_index)
    }

    pub fn last_block(&self) -> Result<&Block, LedgerError> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    pub fn is_chain_valid(&self, candidate: &[Block]) -> bool {
        self.consensus.validate_chain(candidate)
    }

    /// Adopts an already verified `candidate` if it is strictly longer than
    /// the local chain. Returns whether the chain was replaced.
    pub fn replace_chain(&mut self, candidate: VerifiedChain) -> bool {
        if candidate.len() <= self.chain.len() {
            return false;
        }
        info!(
            "replacing chain of length {} with length {}",
            self.chain.len(),
            candidate.len()
        );
        self.chain = candidate.into_blocks();
        true
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn pending_count(&self) -> usize {
        self.mempool.pending_count()
    }

    pub fn consensus(&self) -> &C {
        &self.consensus
    }
}
