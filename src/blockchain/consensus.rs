use super::Block;
use core::fmt;
use log::debug;

/// Default number of leading hex zeros a proof hash must carry.
pub const DEFAULT_DIFFICULTY: usize = 4;
/// A SHA-256 hex digest has 64 characters.
pub const MAX_DIFFICULTY: usize = 64;

/// A chain that has passed [`Consensus::verify`]. Only `verify` builds one,
/// so holding it is proof the walk already ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedChain(Vec<Block>);

impl VerifiedChain {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.0
    }
}

pub trait Consensus: Sized + Clone + Send + Sync + 'static {
    /// First proof, counting up from zero, that is valid after `last_proof`.
    fn find_proof(&self, last_proof: u64) -> u64;

    fn is_valid(&self, last_proof: u64, proof: u64) -> bool;

    /// Checks every consecutive pair of the candidate against each other:
    /// the link hash and the proof predicate.
    fn validate_chain(&self, chain: &[Block]) -> bool {
        if chain.is_empty() {
            return false;
        }
        for i in 1..chain.len() {
            let previous = &chain[i - 1];
            let block = &chain[i];
            if block.previous_hash != previous.hash() {
                debug!("block {} does not link to block {}", block.index, previous.index);
                return false;
            }
            if !self.is_valid(previous.proof, block.proof) {
                debug!("block {} carries an invalid proof", block.index);
                return false;
            }
        }
        true
    }

    fn verify(&self, chain: Vec<Block>) -> Option<VerifiedChain> {
        self.validate_chain(&chain).then(|| VerifiedChain(chain))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: usize,
}

impl ProofOfWork {
    pub fn new(difficulty: usize) -> Self {
        ProofOfWork {
            difficulty: difficulty.min(MAX_DIFFICULTY),
        }
    }

}

impl Default for ProofOfWork {
    fn default() -> Self {
        ProofOfWork::new(DEFAULT_DIFFICULTY)
    }
}

impl fmt::Display for ProofOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Difficulty (leading zeros in hash) = {}",
            self.difficulty
        )
    }
}

impl Consensus for ProofOfWork {
    fn find_proof(&self, last_proof: u64) -> u64 {
        let mut proof = 0u64;
        while !self.is_valid(last_proof, proof) {
            proof += 1;
        }
        debug!("found proof {} after {}", proof, last_proof);
        proof
    }

    fn is_valid(&self, last_proof: u64, proof: u64) -> bool {
        let hash = crate::utils::proof_hash(last_proof, proof);
        hash.bytes().take(self.difficulty).all(|b| b == b'0')
    }
}
