use sha2::{Digest, Sha256};

use crate::blockchain::Block;

/// SHA-256 over the canonical encoding of a block, as lowercase hex.
///
/// Field order is fixed: index, timestamp seconds, timestamp nanos,
/// transaction count, each transaction (sender, recipient, amount), proof,
/// previous hash. Integers are big-endian; strings are prefixed with their
/// byte length as a big-endian `u64` so adjacent fields cannot run together.
/// Peers recompute this when validating a chain, so it must never change.
pub fn digest(block: &Block) -> String {
    let mut hasher = Sha256::new();

    hasher.update(block.index.to_be_bytes());
    hasher.update(block.timestamp.timestamp().to_be_bytes());
    hasher.update(block.timestamp.timestamp_subsec_nanos().to_be_bytes());
    hasher.update((block.transactions.len() as u64).to_be_bytes());
    for tx in &block.transactions {
        update_str(&mut hasher, &tx.sender);
        update_str(&mut hasher, &tx.recipient);
        hasher.update(tx.amount.to_be_bytes());
    }
    hasher.update(block.proof.to_be_bytes());
    update_str(&mut hasher, &block.previous_hash);

    hex::encode(hasher.finalize())
}

/// Hash of the two proofs concatenated as decimal text.
pub fn proof_hash(last_proof: u64, proof: u64) -> String {
    let guess = format!("{}{}", last_proof, proof);
    hex::encode(Sha256::digest(guess.as_bytes()))
}

fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value.as_bytes());
}
