pub mod hash;

pub use hash::{digest, proof_hash};
