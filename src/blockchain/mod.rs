pub mod block;
pub mod chain;
pub mod consensus;
pub mod mempool;
pub mod mining;
pub mod peers;
pub mod resolver;
pub mod transaction;

pub use block::Block;
pub use chain::{Ledger, LedgerError};
pub use consensus::{Consensus, ProofOfWork, VerifiedChain};
pub use mempool::Mempool;
pub use mining::{mine_block, MiningError, RewardPolicy};
pub use peers::{parse_address, AddressParseError, PeerRegistry};
pub use resolver::{ChainResponse, ChainSource, ConsensusResolver, PeerError};
pub use transaction::Transaction;
