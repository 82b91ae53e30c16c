use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;

use super::{Block, Consensus, Ledger, PeerRegistry, VerifiedChain};

/// Body of `GET /chain`, served locally and fetched from peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("peer {peer} unreachable: {reason}")]
    Unreachable { peer: String, reason: String },
    #[error("peer {peer} answered with status {status}")]
    Status { peer: String, status: u16 },
    #[error("peer {peer} sent a malformed chain: {reason}")]
    Decode { peer: String, reason: String },
    #[error("peer {peer} timed out")]
    Timeout { peer: String },
    #[error("peer {peer} reported length {reported} but sent {actual} blocks")]
    LengthMismatch {
        peer: String,
        reported: usize,
        actual: usize,
    },
}

/// Where candidate chains come from.
pub trait ChainSource {
    fn fetch_chain(&self, peer: &str)
        -> impl Future<Output = Result<ChainResponse, PeerError>> + Send;
}

/// Longest-valid-chain rule against every registered peer.
#[derive(Debug, Clone)]
pub struct ConsensusResolver<S> {
    source: S,
    peer_timeout: Duration,
}

impl<S: ChainSource + Sync> ConsensusResolver<S> {
    pub fn new(source: S, peer_timeout: Duration) -> Self {
        Self {
            source,
            peer_timeout,
        }
    }

    /// Fetches every peer's chain and adopts the longest one that is strictly
    /// longer than ours and valid. Returns whether the local chain changed.
    ///
    /// No lock is held while fetching or validating; the write lock is taken
    /// only for the final swap, which re-checks length alone against the
    /// chain as it is at that moment.
    pub async fn resolve<C: Consensus>(
        &self,
        ledger: &RwLock<Ledger<C>>,
        registry: &RwLock<PeerRegistry>,
    ) -> bool {
        let peers = {
            let registry = registry.read().unwrap_or_else(|e| e.into_inner());
            if registry.is_empty() {
                return false;
            }
            registry.all()
        };
        let (mut max_length, consensus) = {
            let ledger = ledger.read().unwrap_or_else(|e| e.into_inner());
            (ledger.len(), ledger.consensus().clone())
        };
        let mut winning_chain: Option<VerifiedChain> = None;

        for peer in peers {
            let response = match self.fetch(&peer).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("skipping peer: {}", e);
                    continue;
                }
            };
            if response.length <= max_length {
                continue;
            }
            match consensus.verify(response.chain) {
                Some(chain) => {
                    max_length = response.length;
                    winning_chain = Some(chain);
                }
                None => warn!("peer {} sent an invalid chain", peer),
            }
        }

        let Some(chain) = winning_chain else {
            return false;
        };
        let mut ledger = ledger.write().unwrap_or_else(|e| e.into_inner());
        let replaced = ledger.replace_chain(chain);
        if replaced {
            info!("adopted peer chain of length {}", max_length);
        }
        replaced
    }

    async fn fetch(&self, peer: &str) -> Result<ChainResponse, PeerError> {
        let response = tokio::time::timeout(self.peer_timeout, self.source.fetch_chain(peer))
            .await
            .map_err(|_| PeerError::Timeout {
                peer: peer.to_string(),
            })??;
        if response.length != response.chain.len() {
            return Err(PeerError::LengthMismatch {
                peer: peer.to_string(),
                reported: response.length,
                actual: response.chain.len(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::ProofOfWork;
    use std::collections::HashMap;

    #[derive(Default)]
    struct StaticSource {
        chains: HashMap<String, ChainResponse>,
        slow: Vec<String>,
    }

    impl ChainSource for StaticSource {
        fn fetch_chain(
            &self,
            peer: &str,
        ) -> impl Future<Output = Result<ChainResponse, PeerError>> + Send {
            let slow = self.slow.iter().any(|p| p == peer);
            let result = self.chains.get(peer).cloned().ok_or(PeerError::Unreachable {
                peer: peer.to_string(),
                reason: "connection refused".to_string(),
            });
            async move {
                if slow {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
                result
            }
        }
    }

    fn ledger_of_length(len: usize) -> Ledger {
        let mut ledger = Ledger::new(ProofOfWork::new(2));
        while ledger.len() < len {
            ledger.queue_transaction("a", "b", ledger.len() as u64).unwrap();
            let last = ledger.last_block().unwrap().clone();
            let proof = ledger.consensus().find_proof(last.proof);
            ledger.append_block(proof, last.hash());
        }
        ledger
    }

    fn response(ledger: &Ledger) -> ChainResponse {
        ChainResponse {
            chain: ledger.chain().to_vec(),
            length: ledger.len(),
        }
    }

    fn registry(peers: &[&str]) -> RwLock<PeerRegistry> {
        let mut registry = PeerRegistry::new();
        for peer in peers {
            registry.register(peer).unwrap();
        }
        RwLock::new(registry)
    }

    fn resolver(source: StaticSource) -> ConsensusResolver<StaticSource> {
        ConsensusResolver::new(source, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn longer_valid_chain_replaces_local() {
        let remote = ledger_of_length(5);
        let local = RwLock::new(ledger_of_length(3));
        let mut source = StaticSource::default();
        source.chains.insert("10.0.0.5:5000".into(), response(&remote));

        let replaced = resolver(source)
            .resolve(&local, &registry(&["http://10.0.0.5:5000"]))
            .await;

        assert!(replaced);
        let local = local.read().unwrap();
        assert_eq!(local.len(), 5);
        assert_eq!(local.chain(), remote.chain());
    }

    #[tokio::test]
    async fn longer_invalid_chain_is_ignored() {
        let mut tampered = response(&ledger_of_length(5));
        tampered.chain[3].previous_hash = "bogus".into();
        let local = RwLock::new(ledger_of_length(3));
        let before = local.read().unwrap().chain().to_vec();
        let mut source = StaticSource::default();
        source.chains.insert("10.0.0.5:5000".into(), tampered);

        let replaced = resolver(source)
            .resolve(&local, &registry(&["10.0.0.5:5000"]))
            .await;

        assert!(!replaced);
        assert_eq!(local.read().unwrap().chain(), before.as_slice());
    }

    #[tokio::test]
    async fn equal_length_is_not_replaced() {
        let local = RwLock::new(ledger_of_length(3));
        let before = local.read().unwrap().chain().to_vec();
        let mut source = StaticSource::default();
        source
            .chains
            .insert("peer-a:1".into(), response(&ledger_of_length(3)));

        assert!(!resolver(source).resolve(&local, &registry(&["peer-a:1"])).await);
        assert_eq!(local.read().unwrap().chain(), before.as_slice());
    }

    #[tokio::test]
    async fn longest_of_several_peers_wins() {
        let local = RwLock::new(ledger_of_length(2));
        let longest = ledger_of_length(6);
        let mut source = StaticSource::default();
        source
            .chains
            .insert("peer-a:1".into(), response(&ledger_of_length(4)));
        source.chains.insert("peer-b:1".into(), response(&longest));

        let replaced = resolver(source)
            .resolve(&local, &registry(&["peer-a:1", "peer-b:1"]))
            .await;

        assert!(replaced);
        assert_eq!(local.read().unwrap().chain(), longest.chain());
    }

    #[tokio::test]
    async fn failing_peers_do_not_abort_resolution() {
        let local = RwLock::new(ledger_of_length(2));
        let remote = ledger_of_length(4);
        let mut source = StaticSource::default();
        source.chains.insert("good:1".into(), response(&remote));
        source
            .chains
            .insert("slow:1".into(), response(&ledger_of_length(6)));
        source.slow.push("slow:1".into());

        let replaced = resolver(source)
            .resolve(&local, &registry(&["down:1", "slow:1", "good:1"]))
            .await;

        assert!(replaced);
        assert_eq!(local.read().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn misreported_length_is_discarded() {
        let local = RwLock::new(ledger_of_length(2));
        let mut lying = response(&ledger_of_length(2));
        lying.length = 10;
        let mut source = StaticSource::default();
        source.chains.insert("liar:1".into(), lying);

        assert!(!resolver(source).resolve(&local, &registry(&["liar:1"])).await);
        assert_eq!(local.read().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn no_peers_leaves_chain_alone() {
        let local = RwLock::new(ledger_of_length(2));
        assert!(
            !resolver(StaticSource::default())
                .resolve(&local, &registry(&[]))
                .await
        );
        assert_eq!(local.read().unwrap().len(), 2);
    }
}
