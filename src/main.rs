use clap::Parser;
use log::{info, warn};
use powledger::api::client::HttpChainSource;
use powledger::api::server::{run_server, NodeState};
use powledger::blockchain::{ConsensusResolver, Ledger, PeerRegistry, ProofOfWork};
use powledger::config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    let consensus = ProofOfWork::new(config.difficulty);
    info!("{}", consensus);
    let ledger = Ledger::new(consensus);

    let mut peers = PeerRegistry::new();
    for peer in &config.peers {
        if let Err(e) = peers.register(peer) {
            warn!("ignoring peer {}: {}", peer, e);
        }
    }

    let source = HttpChainSource::new(config.peer_timeout())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let resolver = ConsensusResolver::new(source, config.peer_timeout());
    let reward = config.reward_policy();
    info!("mining rewards go to {:?}", reward);

    let state = NodeState::new(ledger, peers, resolver, reward);
    run_server(
        state,
        (config.host.clone(), config.port),
        config.sync_interval(),
    )
    .await
}
