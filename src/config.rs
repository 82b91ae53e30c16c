use clap::Parser;
use std::time::Duration;

use crate::blockchain::consensus::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use crate::blockchain::mining::new_node_identifier;
use crate::blockchain::RewardPolicy;

#[derive(Debug, Clone, Parser)]
#[command(name = "powledger", version, about = "Proof-of-work ledger node")]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "POWLEDGER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(short, long, env = "POWLEDGER_PORT", default_value_t = 5001)]
    pub port: u16,

    /// Leading hex zeros required of a proof hash. Every node in a network
    /// must use the same value.
    #[arg(long, env = "POWLEDGER_DIFFICULTY", default_value_t = DEFAULT_DIFFICULTY,
          value_parser = parse_difficulty)]
    pub difficulty: usize,

    /// Recipient of mining rewards; generated at startup when absent
    #[arg(long, env = "POWLEDGER_NODE_ID", conflicts_with = "fresh_reward_id")]
    pub node_id: Option<String>,

    /// Pay each mined block's reward to a freshly generated identifier
    #[arg(long)]
    pub fresh_reward_id: bool,

    /// Peer to register at startup; repeatable
    #[arg(long = "peer")]
    pub peers: Vec<String>,

    #[arg(long, env = "POWLEDGER_PEER_TIMEOUT_SECS", default_value_t = 5)]
    pub peer_timeout_secs: u64,

    /// Seconds between background consensus rounds; 0 disables them
    #[arg(long, env = "POWLEDGER_SYNC_INTERVAL_SECS", default_value_t = 0)]
    pub sync_interval_secs: u64,
}

impl Config {
    pub fn reward_policy(&self) -> RewardPolicy {
        if self.fresh_reward_id {
            return RewardPolicy::PerBlock;
        }
        match &self.node_id {
            Some(id) => RewardPolicy::Node(id.clone()),
            None => RewardPolicy::Node(new_node_identifier()),
        }
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_secs(self.peer_timeout_secs)
    }

    pub fn sync_interval(&self) -> Option<Duration> {
        (self.sync_interval_secs > 0).then(|| Duration::from_secs(self.sync_interval_secs))
    }
}

fn parse_difficulty(value: &str) -> Result<usize, String> {
    let difficulty: usize = value.parse().map_err(|e| format!("{}", e))?;
    if difficulty > MAX_DIFFICULTY {
        return Err(format!("difficulty must be at most {}", MAX_DIFFICULTY));
    }
    Ok(difficulty)
}
