use log::info;
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum AddressParseError {
    #[error("peer address is empty")]
    Empty,
    #[error("invalid peer address: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("peer address {0} has no host")]
    MissingHost(String),
}

/// Normalises a peer URL such as `http://10.0.0.5:5000/` to `10.0.0.5:5000`.
/// A bare `host:port` is read as if it carried an `http://` scheme.
pub fn parse_address(address: &str) -> Result<String, AddressParseError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(AddressParseError::Empty);
    }
    let url = if trimmed.contains("://") {
        Url::parse(trimmed)?
    } else {
        Url::parse(&format!("http://{}", trimmed))?
    };
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AddressParseError::MissingHost(trimmed.to_string()))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Known peers as `host[:port]`, without duplicates.
#[derive(Debug, Clone, Default)]
pub struct PeerRegistry {
    nodes: HashSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a peer; returns the normalised address. Registering a known
    /// peer again is a no-op.
    pub fn register(&mut self, address: &str) -> Result<String, AddressParseError> {
        let node = parse_address(address)?;
        if self.nodes.insert(node.clone()) {
            info!("registered peer {}", node);
        }
        Ok(node)
    }

    pub fn contains(&self, address: &str) -> bool {
        parse_address(address)
            .map(|node| self.nodes.contains(&node))
            .unwrap_or(false)
    }

    pub fn all(&self) -> HashSet<String> {
        self.nodes.clone()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_extracts_host_and_port() {
        let mut registry = PeerRegistry::new();
        let node = registry.register("http://10.0.0.5:5000/").unwrap();
        assert_eq!(node, "10.0.0.5:5000");
        assert!(registry.contains("10.0.0.5:5000"));
        assert!(registry.contains("http://10.0.0.5:5000"));
        assert!(!registry.contains("10.0.0.5:5001"));
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = PeerRegistry::new();
        registry.register("http://10.0.0.5:5000/").unwrap();
        registry.register("http://10.0.0.5:5000/").unwrap();
        registry.register("10.0.0.5:5000").unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.all(),
            HashSet::from(["10.0.0.5:5000".to_string()])
        );
    }

    #[test]
    fn bare_hosts_are_accepted() {
        assert_eq!(parse_address("localhost:5001").unwrap(), "localhost:5001");
        assert_eq!(parse_address("node.example").unwrap(), "node.example");
        assert_eq!(parse_address("https://node.example/chain").unwrap(), "node.example");
    }

    #[test]
    fn invalid_addresses_are_not_inserted() {
        let mut registry = PeerRegistry::new();
        assert!(matches!(registry.register(""), Err(AddressParseError::Empty)));
        assert!(registry.register("http://").is_err());
        assert!(registry.register("http://host:notaport").is_err());
        assert!(registry.is_empty());
    }
}
