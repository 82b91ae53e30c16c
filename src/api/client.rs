use reqwest::Client;
use std::future::Future;
use std::time::Duration;

use crate::blockchain::{ChainResponse, ChainSource, PeerError};

/// Fetches peer chains over HTTP from `http://<peer>/chain`.
#[derive(Debug, Clone)]
pub struct HttpChainSource {
    client: Client,
}

impl HttpChainSource {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl ChainSource for HttpChainSource {
    fn fetch_chain(
        &self,
        peer: &str,
    ) -> impl Future<Output = Result<ChainResponse, PeerError>> + Send {
        let url = format!("http://{}/chain", peer);
        let peer = peer.to_string();
        let client = self.client.clone();
        async move {
            let response = client.get(&url).send().await.map_err(|e| {
                if e.is_timeout() {
                    PeerError::Timeout { peer: peer.clone() }
                } else {
                    PeerError::Unreachable {
                        peer: peer.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;
            if !response.status().is_success() {
                return Err(PeerError::Status {
                    peer,
                    status: response.status().as_u16(),
                });
            }
            response
                .json::<ChainResponse>()
                .await
                .map_err(|e| PeerError::Decode {
                    peer,
                    reason: e.to_string(),
                })
        }
    }
}
