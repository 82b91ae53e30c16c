use crate::api::client::HttpChainSource;
use crate::api::models::{
    ErrorResponse, MineResponse, NodesResponse, RegisterNodesRequest, RegisterNodesResponse,
    ResolveResponse, TransactionResponse,
};
use crate::blockchain::{
    mine_block, parse_address, ChainResponse, ConsensusResolver, Ledger, PeerRegistry,
    RewardPolicy, Transaction,
};
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// Everything a node's handlers share: the ledger, the peers it knows,
/// how it reconciles with them, and who its mining rewards go to.
pub struct NodeState {
    ledger: RwLock<Ledger>,
    peers: RwLock<PeerRegistry>,
    resolver: ConsensusResolver<HttpChainSource>,
    reward: RewardPolicy,
}

impl NodeState {
    pub fn new(
        ledger: Ledger,
        peers: PeerRegistry,
        resolver: ConsensusResolver<HttpChainSource>,
        reward: RewardPolicy,
    ) -> Self {
        NodeState {
            ledger: RwLock::new(ledger),
            peers: RwLock::new(peers),
            resolver,
            reward,
        }
    }

    fn ledger(&self) -> RwLockReadGuard<'_, Ledger> {
        self.ledger.read().unwrap_or_else(|e| e.into_inner())
    }

    fn ledger_mut(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.ledger.write().unwrap_or_else(|e| e.into_inner())
    }

    fn peers(&self) -> RwLockReadGuard<'_, PeerRegistry> {
        self.peers.read().unwrap_or_else(|e| e.into_inner())
    }

    fn peers_mut(&self) -> RwLockWriteGuard<'_, PeerRegistry> {
        self.peers.write().unwrap_or_else(|e| e.into_inner())
    }

    pub async fn resolve(&self) -> bool {
        self.resolver.resolve(&self.ledger, &self.peers).await
    }
}

pub async fn alive() -> impl Responder {
    HttpResponse::Ok().body("Node alive")
}

// POST /transactions/new: queues a transaction for the next block
pub async fn new_transaction(
    data: web::Data<NodeState>,
    tx: web::Json<Transaction>,
) -> impl Responder {
    let Transaction {
        sender,
        recipient,
        amount,
    } = tx.into_inner();
    match data.ledger_mut().queue_transaction(sender, recipient, amount) {
        Ok(index) => HttpResponse::Ok().json(TransactionResponse { success: index }),
        Err(e) => {
            error!("cannot queue transaction: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e))
        }
    }
}

// GET /mine: seals the pending pool into a new block. Runs until a block is
// appended, searching again whenever another block lands first.
pub async fn mine(data: web::Data<NodeState>) -> impl Responder {
    match mine_block(&data.ledger, &data.reward).await {
        Ok(block) => HttpResponse::Ok().json(MineResponse::from(block)),
        Err(e) => {
            error!("mining failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e))
        }
    }
}

// GET /chain: returns the full chain
pub async fn get_chain(data: web::Data<NodeState>) -> impl Responder {
    let ledger = data.ledger();
    HttpResponse::Ok().json(ChainResponse {
        chain: ledger.chain().to_vec(),
        length: ledger.len(),
    })
}

// POST /nodes/register: all addresses must parse or none are added
pub async fn register_nodes(
    data: web::Data<NodeState>,
    req: web::Json<RegisterNodesRequest>,
) -> impl Responder {
    if req.nodes.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("supply a valid list of nodes"));
    }
    for address in &req.nodes {
        if let Err(e) = parse_address(address) {
            return HttpResponse::BadRequest().json(ErrorResponse::new(e));
        }
    }

    let mut nodes = Vec::with_capacity(req.nodes.len());
    {
        let mut peers = data.peers_mut();
        for address in &req.nodes {
            match peers.register(address) {
                Ok(node) => nodes.push(node),
                Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::new(e)),
            }
        }
        info!("{} peer(s) known", peers.len());
    }

    HttpResponse::Ok().json(RegisterNodesResponse {
        message: "New nodes have been added".to_string(),
        total: nodes.len(),
        nodes,
    })
}

pub async fn get_nodes(data: web::Data<NodeState>) -> impl Responder {
    let mut nodes: Vec<String> = data.peers().all().into_iter().collect();
    nodes.sort();
    HttpResponse::Ok().json(NodesResponse { nodes })
}

// GET /nodes/resolve: longest valid chain among peers wins
pub async fn resolve(data: web::Data<NodeState>) -> impl Responder {
    let replaced = data.resolve().await;
    let chain = data.ledger().chain().to_vec();
    let response = if replaced {
        ResolveResponse {
            message: "Our chain was replaced".to_string(),
            chain: None,
            new_chain: Some(chain),
        }
    } else {
        ResolveResponse {
            message: "Our chain is authoritative".to_string(),
            chain: Some(chain),
            new_chain: None,
        }
    };
    HttpResponse::Ok().json(response)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/transactions/new", web::post().to(new_transaction))
        .route("/mine", web::get().to(mine))
        .route("/chain", web::get().to(get_chain))
        .route("/nodes", web::get().to(get_nodes))
        .route("/nodes/register", web::post().to(register_nodes))
        .route("/nodes/resolve", web::get().to(resolve))
        .route("/alive", web::get().to(alive));
}

// Start server with given state and address
pub async fn run_server(
    state: NodeState,
    address: (String, u16),
    sync_interval: Option<Duration>,
) -> std::io::Result<()> {
    let state = web::Data::new(state);
    info!("Starting node on {}:{}", address.0, address.1);

    if let Some(period) = sync_interval {
        let sync_state = state.clone();
        actix_web::rt::spawn(async move {
            let mut interval = actix_web::rt::time::interval(period);
            loop {
                interval.tick().await;
                if sync_state.resolve().await {
                    info!("background sync replaced the local chain");
                }
            }
        });
    }

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind(address)?
    .run()
    .await
}
