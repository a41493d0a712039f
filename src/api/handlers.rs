use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::crypto::{verify_signature, KeyPair, DEFAULT_KEY_BITS};
use crate::blockchain::{Block, Blockchain, ProofOfWork, Transaction};

use std::time::Instant;

/// Data structure for the blockchain state
pub type BlockchainData = web::Data<Blockchain>;

/// Difficulty used by the identity demonstration when none is given
const DEMO_DIFFICULTY: u32 = 4;

/// Response for the chain endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ChainResponse {
    /// The length of the chain
    pub length: usize,

    /// The blocks in the chain
    pub chain: Vec<Block>,

    /// Whether the chain is valid
    pub is_valid: bool,
}

/// Request for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionRequest {
    /// The sender's identity string
    pub sender: String,

    /// The recipient's identity string
    pub recipient: String,

    /// The amount to transfer
    pub amount: f64,
}

/// Response for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    /// The message
    pub message: String,

    /// The index of the block that will include this transaction
    pub block_index: u64,
}

/// Request for the mine endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MineRequest {
    /// The miner's identity string, credited with the mining reward
    pub miner_address: String,
}

/// Response for the mine endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MineResponse {
    /// The message
    pub message: String,

    /// The newly mined block
    pub block: Block,
}

/// Request for the standalone proof-of-work endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct PowSolveRequest {
    /// The identity string to use as the hash prefix
    pub identity: String,

    /// The number of leading zero hex digits required
    pub difficulty: u32,

    /// Optional cap on the number of nonces to try
    pub max_attempts: Option<u64>,
}

/// Response for the standalone proof-of-work endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct PowSolveResponse {
    /// The identity string that was solved for
    pub identity: String,

    /// The difficulty that was satisfied
    pub difficulty: u32,

    /// The winning nonce
    pub nonce: u64,

    /// The hex digest of identity + nonce
    pub digest: String,

    /// How many nonces were tried, including the winner
    pub attempts: u64,

    /// Wall-clock duration of the search in milliseconds
    pub elapsed_ms: u64,
}

/// Request for the identity proof endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct PowProveRequest {
    /// The identity string to prove work for and sign
    pub identity: String,

    /// The number of leading zero hex digits required (defaults to 4)
    pub difficulty: Option<u32>,
}

/// Response for the identity proof endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct PowProveResponse {
    /// The signed message: identity + winning nonce
    pub message: String,

    /// The hex digest of the signed message
    pub digest: String,

    /// The winning nonce
    pub nonce: u64,

    /// The RSA signature over the message, hex encoded
    pub signature: String,

    /// Whether the signature verified against the fresh public key
    pub verified: bool,
}

/// Get the full blockchain
///
/// Returns the entire blockchain and its validity status
#[utoipa::path(
    get,
    path = "/api/v1/chain",
    responses(
        (status = 200, description = "Blockchain retrieved successfully", body = ChainResponse)
    )
)]
pub async fn get_chain(blockchain: BlockchainData) -> impl Responder {
    let chain = blockchain.get_chain();
    let is_valid = blockchain.is_valid();

    let response = ChainResponse {
        length: chain.len(),
        chain,
        is_valid,
    };

    HttpResponse::Ok().json(response)
}

/// Get all pending transactions
///
/// Returns all transactions waiting to be included in a block
#[utoipa::path(
    get,
    path = "/api/v1/transactions/pending",
    responses(
        (status = 200, description = "Pending transactions retrieved successfully", body = Vec<Transaction>)
    )
)]
pub async fn get_pending_transactions(blockchain: BlockchainData) -> impl Responder {
    let transactions = blockchain.get_pending_transactions();
    HttpResponse::Ok().json(transactions)
}

/// Create a new transaction
///
/// Adds a new transaction to the pending transactions
#[utoipa::path(
    post,
    path = "/api/v1/transactions/new",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction created successfully", body = TransactionResponse)
    )
)]
pub async fn new_transaction(
    blockchain: BlockchainData,
    transaction_req: web::Json<TransactionRequest>,
) -> impl Responder {
    let block_index = blockchain.add_transaction(
        &transaction_req.sender,
        &transaction_req.recipient,
        transaction_req.amount,
    );

    let response = TransactionResponse {
        message: "Transaction will be added to Block".to_string(),
        block_index,
    };

    HttpResponse::Created().json(response)
}

/// Mine a new block
///
/// Runs the proof-of-work search and appends a new block carrying all
/// pending transactions plus the miner's reward
#[utoipa::path(
    post,
    path = "/api/v1/mine",
    request_body = MineRequest,
    responses(
        (status = 200, description = "Block mined successfully", body = MineResponse)
    )
)]
pub async fn mine_block(
    blockchain: BlockchainData,
    mine_req: web::Json<MineRequest>,
) -> impl Responder {
    let block = blockchain.mine_block(&mine_req.miner_address);

    let response = MineResponse {
        message: "New Block Mined".to_string(),
        block,
    };

    HttpResponse::Ok().json(response)
}

/// Check if the blockchain is valid
///
/// Validates the entire blockchain
#[utoipa::path(
    get,
    path = "/api/v1/validate",
    responses(
        (status = 200, description = "Blockchain validation status", body = bool)
    )
)]
pub async fn validate_chain(blockchain: BlockchainData) -> impl Responder {
    let is_valid = blockchain.is_valid();
    HttpResponse::Ok().json(is_valid)
}

/// Solve a standalone proof-of-work puzzle
///
/// Searches for the first nonce whose digest of identity + nonce meets the
/// requested difficulty. An optional attempt cap turns an unlucky search
/// into a clean failure instead of an open-ended burn.
#[utoipa::path(
    post,
    path = "/api/v1/pow/solve",
    request_body = PowSolveRequest,
    responses(
        (status = 200, description = "Proof of work solved successfully", body = PowSolveResponse),
        (status = 422, description = "Attempt cap exhausted before a valid nonce was found")
    )
)]
pub async fn solve_pow(solve_req: web::Json<PowSolveRequest>) -> impl Responder {
    let pow = ProofOfWork::new(solve_req.difficulty);
    let started = Instant::now();

    let solution = match solve_req.max_attempts {
        Some(max_attempts) => match pow.search_bounded(&solve_req.identity, max_attempts) {
            Ok(solution) => solution,
            Err(err) => {
                return HttpResponse::UnprocessableEntity().json(serde_json::json!({
                    "error": err.to_string()
                }));
            }
        },
        None => pow.search(&solve_req.identity),
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;

    let response = PowSolveResponse {
        identity: solve_req.identity.clone(),
        difficulty: solve_req.difficulty,
        attempts: solution.nonce + 1,
        nonce: solution.nonce,
        digest: solution.digest,
        elapsed_ms,
    };

    HttpResponse::Ok().json(response)
}

/// Prove and sign an identity
///
/// Solves the identity-string puzzle, then generates a fresh RSA keypair
/// and signs identity + nonce, demonstrating that a found proof can be
/// bound to a signer. The keypair lives only for this request
#[utoipa::path(
    post,
    path = "/api/v1/pow/prove",
    request_body = PowProveRequest,
    responses(
        (status = 200, description = "Identity proven and signed successfully", body = PowProveResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn prove_identity(prove_req: web::Json<PowProveRequest>) -> impl Responder {
    let difficulty = prove_req.difficulty.unwrap_or(DEMO_DIFFICULTY);
    let pow = ProofOfWork::new(difficulty);

    let solution = pow.search(&prove_req.identity);
    let message = format!("{}{}", prove_req.identity, solution.nonce);

    let keypair = match KeyPair::generate(DEFAULT_KEY_BITS) {
        Ok(keypair) => keypair,
        Err(err) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to generate keypair: {}", err)
            }));
        }
    };

    let signature = match keypair.sign(message.as_bytes()) {
        Ok(signature) => signature,
        Err(err) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to sign message: {}", err)
            }));
        }
    };

    let verified =
        verify_signature(message.as_bytes(), &signature, keypair.public_key()).unwrap_or(false);

    let response = PowProveResponse {
        message,
        digest: solution.digest,
        nonce: solution.nonce,
        signature: signature.to_string(),
        verified,
    };

    HttpResponse::Ok().json(response)
}
