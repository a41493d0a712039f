use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod blockchain;

// Initialize the blockchain with its genesis block
fn initialize_blockchain() -> blockchain::Blockchain {
    let blockchain = blockchain::Blockchain::new();

    let genesis = blockchain.get_last_block();
    info!(
        "Initialized blockchain at difficulty {}, genesis hash {}",
        blockchain.difficulty(),
        genesis.calculate_hash()
    );

    blockchain
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::get_chain,
        api::handlers::get_pending_transactions,
        api::handlers::new_transaction,
        api::handlers::mine_block,
        api::handlers::validate_chain,
        api::handlers::solve_pow,
        api::handlers::prove_identity
    ),
    components(
        schemas(
            blockchain::Block,
            blockchain::Transaction,
            api::handlers::ChainResponse,
            api::handlers::TransactionRequest,
            api::handlers::TransactionResponse,
            api::handlers::MineRequest,
            api::handlers::MineResponse,
            api::handlers::PowSolveRequest,
            api::handlers::PowSolveResponse,
            api::handlers::PowProveRequest,
            api::handlers::PowProveResponse
        )
    ),
    tags(
        (name = "blockchain", description = "Blockchain API endpoints")
    ),
    info(
        title = "Minichain API",
        version = "1.0.0",
        description = "A minimal proof-of-work blockchain API",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
        contact(
            name = "API Support",
            email = "support@example.com"
        )
    )
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Create a new blockchain with its genesis block
    let blockchain = web::Data::new(initialize_blockchain());

    info!("Starting HTTP server at http://localhost:8080");

    // Start HTTP server
    HttpServer::new(move || {
        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        // Configure OpenAPI documentation
        let openapi = ApiDoc::openapi();

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(blockchain.clone())
            // API routes
            .configure(api::configure_routes)
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
