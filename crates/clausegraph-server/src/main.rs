use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use clausegraph_reasoning::ContractPipeline;

mod handlers;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("clausegraph=info".parse().expect("valid log directive")),
        )
        .init();

    let config = clausegraph_core::AppConfig::from_env();
    let host = config.server_host.clone();
    let port = config.server_port;

    let pipeline = ContractPipeline::from_config(&config).expect("Failed to build analysis pipeline");
    let state = AppState::new(pipeline);

    let app = routes::create_router()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{host}:{port}");
    tracing::info!("clausegraph server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
