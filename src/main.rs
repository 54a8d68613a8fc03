use axum::serve;
use dotenvy::dotenv;
use link_shortener::config::Config;
use link_shortener::dao::LinkStore;
use link_shortener::routes::{create_router, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_TRACING_LEVEL: &str = "link_shortener=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    _ = dotenv();
    configure_tracing();
    let config = Config::from_env().expect("Invalid configuration");
    let server_address = config.server_address().expect("Invalid server address");
    let store = LinkStore::new(&config.base_url);
    let state = AppState::new(store, config.default_validity_minutes);
    let listener = create_listener(server_address).await;
    let router = create_router(state);
    serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server failed to start");
}

fn configure_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or(DEFAULT_TRACING_LEVEL.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn create_listener(server_address: SocketAddr) -> TcpListener {
    let listener = TcpListener::bind(server_address)
        .await
        .expect("Creating tcp listener failed");
    tracing::info!("Listening on address: {}", server_address);
    listener
}
