//! Chat microservice
//!
//! Manages two-party chat threads and their text/image messages. User
//! identity lives in an external user service; this service only verifies
//! bearer tokens and stores chats and messages in MongoDB.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod media;
pub mod models;
pub mod notify;
pub mod store;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use config::Config;
use directory::UserDirectory;
use media::MediaStore;
use notify::{LogNotifier, Notifier};
use store::ChatStore;

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<ChatStore>,
    pub directory: Arc<UserDirectory>,
    pub media: Arc<MediaStore>,
    pub notifier: Arc<dyn Notifier>,
}

/// Build the full router for the given state.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/chat/new", post(handlers::create_chat))
        .route("/chat/all", get(handlers::list_chats))
        .route("/message", post(handlers::send_message))
        .route("/message/{chat_id}", get(handlers::get_chat_messages))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::mw_require_auth,
        ));

    Router::new()
        .nest("/api/v1", api)
        .route("/media/{public_id}", get(media::serve_media))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    let config = Config::from_env()?;
    config.ensure_dirs().await?;

    let store = Arc::new(ChatStore::connect(&config.mongo_uri, &config.mongo_db).await?);
    let directory = Arc::new(UserDirectory::new(config.user_service.clone()));
    let media = Arc::new(MediaStore::new(
        config.media_dir.clone(),
        config.public_base_url.clone(),
    ));

    info!("User service: {}", config.user_service);
    info!("Media directory: {:?}", config.media_dir);

    let port = config.port;
    let state = AppState {
        config: Arc::new(config),
        store,
        directory,
        media,
        notifier: Arc::new(LogNotifier),
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK - Chat Server"
}
