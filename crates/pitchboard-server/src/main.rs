use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use pitchboard_api::auth::{self, ApiConfig, AppState, AppStateInner};
use pitchboard_api::middleware::require_auth;
use pitchboard_api::revalidate::{ListingCache, Revalidator};
use pitchboard_api::{comments, enhance, pitches, reactions, users};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pitchboard=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("PITCHBOARD_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("PITCHBOARD_DB_PATH").unwrap_or_else(|_| "pitchboard.db".into());
    let mirror_path =
        std::env::var("PITCHBOARD_MIRROR_DB_PATH").unwrap_or_else(|_| "pitchboard-mirror.db".into());
    let host = std::env::var("PITCHBOARD_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PITCHBOARD_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    let write_token = std::env::var("PITCHBOARD_WRITE_TOKEN").ok();
    if write_token.is_none() {
        warn!("PITCHBOARD_WRITE_TOKEN is not set; pitch mutations will be refused");
    }

    let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
    let gemini_model =
        std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash-lite".into());

    // Init stores
    let db = pitchboard_db::Database::open(&PathBuf::from(&db_path))?;
    let mirror = pitchboard_db::mirror::MirrorStore::open(&PathBuf::from(&mirror_path))?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        mirror,
        revalidator: Revalidator::new(),
        listing_cache: ListingCache::default(),
        http: reqwest::Client::new(),
        config: ApiConfig {
            jwt_secret,
            write_token,
            gemini_api_key,
            gemini_model,
        },
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/callback", post(auth::callback))
        .route("/pitches", get(pitches::list_pitches))
        .route("/pitches/{id}", get(pitches::get_pitch))
        .route("/users", get(users::list_users))
        .route("/users/stats", get(users::user_stats))
        .route("/ai/enhance", post(enhance::enhance_pitch))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/pitches", post(pitches::create_pitch))
        .route("/pitches", delete(pitches::delete_all_owned))
        .route("/pitches/{id}", put(pitches::update_pitch))
        .route("/pitches/{id}", delete(pitches::delete_pitch))
        .route("/pitches/{id}/comments", post(comments::add_comment))
        .route("/pitches/{id}/reactions", post(reactions::toggle_reaction))
        .layer(middleware::from_fn(require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("PitchBoard server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
