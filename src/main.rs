use anyhow::Context;
use axum::{extract::State, http::Method, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use slither_arena::game::config::WorldConfig;
use slither_arena::game::random::SeededRandom;
use slither_arena::game::world::World;
use slither_arena::runtime::{run_tick_loop, RuntimeConfig};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    world: Arc<Mutex<World>>,
}

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let runtime = RuntimeConfig::from_env().context("invalid runtime configuration")?;
    let world_config = WorldConfig::from_env().context("invalid world configuration")?;

    let random = match runtime.seed {
        Some(seed) => SeededRandom::new(seed),
        None => SeededRandom::from_entropy(),
    };
    let mut world = World::new(world_config, Box::new(random));
    world.init();
    let world = Arc::new(Mutex::new(world));

    tokio::spawn(run_tick_loop(Arc::clone(&world), runtime.tick_ms));

    let state = Arc::new(AppState { world });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    let mut app: Router<Arc<AppState>> = Router::new()
        .route("/api/health", get(health))
        .route("/api/stats", get(stats));

    if runtime.debug_commands {
        app = app.route("/api/debug/world", get(debug_world));
    }

    let app: Router = app.layer(cors).with_state(state);

    let address = format!("0.0.0.0:{}", runtime.port);
    tracing::info!("listening on {address}");

    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(OkResponse { ok: true })
}

async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let world = state.world.lock().await;
    Json(world.stats())
}

async fn debug_world(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let world = state.world.lock().await;
    Json(world.debug_frame())
}
