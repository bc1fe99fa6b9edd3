mod app;
mod auth;
mod comments;
mod config;
mod error;
mod extract;
mod logging;
mod posts;
mod state;
mod store;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    logging::init()?;

    let state = AppState::init().await?;
    tracing::info!(
        issuer = %state.config.jwt.issuer,
        ttl_minutes = state.config.jwt.ttl_minutes,
        "auth configured"
    );

    let addr = state.config.listen_addr;
    app::serve(app::build_app(state), addr).await
}
