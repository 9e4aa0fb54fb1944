use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use server::feed::FeedHub;
use server::{config, db, session_store, AppState, CompletionState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env()?;
    info!(port = config.port, "conecta server starting");

    let db = db::connect(&config.database_url).await?;

    // Expired-session sweeper.
    let store = session_store::SqliteSessionStore::new(db.clone());
    tokio::spawn(session_store::run_expired_session_cleanup(
        store,
        Duration::from_secs(3600),
    ));

    let state = Arc::new(AppState {
        db,
        feed: FeedHub::new(64),
        completion: CompletionState {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()?,
            base_url: config.completion_base_url.clone(),
            api_key: config.completion_api_key.clone(),
            model: config.completion_model.clone(),
        },
        admin_email: config.admin_email.clone(),
        frontend_dist: config.frontend_dist.clone(),
    });

    let app = server::build_router(Arc::clone(&state));

    let addr = format!("0.0.0.0:{}", config.port);
    info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
