use anyhow::Context;
use server::config::Config;
use server::db;
use server::handlers::{self, AppState};
use server::metric::MetricsLog;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let conn = db::init_db(&config.db_path, config.seed)
        .with_context(|| format!("failed to open database {}", config.db_path))?;
    let metrics = MetricsLog::with_capacity(config.metrics_csv.clone(), config.metrics_capacity);
    let state = AppState::new(conn, metrics);
    let app = handlers::create_app(state, &config.static_dir);

    tracing::info!(addr = %config.bind_addr, "listening");
    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .await
        .context("server error")?;
    Ok(())
}
