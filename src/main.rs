mod admin;
mod app;
mod auth;
mod config;
mod courses;
mod error;
mod gigs;
mod policy;
mod posts;
mod profile;
mod setup;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "unishare=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    sqlx::migrate!("./migrations").run(&app_state.db).await?;

    // Non-interactive first-admin bootstrap; a failure here should not keep
    // the server from starting.
    if let Err(e) = setup::bootstrap_admin_from_env(&app_state).await {
        tracing::warn!(error = %e, "admin bootstrap from environment failed");
    }

    let app = app::build_app(app_state);
    app::serve(app).await
}
