use anyhow::Context;
use ledgerly::{auth::repo::User, auth::service::hash_password, state::AppState};

/// Provisions the default user so the ledger has an identity to log in
/// with. Safe to run repeatedly.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "seed=info,sqlx=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let state = AppState::init().await?;
    sqlx::migrate!("./migrations")
        .run(&state.db)
        .await
        .context("run migrations")?;

    let username = std::env::var("DEFAULT_USERNAME").unwrap_or_else(|_| "demo".into());
    if User::find_by_username(&state.db, &username).await?.is_some() {
        tracing::info!(%username, "default user already exists");
        return Ok(());
    }

    let password = std::env::var("DEFAULT_PASSWORD").unwrap_or_else(|_| "demo-password".into());
    let full_name = std::env::var("DEFAULT_FULL_NAME").ok();

    let hash = hash_password(&password)?;
    let user = User::create(&state.db, &username, &hash, full_name.as_deref()).await?;
    tracing::info!(user_id = %user.id, %username, "default user created");
    Ok(())
}
