/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config読み込み → 依存生成 (DrinkRepo, AuthService) → Router 組み立て
 * - Middleware の適用 (security headers / CORS / HTTP)
 * - axum::serve() で起動 (Ctrl-C で graceful shutdown)
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repos::{DrinkRepo, MemoryDrinkRepo, PgDrinkRepo};
use crate::services::auth::build_auth_service;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // RUST_LOG=info,drinks_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash the whole process so the panic is noticed
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting drinks API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let drinks: Arc<dyn DrinkRepo> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            let repo = PgDrinkRepo::new(pool);
            repo.ensure_schema()
                .await
                .context("failed to prepare drinks table")?;
            tracing::info!("drink store: postgres");
            Arc::new(repo)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; drinks are kept in memory");
            Arc::new(MemoryDrinkRepo::new())
        }
    };

    let auth = build_auth_service(&config.auth).context("failed to build token verifier")?;

    // Warm the key set; an unreachable issuer must not block startup,
    // the cache retries lazily on the first guarded request.
    if let Err(err) = auth.key_set().refresh().await {
        tracing::warn!(error = %err, "trusted key set not loaded at startup");
    }
    tracing::info!(
        issuer = %config.auth.issuer,
        audience = %config.auth.audience,
        jwks = %config.auth.jwks_url,
        "token verifier ready"
    );

    Ok(AppState::new(drinks, auth))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::v1::routes(&state).with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
