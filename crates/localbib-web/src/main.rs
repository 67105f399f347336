use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use localbib_core::config_file::load_config;
use localbib_core::{Loader, SourceFetcher};
use localbib_render::RenderOptions;
use localbib_web::{AppState, DEFAULT_BIND, router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn,localbib_web=info,localbib_core=info,localbib_bibtex=info"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config();
    let source = std::env::var("LOCALBIB_SOURCE")
        .ok()
        .or_else(|| config.source().map(str::to_string))
        .filter(|s| !s.trim().is_empty())
        .context("no bibliography source configured (set LOCALBIB_SOURCE or [server] source)")?;
    let addr: SocketAddr = config
        .bind()
        .unwrap_or(DEFAULT_BIND)
        .parse()
        .context("invalid [server] bind address")?;

    let loader = Loader::new(
        Arc::new(SourceFetcher::default()),
        Some(localbib_bibtex::default_parser()),
    );
    let render = RenderOptions {
        title: config.title().unwrap_or("Publications").to_string(),
        allow_note_markup: config.allow_note_markup(),
        ..Default::default()
    };
    let state = Arc::new(AppState::new(config.view_options(), loader, source, render));

    // Serve the loading page right away; the first fetch runs in the background.
    let initial = state.clone();
    tokio::spawn(async move {
        match initial.initial_load().await {
            Ok(entries) => tracing::info!(source = %initial.source, entries, "bibliography ready"),
            Err(e) => tracing::error!(source = %initial.source, error = %e, "initial load failed"),
        }
    });

    let app = router(state);

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
