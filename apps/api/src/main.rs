mod analysis;
mod config;
mod errors;
mod feedback;
mod grammar_client;
mod lexicon;
mod models;
mod rewrite;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::grammar_client::{DisabledGrammarChecker, GrammarChecker, LanguageToolChecker};
use crate::lexicon::{KeywordCatalog, Lexicon};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Invalid configuration aborts startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Review API v{}", env!("CARGO_PKG_VERSION"));

    // Lexicons and keyword sets are built once and shared read-only
    let lexicon = Lexicon::english();
    let keywords = KeywordCatalog::builtin()
        .select(&config.analysis.keyword_sets)
        .context("KEYWORD_SETS is invalid")?;
    info!(
        "Keyword sets active: {} ({} entries)",
        keywords.set_names.join(", "),
        keywords.entries.len()
    );

    let grammar: Arc<dyn GrammarChecker> = match &config.grammar_check {
        Some(grammar_config) => {
            let checker = LanguageToolChecker::new(grammar_config)
                .context("Failed to build grammar-check client")?;
            info!("Grammar check enabled ({})", grammar_config.base_url);
            Arc::new(checker)
        }
        None => {
            warn!("GRAMMAR_CHECK_URL not set; grammar scores will be reported as unavailable");
            Arc::new(DisabledGrammarChecker)
        }
    };

    let port = config.port;
    let state = AppState {
        config: Arc::new(config),
        lexicon: Arc::new(lexicon),
        keywords: Arc::new(keywords),
        grammar,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
