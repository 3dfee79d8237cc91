mod api;
mod config;
mod dispatch;
mod error;
mod llm;
mod parsing;
mod persona;
mod protocol;
mod records;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Context;
use std::sync::Arc;
use structopt::StructOpt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{Args, Config, Environment};
use dispatch::Dispatcher;
use llm::anthropic::AnthropicClient;
use persona::PersonaTable;
use store::DocumentStore;
use store::disk::{DiskStore, default_store_dir};
use store::memory::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::from_args();
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let environment = envy::from_env::<Environment>()
        .context("Failed to read environment (is ANTHROPIC_API_KEY set?)")?;
    let config = Config::load(args.config.as_deref()).await?;

    let personas = Arc::new(PersonaTable::with_overrides(config.personas));
    let llm = AnthropicClient::new(
        environment.anthropic_api_key,
        environment.anthropic_base_url,
        config.model.max_tokens,
    )?;

    let store: Arc<dyn DocumentStore> = if args.ephemeral {
        warn!("Running with an in-memory store, records will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let store_dir = match args.store_dir.or(config.store_dir) {
            Some(store_dir) => store_dir,
            None => default_store_dir()?,
        };
        let store = DiskStore::new(store_dir).await?;
        info!("Persisting records under {}", store.path().display());
        Arc::new(store)
    };

    let dispatcher = Dispatcher::new(
        personas,
        config.model.identity(),
        Arc::new(llm),
        store,
        config.service_name,
    );
    let app = api::router(Arc::new(dispatcher), api::cors_layer(&config.cors_origins)?);

    let bind = args
        .bind
        .or(config.bind)
        .unwrap_or_else(|| config::DEFAULT_BIND.to_owned());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!(
        "{} v{} listening on http://{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C, running until killed: {error}");
        std::future::pending::<()>().await;
    }
}
