//! Ragcite entrypoint.
//!
//! ```text
//! ragcite                          serve HTTP
//! ragcite build-index <pages.json> chunk, embed and publish the vector store
//! ragcite --health-check           probe a running server's /healthz
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use ragcite::cache::MemoryAnswerCache;
use ragcite::chunking::{ChunkTokenizer, Chunker, ChunkerConfig, Page};
use ragcite::completion::GenaiCompletionClient;
use ragcite::config::Config;
use ragcite::embedding::{CrossEncoder, Embedder, EncoderConfig, RerankerConfig, SentenceEncoder};
use ragcite::gateway::{HandlerState, create_router_with_state};
use ragcite::pipeline::Orchestrator;
use ragcite::retrieval::Retriever;
use ragcite::scoring::Reranker;
use ragcite::vectordb::IndexBuilder;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    match args.first().map(String::as_str) {
        None | Some("serve") => serve(config).await,
        Some("build-index") => {
            let Some(pages_path) = args.get(1) else {
                bail!("usage: ragcite build-index <pages.json>");
            };
            let config = config.clone();
            let pages_path = pages_path.clone();
            tokio::task::spawn_blocking(move || build_index(&config, Path::new(&pages_path)))
                .await?
        }
        Some(other) => bail!("unknown command {:?}; expected `serve` or `build-index`", other),
    }
}

fn load_embedder(config: &Config) -> anyhow::Result<Arc<dyn Embedder>> {
    let encoder_config = match &config.embedding_model_path {
        Some(path) => EncoderConfig::new(path.clone()),
        None => {
            tracing::warn!("No RAGCITE_EMBEDDING_MODEL_PATH configured, running embedder in stub mode");
            EncoderConfig::stub()
        }
    };
    Ok(Arc::new(SentenceEncoder::load(encoder_config)?))
}

fn build_index(config: &Config, pages_path: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(pages_path)
        .with_context(|| format!("failed to read {}", pages_path.display()))?;
    let pages: Vec<Page> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of pages", pages_path.display()))?;
    tracing::info!(pages = pages.len(), path = %pages_path.display(), "Pages loaded");

    let tokenizer = ChunkTokenizer::from_optional_path(config.tokenizer_path.as_deref())?;
    let chunker = Chunker::new(tokenizer, ChunkerConfig::default())?;
    let chunks = chunker.process_pages(&pages)?;

    let embedder = load_embedder(config)?;
    let (_, summary) =
        IndexBuilder::new(embedder).build_and_persist(chunks, &config.vectorstore_path)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        vectorstore = %config.vectorstore_path.display(),
        "Ragcite starting"
    );

    let embedder = load_embedder(&config)?;
    let retriever = Retriever::open_lazy(&config.vectorstore_path, embedder);

    let reranker_config = match &config.reranker_path {
        Some(path) => RerankerConfig::new(path.clone()),
        None => RerankerConfig::stub(),
    };
    let reranker = Reranker::new(Arc::new(CrossEncoder::load(reranker_config)?));

    let cache = Arc::new(MemoryAnswerCache::from_capacity(config.cache_capacity));
    let completion = GenaiCompletionClient::from_config(&config);
    if completion.is_mock_provider() {
        tracing::warn!("RAGCITE_MOCK_PROVIDER set, answers are placeholders");
    }

    let orchestrator =
        Orchestrator::new(retriever, reranker, completion, cache).with_config(&config);
    let state = HandlerState::new(orchestrator, config.vectorstore_path.clone());
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Ragcite shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("RAGCITE_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
