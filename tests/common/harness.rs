//! Test corpus and server harness.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ragcite::cache::MemoryAnswerCache;
use ragcite::chunking::{Chunker, Page};
use ragcite::completion::{CompletionClient, GenaiCompletionClient};
use ragcite::embedding::{CrossEncoder, Embedder, SentenceEncoder};
use ragcite::gateway::{HandlerState, create_router_with_state};
use ragcite::pipeline::Orchestrator;
use ragcite::retrieval::Retriever;
use ragcite::scoring::Reranker;
use ragcite::vectordb::{BuildSummary, IndexBuilder};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

/// Seven short pages, one AWS service each.
pub fn sample_pages() -> Vec<Page> {
    vec![
        Page::new(1, "Amazon S3 is object storage.\n\n\nBuckets   hold objects."),
        Page::new(2, "Amazon EC2 provides resizable compute capacity in the cloud."),
        Page::new(3, "AWS IAM manages users, groups, roles and policies."),
        Page::new(4, "Amazon RDS runs managed relational databases."),
        Page::new(5, "Amazon VPC isolates your network."),
        Page::new(6, "AWS Lambda runs code without provisioning servers."),
        Page::new(7, "Amazon CloudWatch collects metrics and logs."),
    ]
}

pub fn stub_embedder() -> Arc<dyn Embedder> {
    Arc::new(SentenceEncoder::stub())
}

/// Chunks `pages` with the stub codec and publishes a store under `root`.
pub fn publish_store(pages: &[Page], root: &Path) -> BuildSummary {
    let chunks = Chunker::stub().process_pages(pages).expect("chunking");
    let (_, summary) = IndexBuilder::new(stub_embedder())
        .build_and_persist(chunks, root)
        .expect("build");
    summary
}

/// Orchestrator over the store at `root` with stub models and a fresh cache.
pub fn orchestrator<C: CompletionClient>(root: &Path, completion: C) -> Orchestrator<C> {
    let retriever = Retriever::open(root, stub_embedder()).expect("open store");
    Orchestrator::new(
        retriever,
        Reranker::new(Arc::new(CrossEncoder::stub())),
        completion,
        Arc::new(MemoryAnswerCache::new()),
    )
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: TempDir,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn vectorstore_path(&self) -> PathBuf {
        self._temp_dir.path().to_path_buf()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Spawns a server over the sample corpus with stub models and the mock provider.
pub async fn spawn_test_server() -> Result<TestServer, ServerStartupError> {
    spawn_server_with(GenaiCompletionClient::default().with_mock_provider(true)).await
}

/// Spawns a server over the sample corpus answering with `completion`.
pub async fn spawn_server_with<C>(completion: C) -> Result<TestServer, ServerStartupError>
where
    C: CompletionClient + 'static,
{
    let temp_dir = TempDir::new()?;
    publish_store(&sample_pages(), temp_dir.path());

    let state = HandlerState::new(
        orchestrator(temp_dir.path(), completion),
        temp_dir.path().to_path_buf(),
    );
    serve(state, temp_dir).await
}

/// Spawns a server whose vectorstore directory has nothing published yet.
pub async fn spawn_server_without_store() -> Result<TestServer, ServerStartupError> {
    let temp_dir = TempDir::new()?;
    let orchestrator = Orchestrator::new(
        Retriever::open_lazy(temp_dir.path(), stub_embedder()),
        Reranker::new(Arc::new(CrossEncoder::stub())),
        GenaiCompletionClient::default().with_mock_provider(true),
        Arc::new(MemoryAnswerCache::new()),
    );
    let state = HandlerState::new(orchestrator, temp_dir.path().to_path_buf());
    serve(state, temp_dir).await
}

async fn serve<C>(state: HandlerState<C>, temp_dir: TempDir) -> Result<TestServer, ServerStartupError>
where
    C: CompletionClient + 'static,
{
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir: temp_dir,
    })
}
