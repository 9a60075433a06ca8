use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Form, Router};
use clap::{Parser, ValueEnum};
use coursefinder::embedder::{hashing, huggingface};
use coursefinder::llm::groq;
use coursefinder::splitter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use coursefinder::ui::{build_view, home_view, render_page, search_view};
use coursefinder::{
    logging, Embedder, GroqProvider, HashingEmbedder, HuggingFaceEmbedder,
    LlmProvider, SearchSession, SessionConfig, TextSplitter,
};
use serde::Deserialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "coursefinder-ui",
    about = "Serve the course search page backed by a vector index and a hosted chat model"
)]
struct SearchCli {
    /// Address to bind the HTTP server to (host:port)
    #[arg(long, env = "COURSEFINDER_BIND", default_value = "127.0.0.1:8501")]
    bind: String,

    /// Course CSV produced by the scraper
    #[arg(
        long,
        env = "COURSEFINDER_CSV",
        default_value = "analytics_vidhya_courses.csv"
    )]
    csv: PathBuf,

    /// Documents retrieved per query
    #[arg(long, env = "COURSEFINDER_TOP_K", default_value_t = 4)]
    top_k: usize,

    /// Maximum characters per chunk before embedding
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Characters shared between adjacent chunks
    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    chunk_overlap: usize,

    /// Embedding backend
    #[arg(long, env = "COURSEFINDER_EMBEDDER", value_enum, default_value_t = EmbedderKind::HuggingFace)]
    embedder: EmbedderKind,

    /// Hugging Face token (required for the hugging-face embedder)
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    hf_token: Option<String>,

    /// Embedding model identifier
    #[arg(long, env = "COURSEFINDER_EMBEDDING_MODEL", default_value = huggingface::DEFAULT_MODEL)]
    embedding_model: String,

    /// Base URL for the feature-extraction endpoint
    #[arg(long, env = "COURSEFINDER_EMBEDDING_BASE", default_value = huggingface::DEFAULT_BASE_URL)]
    embedding_base_url: String,

    /// Max inputs per embedding request
    #[arg(long, env = "COURSEFINDER_EMBEDDING_BATCH", default_value_t = 32)]
    embedding_batch_size: usize,

    /// Seconds before embedding requests time out
    #[arg(long, env = "COURSEFINDER_EMBEDDING_TIMEOUT_SECS", default_value_t = 30)]
    embedding_timeout_secs: u64,

    /// Vector length for the hashing embedder
    #[arg(long, default_value_t = hashing::DEFAULT_DIMENSIONS)]
    hashing_dimensions: usize,

    /// Groq API key for the answering model
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    groq_api_key: String,

    /// Chat model used for answers
    #[arg(long, env = "COURSEFINDER_CHAT_MODEL", default_value = groq::DEFAULT_MODEL)]
    chat_model: String,

    /// Base URL for the OpenAI-compatible chat API
    #[arg(long, env = "COURSEFINDER_CHAT_BASE", default_value = groq::DEFAULT_BASE_URL)]
    chat_base_url: String,

    /// Seconds before chat requests time out
    #[arg(long, env = "COURSEFINDER_CHAT_TIMEOUT_SECS", default_value_t = 60)]
    chat_timeout_secs: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum EmbedderKind {
    /// Hosted sentence-transformers model.
    HuggingFace,
    /// Offline feature hashing, no token needed.
    Hashing,
}

impl SearchCli {
    fn build_embedder(&self) -> Result<Arc<dyn Embedder>> {
        match self.embedder {
            EmbedderKind::HuggingFace => {
                let token = self
                    .hf_token
                    .clone()
                    .ok_or_else(|| anyhow!("HF_TOKEN must be set for the Hugging Face embedder"))?;
                Ok(Arc::new(HuggingFaceEmbedder::new(
                    token,
                    self.embedding_base_url.clone(),
                    self.embedding_model.clone(),
                    Duration::from_secs(self.embedding_timeout_secs.max(1)),
                    self.embedding_batch_size,
                )?))
            }
            EmbedderKind::Hashing => Ok(Arc::new(HashingEmbedder::new(self.hashing_dimensions)?)),
        }
    }

    fn build_provider(&self) -> Result<Arc<dyn LlmProvider>> {
        let provider = GroqProvider::new(
            self.groq_api_key.clone(),
            self.chat_base_url.clone(),
            self.chat_model.clone(),
            Duration::from_secs(self.chat_timeout_secs.max(1)),
        )?;
        info!(model = provider.model(), "chat provider ready");
        Ok(Arc::new(provider))
    }

    fn session_config(&self) -> Result<SessionConfig> {
        let mut config = SessionConfig::new(self.csv.clone());
        config.top_k = self.top_k.max(1);
        config.splitter = TextSplitter::new(self.chunk_size, self.chunk_overlap)?;
        Ok(config)
    }
}

#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<SearchSession>>,
    llm: Arc<dyn LlmProvider>,
}

#[derive(Debug, Deserialize)]
struct SearchForm {
    #[serde(default)]
    query: String,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    logging::init();
    let cli = SearchCli::parse();

    // Blocking HTTP clients are built before the async runtime exists.
    let embedder = cli.build_embedder()?;
    let llm = cli.build_provider()?;
    let session = SearchSession::new(cli.session_config()?, embedder);
    let state = AppState {
        session: Arc::new(Mutex::new(session)),
        llm,
    };
    let addr: SocketAddr = cli
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", cli.bind))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let served = runtime.block_on(serve(addr, state.clone()));
    drop(runtime);
    drop(state);
    served
}

async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = Router::new()
        .route("/", get(home))
        .route("/build", post(build))
        .route("/search", post(search))
        .route("/healthz", get(healthz))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("coursefinder-ui listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server shutdown")?;
    Ok(())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn home(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    let view = with_session(&state, |session, _| home_view(session)).await?;
    Ok(Html(render_page(&view)))
}

async fn build(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    let view = with_session(&state, |session, _| build_view(session)).await?;
    Ok(Html(render_page(&view)))
}

async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, (StatusCode, String)> {
    let view =
        with_session(&state, move |session, llm| search_view(session, llm, &form.query)).await?;
    Ok(Html(render_page(&view)))
}

/// Runs `work` on the blocking pool with exclusive access to the session.
async fn with_session<T, F>(state: &AppState, work: F) -> Result<T, (StatusCode, String)>
where
    T: Send + 'static,
    F: FnOnce(&mut SearchSession, &dyn LlmProvider) -> T + Send + 'static,
{
    let session = Arc::clone(&state.session);
    let llm = Arc::clone(&state.llm);
    tokio::task::spawn_blocking(move || {
        let mut guard = session
            .lock()
            .map_err(|_| anyhow!("session mutex poisoned"))?;
        Ok::<T, anyhow::Error>(work(&mut *guard, llm.as_ref()))
    })
    .await
    .map_err(|err| internal_error(anyhow!("session task join error: {err}")))?
    .map_err(internal_error)
}

fn internal_error(err: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
}
