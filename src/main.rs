//! ByteDent support-engine CLI entrypoint.
//!
//! Builds the engine from `BYTEDENT_*` environment variables and answers
//! questions read line-by-line from stdin, printing one JSON response per
//! question. Intended for smoke-testing the pipeline and for driving the
//! engine from a transport process over a pipe.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use bytedent::{
    ChatEngine, ChatResponse, Embedder, EmbedderConfig, GenaiModel, Settings, TokenChunker,
    VectorIndex, knowledge,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_env()?;
    settings.validate()?;

    tracing::info!(
        model = %settings.chat_model,
        top_k = settings.retrieval_top_k,
        "ByteDent engine starting"
    );

    let embedder = match &settings.embedder_dir {
        Some(dir) => Embedder::load(EmbedderConfig::new(dir))?,
        None => {
            tracing::warn!("No embedder directory configured; using stub embeddings");
            Embedder::load(EmbedderConfig::stub())?
        }
    };

    let chunker = match &settings.chunker_tokenizer_path {
        Some(path) => TokenChunker::from_tokenizer_file(
            path,
            settings.chunk_size_tokens,
            settings.chunk_overlap_tokens,
        )?,
        None => {
            TokenChunker::whitespace(settings.chunk_size_tokens, settings.chunk_overlap_tokens)?
        }
    };

    let model = Arc::new(GenaiModel::new(settings.chat_model.clone()));
    let corpus = knowledge::load(settings.corpus_path.as_deref())?;

    let engine = ChatEngine::new(
        settings,
        &chunker,
        VectorIndex::new(embedder),
        model,
        &corpus,
    )?;

    tracing::info!(model = %engine.model_info(), "Engine ready, reading questions from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        let result = engine.chat(question, None).await?;
        let response = ChatResponse::from(&result);

        let mut json = serde_json::to_string(&response)?;
        json.push('\n');
        stdout.write_all(json.as_bytes()).await?;
        stdout.flush().await?;
    }

    let stats = engine.cache_stats();
    tracing::info!(
        hits = stats.hits,
        misses = stats.misses,
        uptime_secs = engine.uptime(),
        "ByteDent engine shutting down"
    );

    Ok(())
}
