use crate::corpus::NormalizedCorpus;
use crate::error::{CorpusError, Result};
use crate::normalize::{normalize_with, NormalizeOptions};
use crate::ocr::{InvocationRequest, OcrInvoker};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::time::Instant;

/// Outcome of normalizing one artifact in a batch
#[derive(Debug)]
pub struct BatchOutcome {
    pub artifact: PathBuf,
    pub result: Result<NormalizedCorpus>,
}

/// Run OCR for `request`, then normalize the artifact it produced.
///
/// Nothing is normalized unless the invoker reports success.
pub async fn run(
    invoker: &dyn OcrInvoker,
    request: &InvocationRequest,
    options: &NormalizeOptions,
) -> Result<NormalizedCorpus> {
    let start = Instant::now();

    let output = invoker.invoke(request).await?;
    tracing::debug!(
        "{} finished in {}ms ({} bytes of stdout)",
        invoker.name(),
        output.elapsed_ms,
        output.stdout.len()
    );

    let artifact = invoker.locate_artifact(request)?;
    let corpus = normalize_blocking(artifact, *options).await?;

    tracing::info!(
        "Processed {} into {} pages in {}ms",
        request.input.display(),
        corpus.len(),
        start.elapsed().as_millis()
    );
    Ok(corpus)
}

/// Normalize many artifacts concurrently; outcomes keep the input order
pub async fn normalize_batch(
    artifacts: Vec<PathBuf>,
    options: &NormalizeOptions,
) -> Vec<BatchOutcome> {
    let options = *options;
    let concurrency = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);

    tracing::info!(
        "Normalizing {} artifacts ({} at a time)",
        artifacts.len(),
        concurrency
    );

    stream::iter(artifacts)
        .map(move |artifact| async move {
            let result = normalize_blocking(artifact.clone(), options).await;
            if let Err(e) = &result {
                tracing::warn!("Failed to normalize {}: {}", artifact.display(), e);
            }
            BatchOutcome { artifact, result }
        })
        .buffered(concurrency)
        .collect()
        .await
}

async fn normalize_blocking(
    artifact: PathBuf,
    options: NormalizeOptions,
) -> Result<NormalizedCorpus> {
    let path = artifact.clone();
    match tokio::task::spawn_blocking(move || normalize_with(&artifact, &options)).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(CorpusError::io(path, std::io::Error::other(e))),
    }
}
