use clap::{Parser, Subcommand};
use ocr_corpus::export::{self, ExportFormat};
use ocr_corpus::{
    pipeline, Config, CorpusError, KeyPolicy, NormalizeOptions, NormalizedCorpus, SuryaInvoker,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ocr-corpus")]
#[command(about = "Normalize OCR engine output into a page-indexed text corpus")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the OCR engine on a document, then normalize its results
    Run {
        /// Document to OCR (PDF or image)
        input: PathBuf,

        #[command(flatten)]
        ocr: OcrArgs,

        #[command(flatten)]
        normalize: NormalizeArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Normalize an existing OCR result artifact
    Normalize {
        /// Path to the engine's results.json
        artifact: PathBuf,

        #[command(flatten)]
        normalize: NormalizeArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Normalize several artifacts, continuing past failures
    Batch {
        #[arg(required = true)]
        artifacts: Vec<PathBuf>,

        #[command(flatten)]
        normalize: NormalizeArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args, Debug)]
pub struct OcrArgs {
    /// OCR engine executable
    #[arg(long, env = "OCR_COMMAND", default_value = "surya_ocr")]
    pub ocr_command: String,

    /// Argument placed before the input document, repeatable (e.g. for `uv run`)
    #[arg(long = "ocr-arg", allow_hyphen_values = true)]
    pub ocr_args: Vec<String>,

    /// Language hints, comma separated (e.g. "en,de")
    #[arg(long, env = "OCR_LANGS", default_value = "en", value_delimiter = ',')]
    pub langs: Vec<String>,

    /// Directory the engine writes its results into
    #[arg(long, env = "OCR_RESULTS_DIR", default_value = "data/results")]
    pub results_dir: PathBuf,

    /// Seconds to wait for the engine before killing it
    #[arg(long, env = "OCR_TIMEOUT_SECS", default_value = "600")]
    pub timeout_secs: u64,
}

#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Export format (json, jsonl)
    #[arg(long, default_value = "json", value_parser = parse_format)]
    pub format: ExportFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct NormalizeArgs {
    /// Resolution of objects with more than one key (first, strict)
    #[arg(
        long,
        env = "OCR_KEY_POLICY",
        default_value = "first",
        value_parser = parse_key_policy
    )]
    pub key_policy: KeyPolicy,
}

impl From<OcrArgs> for Config {
    fn from(args: OcrArgs) -> Self {
        Self {
            ocr_command: args.ocr_command,
            ocr_args: args.ocr_args,
            langs: args.langs,
            results_dir: args.results_dir,
            timeout: Duration::from_secs(args.timeout_secs),
        }
    }
}

impl NormalizeArgs {
    fn options(&self) -> NormalizeOptions {
        NormalizeOptions {
            key_policy: self.key_policy,
        }
    }
}

impl OutputArgs {
    /// Name of the export destination as it appears in errors
    fn destination(&self) -> &Path {
        self.output
            .as_deref()
            .unwrap_or_else(|| Path::new(export::STDOUT_DESTINATION))
    }

    fn writer(&self) -> Result<Box<dyn Write>, CorpusError> {
        match &self.output {
            Some(path) => {
                let file = File::create(path).map_err(|e| CorpusError::io(path, e))?;
                Ok(Box::new(BufWriter::new(file)))
            }
            None => Ok(Box::new(std::io::stdout().lock())),
        }
    }
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    ExportFormat::from_str(s)
        .ok_or_else(|| format!("unknown format '{s}' (expected json or jsonl)"))
}

fn parse_key_policy(s: &str) -> Result<KeyPolicy, String> {
    KeyPolicy::from_str(s)
        .ok_or_else(|| format!("unknown key policy '{s}' (expected first or strict)"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the exported corpus
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("ocr-corpus v{}", env!("CARGO_PKG_VERSION"));

    match execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

async fn execute(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            input,
            ocr,
            normalize,
            output,
        } => {
            let config = Config::from(ocr);
            let invoker = SuryaInvoker::from_config(&config);
            let request = config.request_for(&input);

            let corpus = pipeline::run(&invoker, &request, &normalize.options()).await?;
            emit(&corpus, &output)?;
        }
        Commands::Normalize {
            artifact,
            normalize,
            output,
        } => {
            let corpus = ocr_corpus::normalize_with(&artifact, &normalize.options())?;
            emit(&corpus, &output)?;
        }
        Commands::Batch {
            artifacts,
            normalize,
            output,
        } => {
            let total = artifacts.len();
            let outcomes = pipeline::normalize_batch(artifacts, &normalize.options()).await;

            let mut corpora = Vec::with_capacity(total);
            let mut failed = 0;
            for outcome in outcomes {
                match outcome.result {
                    Ok(corpus) => corpora.push(corpus),
                    Err(e) => {
                        failed += 1;
                        let response = e.to_response();
                        eprintln!(
                            "{}",
                            serde_json::json!({
                                "artifact": outcome.artifact.display().to_string(),
                                "error": response.error,
                                "code": response.code,
                            })
                        );
                    }
                }
            }

            export::write_corpora(
                &corpora,
                output.format,
                output.writer()?,
                output.destination(),
            )?;

            if failed > 0 {
                anyhow::bail!("{} of {} artifacts failed to normalize", failed, total);
            }
        }
    }

    Ok(())
}

fn emit(corpus: &NormalizedCorpus, output: &OutputArgs) -> Result<(), CorpusError> {
    match &output.output {
        Some(path) => export::export_to_file(corpus, output.format, path),
        None => export::write_corpus(
            corpus,
            output.format,
            output.writer()?,
            output.destination(),
        ),
    }
}

fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<CorpusError>() {
        Some(corpus_err) => {
            tracing::error!("{}", corpus_err);
            let body = serde_json::to_string(&corpus_err.to_response())
                .unwrap_or_else(|_| corpus_err.to_string());
            eprintln!("{}", body);
            ExitCode::from(corpus_err.exit_code())
        }
        None => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
