//! Surya OCR subprocess invoker
//!
//! Runs `<command> [leading args] <input> --langs <l1,l2> --results_dir <dir>`
//! with structured arguments (never through a shell) and waits for it under a
//! timeout. The child is killed if the timeout elapses.

use super::{InvocationOutput, InvocationRequest, OcrInvoker};
use crate::config::Config;
use crate::error::{CorpusError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Clone)]
pub struct SuryaInvoker {
    command: String,
    leading_args: Vec<String>,
    timeout: Duration,
}

impl SuryaInvoker {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            leading_args: Vec::new(),
            timeout: Config::default().timeout,
        }
    }

    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ocr_command.clone())
            .with_leading_args(config.ocr_args.clone())
            .with_timeout(config.timeout)
    }

    fn args(&self, request: &InvocationRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.leading_args.iter().map(OsString::from).collect();
        args.push(request.input.clone().into_os_string());

        if !request.langs.is_empty() {
            args.push("--langs".into());
            args.push(request.langs.join(",").into());
        }

        args.push("--results_dir".into());
        args.push(request.results_dir.clone().into_os_string());
        args
    }
}

impl Default for SuryaInvoker {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[async_trait]
impl OcrInvoker for SuryaInvoker {
    fn name(&self) -> &'static str {
        "surya"
    }

    async fn invoke(&self, request: &InvocationRequest) -> Result<InvocationOutput> {
        if !request.input.is_file() {
            return Err(CorpusError::invocation(
                format!("input document not found: {}", request.input.display()),
                "",
            ));
        }

        tokio::fs::create_dir_all(&request.results_dir)
            .await
            .map_err(|e| CorpusError::io(&request.results_dir, e))?;

        tracing::info!(
            "Running {} on {} (langs: {})",
            self.command,
            request.input.display(),
            request.langs.join(",")
        );
        let start = Instant::now();

        let child = Command::new(&self.command)
            .args(self.args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CorpusError::invocation(format!("failed to start {}: {}", self.command, e), "")
            })?;

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(CorpusError::invocation(
                    format!("failed to wait for {}: {}", self.command, e),
                    "",
                ))
            }
            // Dropping the wait future drops the child, which kills it
            Err(_) => {
                return Err(CorpusError::invocation(
                    format!(
                        "{} timed out after {} seconds",
                        self.command,
                        self.timeout.as_secs_f64()
                    ),
                    "",
                ))
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(CorpusError::invocation(
                format!("{} exited with {}", self.command, output.status),
                stderr,
            ));
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!("OCR completed in {}ms", elapsed_ms);

        Ok(InvocationOutput {
            stdout,
            stderr,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn request(input: &Path, results_dir: &Path) -> InvocationRequest {
        InvocationRequest {
            input: input.to_path_buf(),
            langs: vec!["en".to_string(), "de".to_string()],
            results_dir: results_dir.to_path_buf(),
        }
    }

    /// Shell script standing in for the engine, run through `sh`
    fn fake_engine(dir: &Path, body: &str) -> SuryaInvoker {
        let script = dir.join("fake_ocr.sh");
        fs::write(&script, body).unwrap();
        SuryaInvoker::new("sh").with_leading_args(vec![script.display().to_string()])
    }

    #[test]
    fn builds_fixed_argument_shape() {
        let invoker = SuryaInvoker::new("surya_ocr");
        let args = invoker.args(&request(Path::new("data/sample2.pdf"), Path::new("data/results")));

        assert_eq!(
            args,
            vec![
                OsString::from("data/sample2.pdf"),
                OsString::from("--langs"),
                OsString::from("en,de"),
                OsString::from("--results_dir"),
                OsString::from("data/results"),
            ]
        );
    }

    #[test]
    fn passes_shell_metacharacters_verbatim() {
        let invoker = SuryaInvoker::new("surya_ocr");
        let input = PathBuf::from("scan; rm -rf $HOME.pdf");
        let args = invoker.args(&request(&input, Path::new("out")));

        assert_eq!(args[0], OsString::from("scan; rm -rf $HOME.pdf"));
    }

    #[test]
    fn omits_empty_language_list() {
        let invoker = SuryaInvoker::new("surya_ocr").with_leading_args(vec!["--disable_math".into()]);
        let mut req = request(Path::new("a.pdf"), Path::new("out"));
        req.langs.clear();

        let args = invoker.args(&req);
        assert_eq!(args.len(), 4);
        assert_eq!(args[0], OsString::from("--disable_math"));
        assert!(!args.contains(&OsString::from("--langs")));
    }

    #[tokio::test]
    async fn successful_run_writes_locatable_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sample2.pdf");
        fs::write(&input, b"%PDF-1.4").unwrap();
        let results = dir.path().join("results");

        let invoker = fake_engine(
            dir.path(),
            r#"
stem=$(basename "$1" .pdf)
mkdir -p "$5/$stem"
printf '{"%s": [{"text_lines": [{"text": "%s"}]}]}' "$stem" "$3" > "$5/$stem/results.json"
echo "done"
"#,
        );

        let req = request(&input, &results);
        let output = invoker.invoke(&req).await.unwrap();
        assert_eq!(output.stdout.trim(), "done");

        let artifact = invoker.locate_artifact(&req).unwrap();
        let corpus = crate::normalize::normalize(&artifact).unwrap();
        assert_eq!(corpus.page_content(), ["en,de"]);
        assert_eq!(corpus.file_name(), Some("sample2"));
    }

    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.pdf");
        fs::write(&input, b"%PDF-1.4").unwrap();

        let invoker = fake_engine(dir.path(), "echo 'model download failed' >&2\nexit 3\n");

        match invoker.invoke(&request(&input, dir.path())).await.unwrap_err() {
            CorpusError::Invocation { message, stderr } => {
                assert!(message.contains("exited"), "{message}");
                assert_eq!(stderr.trim(), "model download failed");
            }
            other => panic!("expected Invocation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_invocation_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.pdf");
        fs::write(&input, b"%PDF-1.4").unwrap();

        let invoker = SuryaInvoker::new("definitely-not-an-ocr-engine-9f2c");
        let err = invoker.invoke(&request(&input, dir.path())).await.unwrap_err();
        assert!(matches!(err, CorpusError::Invocation { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn missing_input_is_rejected_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");

        let invoker = SuryaInvoker::new("definitely-not-an-ocr-engine-9f2c");
        match invoker
            .invoke(&request(&dir.path().join("absent.pdf"), &results))
            .await
            .unwrap_err()
        {
            CorpusError::Invocation { message, .. } => {
                assert!(message.contains("input document not found"))
            }
            other => panic!("expected Invocation, got {other:?}"),
        }
        assert!(!results.exists());
    }

    #[tokio::test]
    async fn slow_engine_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.pdf");
        fs::write(&input, b"%PDF-1.4").unwrap();

        let invoker =
            fake_engine(dir.path(), "sleep 10\n").with_timeout(Duration::from_millis(200));

        let start = Instant::now();
        match invoker.invoke(&request(&input, dir.path())).await.unwrap_err() {
            CorpusError::Invocation { message, .. } => {
                assert!(message.contains("timed out"), "{message}")
            }
            other => panic!("expected Invocation, got {other:?}"),
        }
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
