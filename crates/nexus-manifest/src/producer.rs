//! Seam to the external analysis service that turns source code into a
//! candidate manifest.
//!
//! Only the shape of the returned document is checked here. Deployability is
//! the validator's job and happens when the operator publishes.

use crate::errors::ProducerError;
use crate::types::Manifest;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[async_trait]
pub trait ManifestProducer: Send + Sync {
    /// Analyze `source` (named `filename`) and return a candidate manifest
    async fn analyze(&self, source: &str, filename: &str) -> Result<Manifest, ProducerError>;
}

/// Prompt body handed to the analysis service
pub fn producer_request(source: &str, filename: &str) -> String {
    format!("Filename: {}\n\nCode:\n{}", filename, source)
}

/// Parse the service's text response, tolerating a Markdown code fence
pub fn parse_producer_response(text: &str) -> Result<Manifest, ProducerError> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(ProducerError::NoResponse);
    }
    Ok(serde_json::from_str(body)?)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") on the opening fence line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Runs an analyzer program that reads the request on stdin and prints the
/// manifest JSON on stdout
#[derive(Debug, Clone)]
pub struct ExternalProducer {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalProducer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    async fn run(&self, request: String) -> Result<String, ProducerError> {
        let failed = |detail: String| {
            warn!("Analysis service failed: {}", detail);
            ProducerError::Failed { detail }
        };

        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failed(format!("failed to spawn '{}': {}", self.program, e)))?;

        // Feed stdin while draining stdout so a chatty analyzer cannot fill
        // the pipe and stall both sides
        let stdin = child.stdin.take();
        let feed = async move {
            match stdin {
                Some(mut stdin) => stdin.write_all(request.as_bytes()).await,
                None => Ok(()),
            }
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());

        let output =
            output.map_err(|e| failed(format!("failed to wait for '{}': {}", self.program, e)))?;
        if let Err(e) = written {
            // An analyzer may exit without reading its whole input
            debug!("Request not fully written to '{}': {}", self.program, e);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!("{}: {}", output.status, stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ManifestProducer for ExternalProducer {
    async fn analyze(&self, source: &str, filename: &str) -> Result<Manifest, ProducerError> {
        if source.trim().is_empty() {
            return Err(ProducerError::EmptySource);
        }

        debug!("Analyzing '{}' with '{}'", filename, self.program);
        let response = self.run(producer_request(source, filename)).await?;
        let manifest = parse_producer_response(&response)?;
        debug!(
            "Analysis produced manifest '{}' with {} command(s)",
            manifest.namespace,
            manifest.command_count()
        );
        Ok(manifest)
    }
}
