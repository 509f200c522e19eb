//! Text extraction through an external program
//!
//! Runs a text-mode browser (`lynx --dump` by default) against a URL and
//! returns whatever it printed. The process is awaited without a timeout
//! and its output is not size limited.

use crate::config::TextExtractorConfig;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Printed by lynx when it cannot open the target
pub const ACCESS_DENIED_MARKER: &str = "\nCan't Access `file";

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Extractor could not access the URL")]
    AccessDenied,
}

/// Runs the configured extractor program
#[derive(Debug, Clone)]
pub struct TextExtractor {
    program: String,
    args: Vec<String>,
}

impl TextExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Extract the text behind `url`
    ///
    /// The URL is passed as the last argument. Output is stdout followed by
    /// stderr; a non-zero exit status alone is not treated as a failure.
    pub async fn extract(&self, url: &str) -> Result<String, ExtractionError> {
        tracing::debug!(program = %self.program, url = %url, "Running text extractor");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ExtractionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        let text = String::from_utf8_lossy(&combined).into_owned();

        if !output.status.success() {
            tracing::debug!(status = ?output.status.code(), "Text extractor exited with failure status");
        }

        if text.contains(ACCESS_DENIED_MARKER) {
            tracing::warn!(url = %url, "Text extractor could not access URL");
            return Err(ExtractionError::AccessDenied);
        }

        Ok(text)
    }
}

impl From<&TextExtractorConfig> for TextExtractor {
    fn from(config: &TextExtractorConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::from(&TextExtractorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_lynx_dump() {
        let extractor = TextExtractor::default();
        assert_eq!(extractor.program(), "lynx");
        assert_eq!(extractor.args, vec!["--dump"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_returns_program_output() {
        let extractor = TextExtractor::new("echo", vec!["page:".to_string()]);
        let text = extractor.extract("https://example.com").await.unwrap();
        assert_eq!(text, "page: https://example.com\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_includes_stderr() {
        let extractor = TextExtractor::new(
            "sh",
            vec!["-c".to_string(), "echo out; echo err >&2".to_string(), "sh".to_string()],
        );
        let text = extractor.extract("https://example.com").await.unwrap();
        assert_eq!(text, "out\nerr\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_access_marker_is_denied() {
        let extractor = TextExtractor::new(
            "printf",
            vec!["\nCan't Access `file://%s'\n".to_string()],
        );
        let result = extractor.extract("/nope").await;
        assert!(matches!(result, Err(ExtractionError::AccessDenied)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_url_is_passed_verbatim_as_last_argument() {
        let extractor = TextExtractor::new("printf", vec!["[%s]".to_string()]);
        let text = extractor.extract("-dump").await.unwrap();
        assert_eq!(text, "[-dump]");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let extractor = TextExtractor::new("definitely-not-a-real-extractor", vec![]);
        let result = extractor.extract("https://example.com").await;
        assert!(matches!(result, Err(ExtractionError::Spawn { .. })));
    }
}
