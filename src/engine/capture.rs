use crate::browser::page::PageDriver;
use async_trait::async_trait;
use base64::Engine as _;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Diagnostic capture points. At most one screenshot per tag per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Before,
    After,
    Error,
}

impl Checkpoint {
    pub fn label(&self) -> &'static str {
        match self {
            Checkpoint::Before => "before",
            Checkpoint::After => "after",
            Checkpoint::Error => "error",
        }
    }
}

/// Sink-issued reference to a stored screenshot: a data URL, a served file
/// path; the engine does not care which.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScreenshotRef(pub String);

#[derive(Debug, Error)]
#[error("screenshot store failed: {0}")]
pub struct SinkError(pub String);

/// Where screenshot bytes go. The medium is a deployment decision, not an
/// engine decision.
#[async_trait]
pub trait ScreenshotSink: Send + Sync {
    async fn store(
        &self,
        bytes: &[u8],
        query_id: &str,
        checkpoint: Checkpoint,
    ) -> Result<ScreenshotRef, SinkError>;
}

/// Encodes screenshots as `data:image/png;base64,...` URLs. The choice for
/// deployments without a writable filesystem.
pub struct InlineSink;

#[async_trait]
impl ScreenshotSink for InlineSink {
    async fn store(
        &self,
        bytes: &[u8],
        _query_id: &str,
        _checkpoint: Checkpoint,
    ) -> Result<ScreenshotRef, SinkError> {
        let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(ScreenshotRef(format!("data:image/png;base64,{}", b64)))
    }
}

/// Writes screenshots under a served directory and returns the public path.
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).ok();
        Self { dir }
    }
}

#[async_trait]
impl ScreenshotSink for DirSink {
    async fn store(
        &self,
        bytes: &[u8],
        query_id: &str,
        checkpoint: Checkpoint,
    ) -> Result<ScreenshotRef, SinkError> {
        let filename = format!("{}-{}.png", query_id, checkpoint.label());
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| SinkError(e.to_string()))?;
        Ok(ScreenshotRef(format!("/{}", filename)))
    }
}

/// Takes full-page screenshots at pipeline checkpoints. Capture is
/// best-effort end to end: a failed screenshot must never mask the
/// primary outcome, so every error is swallowed here.
pub struct DiagnosticCapture<'a> {
    sink: &'a dyn ScreenshotSink,
    query_id: &'a str,
}

impl<'a> DiagnosticCapture<'a> {
    pub fn new(sink: &'a dyn ScreenshotSink, query_id: &'a str) -> Self {
        Self { sink, query_id }
    }

    pub async fn capture(
        &self,
        page: &dyn PageDriver,
        checkpoint: Checkpoint,
    ) -> Option<ScreenshotRef> {
        let bytes = match page.screenshot_full_page().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("📸 Screenshot ({}) failed: {}", checkpoint.label(), e);
                return None;
            }
        };
        match self.sink.store(&bytes, self.query_id, checkpoint).await {
            Ok(reference) => Some(reference),
            Err(e) => {
                tracing::warn!("📸 Screenshot ({}) not stored: {}", checkpoint.label(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inline_sink_data_url() {
        let sink = InlineSink;
        let reference = sink
            .store(&[137, 80, 78, 71], "q1", Checkpoint::Before)
            .await
            .unwrap();
        assert!(reference.0.starts_with("data:image/png;base64,"));
    }
}
