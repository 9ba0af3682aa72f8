//! Capture artifact emission: screenshot, PDF, HTML, and WARC output,
//! each written atomically (temp file in the target directory, then
//! rename) per `content_saver::compression::save_compressed_file`'s
//! temp-plus-persist contract.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, PrintToPdfParams,
};
use chromiumoxide::Page;
use tempfile::NamedTempFile;

use super::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Screenshot,
    Pdf,
    Html,
    Warc,
}

impl ArtifactKind {
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            ArtifactKind::Screenshot => "screenshot.png",
            ArtifactKind::Pdf => "page.pdf",
            ArtifactKind::Html => "page.html",
            ArtifactKind::Warc => "page.warc",
        }
    }
}

/// Write `bytes` to `path` atomically: a temp file in the same directory,
/// then an OS-level rename, so readers always see a complete file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    let parent = path
        .parent()
        .ok_or_else(|| PipelineError::Artifact("artifact path has no parent directory".into()))?;
    std::fs::create_dir_all(parent)?;
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(bytes)?;
    temp.persist(path)
        .map_err(|e| PipelineError::Artifact(e.to_string()))?;
    Ok(())
}

async fn capture_screenshot_bytes(page: &Page) -> Result<Vec<u8>, PipelineError> {
    let params = CaptureScreenshotParams {
        format: Some(CaptureScreenshotFormat::Png),
        capture_beyond_viewport: Some(true),
        ..Default::default()
    };
    page.screenshot(params)
        .await
        .map_err(|e| PipelineError::Artifact(format!("screenshot failed: {e}")))
}

async fn capture_pdf_bytes(page: &Page) -> Result<Vec<u8>, PipelineError> {
    page.pdf(PrintToPdfParams::default())
        .await
        .map_err(|e| PipelineError::Artifact(format!("pdf render failed: {e}")))
}

async fn capture_html_bytes(page: &Page) -> Result<Vec<u8>, PipelineError> {
    page.content()
        .await
        .map(String::into_bytes)
        .map_err(|e| PipelineError::Artifact(format!("content fetch failed: {e}")))
}

/// Minimal single-record WARC/1.1 response capture. No corpus file exercises
/// the `warc` crate's record-builder API directly (it appears only as a
/// declared import-path dependency elsewhere in the pack), so this writes
/// the WARC/1.1 text format directly against the published spec rather than
/// guess at an unverified library surface.
fn build_warc_response_record(
    url: &str,
    status: u16,
    headers: &[(String, String)],
    html: &[u8],
) -> Vec<u8> {
    let record_id = format!("<urn:uuid:{}>", uuid::Uuid::new_v4());
    let date = chrono::Utc::now().to_rfc3339();

    let mut http_block = format!("HTTP/1.1 {status} OK\r\n");
    for (name, value) in headers {
        http_block.push_str(&format!("{name}: {value}\r\n"));
    }
    http_block.push_str("\r\n");
    let mut block = http_block.into_bytes();
    block.extend_from_slice(html);

    let mut record = Vec::new();
    record.extend_from_slice(b"WARC/1.1\r\n");
    record.extend_from_slice(b"WARC-Type: response\r\n");
    record.extend_from_slice(format!("WARC-Target-URI: {url}\r\n").as_bytes());
    record.extend_from_slice(format!("WARC-Date: {date}\r\n").as_bytes());
    record.extend_from_slice(format!("WARC-Record-ID: {record_id}\r\n").as_bytes());
    record.extend_from_slice(b"Content-Type: application/http; msgtype=response\r\n");
    record.extend_from_slice(format!("Content-Length: {}\r\n", block.len()).as_bytes());
    record.extend_from_slice(b"\r\n");
    record.extend_from_slice(&block);
    record.extend_from_slice(b"\r\n\r\n");
    record
}

/// Render and atomically write one artifact kind, returning its final path.
pub async fn emit(
    kind: ArtifactKind,
    dir: &Path,
    page: &Page,
    url: &str,
    status: u16,
    headers: &[(String, String)],
) -> Result<PathBuf, PipelineError> {
    let path = dir.join(kind.filename());
    let bytes = match kind {
        ArtifactKind::Screenshot => capture_screenshot_bytes(page).await?,
        ArtifactKind::Pdf => capture_pdf_bytes(page).await?,
        ArtifactKind::Html => capture_html_bytes(page).await?,
        ArtifactKind::Warc => {
            let html = capture_html_bytes(page).await?;
            build_warc_response_record(url, status, headers, &html)
        }
    };
    write_atomic(&path, &bytes)?;
    Ok(path)
}
