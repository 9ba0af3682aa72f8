//! URL parsing and artifact path derivation.
//!
//! Mirrors the teacher's mirror-path logic (`get_mirror_path`), but the
//! destination directory here is keyed by a content fingerprint of the URL
//! rather than by its domain/path structure, so re-capture overwrites the
//! same artifact set deterministically.

use anyhow::Result;
use std::path::{Path, PathBuf};
use url::Url;

/// Extract the registrable host from a URL, lowercased.
pub fn extract_domain(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| anyhow::anyhow!("failed to parse URL: {e}"))?;
    parsed
        .host_str()
        .map(str::to_lowercase)
        .ok_or_else(|| anyhow::anyhow!("URL has no host: {url}"))
}

/// Check if a URL is a navigable http(s) URL.
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return false;
    }
    matches!(
        Url::parse(url).map(|u| u.scheme().to_string()),
        Ok(scheme) if scheme == "http" || scheme == "https"
    )
}

/// Stable fingerprint of `(url, artifact_kind)` used to derive a deterministic,
/// collision-resistant artifact directory. Uses xxh3 for the same reason the
/// teacher uses it for etags: fast, stable across runs, not cryptographic.
#[must_use]
pub fn url_fingerprint(url: &str) -> String {
    let hash = xxhash_rust::xxh3::xxh3_64(url.as_bytes());
    format!("{hash:016x}")
}

/// Directory an artifact set for `url` should live under, within `archive_dir`.
#[must_use]
pub fn artifact_dir(archive_dir: &Path, url: &str) -> PathBuf {
    archive_dir.join(url_fingerprint(url))
}
