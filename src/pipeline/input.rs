//! Input resolution: load a user-supplied path or URL into memory.
//!
//! pdfium can parse from a byte slice, so inputs are read fully into memory
//! and never written back to disk. The `%PDF` magic is checked here so a
//! stray text file is rejected before pdfium sees it.

use crate::error::ExtractError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// A loaded input document.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// The path or URL as given by the user.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load one input, downloading it if it is a URL.
pub async fn load_input(input: &str, timeout_secs: u64) -> Result<SourceFile, ExtractError> {
    let bytes = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(input).await?
    };
    check_magic(input, &bytes)?;
    Ok(SourceFile {
        name: input.to_string(),
        bytes,
    })
}

fn check_magic(input: &str, bytes: &[u8]) -> Result<(), ExtractError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(ExtractError::NotAPdf {
            input: input.to_string(),
            magic: bytes.iter().take(4).copied().collect(),
        });
    }
    Ok(())
}

async fn read_local(path_str: &str) -> Result<Vec<u8>, ExtractError> {
    let path = PathBuf::from(path_str);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        let reason = match e.kind() {
            std::io::ErrorKind::NotFound => "file not found".to_string(),
            std::io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => e.to_string(),
        };
        ExtractError::Resolve {
            input: path_str.to_string(),
            reason,
        }
    })?;
    debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, ExtractError> {
    info!("Downloading PDF from: {}", url);

    let resolve_err = |reason: String| ExtractError::Resolve {
        input: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| resolve_err(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            resolve_err(format!("download timed out after {timeout_secs}s"))
        } else {
            resolve_err(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(resolve_err(format!("HTTP {}", response.status())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| resolve_err(e.to_string()))?;

    debug!("Downloaded {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[tokio::test]
    async fn missing_file_is_resolve_error() {
        let err = load_input("/definitely/not/here.pdf", 5).await.unwrap_err();
        assert!(matches!(err, ExtractError::Resolve { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn non_pdf_bytes_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello world").unwrap();
        let err = load_input(f.path().to_str().unwrap(), 5).await.unwrap_err();
        assert!(matches!(err, ExtractError::NotAPdf { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn pdf_magic_accepted() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n...").unwrap();
        let file = load_input(f.path().to_str().unwrap(), 5).await.unwrap();
        assert!(file.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn short_input_rejected() {
        assert!(check_magic("x", b"%P").is_err());
    }
}
