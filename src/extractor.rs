use std::path::{Path, PathBuf};

use base64::Engine;
use serde_json::Value;

use crate::error::{BillError, Result};

/// A receipt, statement or note ready to send to an extraction service.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub media_type: &'static str,
    /// Base64 of the raw file bytes.
    pub data: String,
}

pub fn media_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        _ => return None,
    };
    Some(mime)
}

impl Document {
    pub fn from_bytes(name: &str, media_type: &'static str, bytes: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            media_type,
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let mime = media_type(path)
            .ok_or_else(|| BillError::Extraction(format!("unsupported file type: {name}")))?;
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(&name, mime, &bytes))
    }
}

/// Turns one document into candidate transaction objects.
pub trait Extractor {
    fn submit(&self, document: &Document) -> Result<Vec<Value>>;
}

// ---------------------------------------------------------------------------
// HTTP extractor
// ---------------------------------------------------------------------------

#[cfg(feature = "extract")]
pub struct HttpExtractor {
    url: String,
    token: Option<String>,
    http: reqwest::blocking::Client,
}

#[cfg(feature = "extract")]
impl HttpExtractor {
    pub fn new(url: &str, token: Option<String>) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(BillError::Settings(
                "extractor_url is not set (billfold config --extractor-url <url>)".to_string(),
            ));
        }
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            url: url.trim().to_string(),
            token,
            http,
        })
    }
}

#[cfg(feature = "extract")]
impl Extractor for HttpExtractor {
    fn submit(&self, document: &Document) -> Result<Vec<Value>> {
        let payload = serde_json::json!({
            "mimeType": document.media_type,
            "data": document.data,
        });
        let mut request = self.http.post(&self.url).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(file = %document.name, mime = document.media_type, "submitting document");
        let res = request.send()?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            let detail = body.trim();
            return Err(BillError::Extraction(if detail.is_empty() {
                format!("service answered {status}")
            } else {
                format!("service answered {status}: {detail}")
            }));
        }
        let body: Value = res.json()?;
        crate::importer::extraction_candidates(body)
    }
}

// ---------------------------------------------------------------------------
// Batch extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Candidates from every successful file, in file order.
    pub candidates: Vec<Value>,
    pub failures: Vec<(String, String)>,
}

fn extract_one<E: Extractor + ?Sized>(extractor: &E, path: &Path) -> Result<Vec<Value>> {
    let document = Document::from_path(path)?;
    extractor.submit(&document)
}

/// Run every file through `extractor` concurrently and wait for all of them.
/// A failing file is reported without affecting the others.
pub fn extract_all<E: Extractor + Sync + ?Sized>(extractor: &E, paths: &[PathBuf]) -> ExtractionReport {
    let results: Vec<(String, Result<Vec<Value>>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| (path, scope.spawn(move || extract_one(extractor, path))))
            .collect();
        handles
            .into_iter()
            .map(|(path, handle)| {
                let outcome = handle
                    .join()
                    .unwrap_or_else(|_| Err(BillError::Extraction("worker panicked".to_string())));
                (path.display().to_string(), outcome)
            })
            .collect()
    });

    let mut report = ExtractionReport::default();
    for (file, outcome) in results {
        match outcome {
            Ok(mut items) => {
                tracing::info!(%file, items = items.len(), "extracted");
                report.candidates.append(&mut items);
            }
            Err(e) => {
                tracing::warn!(%file, error = %e, "extraction failed");
                report.failures.push((file, e.to_string()));
            }
        }
    }
    report
}
