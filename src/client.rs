use crate::config::Configuration;
use crate::document;
use crate::error::{error_chain, Error, Result};
use crate::result::{DocumentResult, ImageMap, PageResult};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const LAYOUT_PARSING_ENDPOINT: &str = "/layout-parsing";
const HEALTH_ENDPOINT: &str = "/health";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest request deadline accepted; larger values overflow the client's clock.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrOptions {
    pub orientation_classify: bool,
    pub unwarping: bool,
    pub chart_recognition: bool,
    /// Zero falls back to [`DEFAULT_TIMEOUT`]; capped at [`MAX_TIMEOUT`].
    pub timeout: Duration,
}

impl OcrOptions {
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout.min(MAX_TIMEOUT)
        }
    }
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            orientation_classify: false,
            unwarping: false,
            chart_recognition: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutParsingRequest {
    file: String,
    file_type: u8,
    use_doc_orientation_classify: bool,
    use_doc_unwarping: bool,
    use_chart_recognition: bool,
}

/// Response wrapper shared by every endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    log_id: Option<String>,
    error_code: Option<i64>,
    error_msg: Option<String>,
    result: Option<T>,
}

// Every field may be missing or null; both mean "empty".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutParsingResult {
    layout_parsing_results: Option<Vec<Option<LayoutPage>>>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutPage {
    markdown: Option<LayoutMarkdown>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutMarkdown {
    text: Option<String>,
    images: Option<ImageMap>,
}

impl LayoutParsingResult {
    fn into_pages(self) -> Vec<PageResult> {
        self.layout_parsing_results
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(page_index, page)| {
                let markdown = page.unwrap_or_default().markdown.unwrap_or_default();
                PageResult {
                    page_index,
                    markdown: markdown.text.unwrap_or_default(),
                    images: markdown.images.unwrap_or_default(),
                }
            })
            .collect()
    }
}

/// Client for a PaddleOCR layout-parsing server.
///
/// Holds nothing but its configuration; every call is independent.
#[derive(Debug, Clone)]
pub struct OcrClient {
    config: Configuration,
}

impl OcrClient {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn server_url(&self) -> &str {
        self.config.server_url.trim_end_matches('/')
    }

    /// Run OCR on a file. Failures are reported through the returned result.
    pub fn ocr_file(&self, path: &Path, options: &OcrOptions) -> DocumentResult {
        match self.try_ocr_file(path, options) {
            Ok(result) => result,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "OCR request failed");
                DocumentResult::from_error(&e)
            }
        }
    }

    fn try_ocr_file(&self, path: &Path, options: &OcrOptions) -> Result<DocumentResult> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        if !self.is_configured() {
            return Err(Error::Unconfigured);
        }

        let file_type = document::classify(path);
        let request = LayoutParsingRequest {
            file: document::encode(path)?,
            file_type: file_type.code(),
            use_doc_orientation_classify: options.orientation_classify,
            use_doc_unwarping: options.unwarping,
            use_chart_recognition: options.chart_recognition,
        };

        let timeout = options.effective_timeout();

        let url = format!("{}{}", self.server_url(), LAYOUT_PARSING_ENDPOINT);
        debug!(
            url = %url,
            file_type = ?file_type,
            timeout_secs = timeout.as_secs(),
            "Sending layout-parsing request"
        );

        let http = build_http_client(timeout)?;
        let (status, body) = send(self.authorized(http.post(&url)).json(&request))?;

        if status != StatusCode::OK {
            return Err(Error::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let envelope: Envelope<LayoutParsingResult> =
            serde_json::from_str(&body).map_err(Error::InvalidResponse)?;
        let log_id = envelope.log_id.filter(|id| !id.is_empty());

        let code = envelope.error_code.unwrap_or_default();
        if code != 0 {
            return Err(Error::Api {
                code,
                message: envelope.error_msg.unwrap_or_default(),
                log_id,
            });
        }

        let pages = envelope.result.unwrap_or_default().into_pages();

        debug!(pages = pages.len(), log_id = ?log_id, "Layout parsing succeeded");
        Ok(DocumentResult::success(pages, log_id))
    }

    /// Probe the server's health endpoint with a short fixed timeout.
    pub fn test_connection(&self) -> (bool, String) {
        if self.config.access_token.is_empty() {
            return (false, "Access token not configured".to_string());
        }

        let url = format!("{}{}", self.server_url(), HEALTH_ENDPOINT);
        debug!(url = %url, "Checking server health");

        let http = match build_http_client(HEALTH_TIMEOUT) {
            Ok(http) => http,
            Err(e) => return (false, e.to_string()),
        };

        let (status, body) = match send(self.authorized(http.get(&url))) {
            Ok(response) => response,
            Err(Error::Transport(msg)) => return (false, format!("Connection failed: {}", msg)),
            Err(e) => return (false, e.to_string()),
        };

        if status != StatusCode::OK {
            return (
                false,
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                ),
            );
        }

        match serde_json::from_str::<Envelope<serde_json::Value>>(&body) {
            Ok(envelope) if envelope.error_code.unwrap_or_default() == 0 => {
                (true, "Connection successful".to_string())
            }
            Ok(envelope) => (
                false,
                format!("Server error: {}", envelope.error_msg.unwrap_or_default()),
            ),
            Err(e) => (false, Error::InvalidResponse(e).to_string()),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(
            reqwest::header::AUTHORIZATION,
            format!("token {}", self.config.access_token),
        )
    }
}

fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", error_chain(&e))))
}

fn send(request: RequestBuilder) -> Result<(StatusCode, String)> {
    let response = request
        .send()
        .map_err(|e| Error::Transport(error_chain(&e)))?;
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| Error::Transport(format!("Failed to read response: {}", error_chain(&e))))?;
    debug!(status = %status, bytes = body.len(), "Received response");
    Ok((status, body))
}
