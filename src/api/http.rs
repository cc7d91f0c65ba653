//! Shared HTTP plumbing: agent configuration, bounded response reads,
//! multipart encoding, and backend error-payload extraction.

use std::io::{self, Read};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const WRITE_TIMEOUT: Duration = Duration::from_secs(60);

/// Return a shared HTTP agent with consistent timeouts.
///
/// Long-running calls (predict/validate) override the read budget with a
/// per-request timeout.
pub(crate) fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .timeout_write(WRITE_TIMEOUT)
            .build()
    })
}

/// Read a response into memory, enforcing a maximum byte size.
pub(crate) fn read_response_bytes(
    response: ureq::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, io::Error> {
    if let Some(length) = response
        .header("Content-Length")
        .and_then(|value| value.parse::<u64>().ok())
        && length > max_bytes as u64
    {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response too large: {length} bytes"),
        ));
    }
    let mut limited = response.into_reader().take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response exceeded {max_bytes} bytes"),
        ));
    }
    Ok(bytes)
}

/// A multipart/form-data request body. ureq has no multipart support, so
/// the body is assembled by hand.
pub(crate) struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let nonce = COUNTER.fetch_add(1, Ordering::Relaxed);
        let pid = std::process::id();
        Self {
            boundary: format!("----sentilens-{pid:x}-{nonce:x}"),
            body: Vec::new(),
        }
    }

    pub(crate) fn add_text(&mut self, name: &str, value: &str) {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
    }

    pub(crate) fn add_file(&mut self, name: &str, filename: &str, content: &[u8]) {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: text/csv\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(content);
        self.body.extend_from_slice(b"\r\n");
    }

    /// Close the body and return `(content-type header value, bytes)`.
    pub(crate) fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// Human-readable error payload from the backend's `detail` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ErrorDetail {
    pub message: String,
    /// 1-based CSV row the error refers to, when the backend knows it.
    pub row: Option<u64>,
}

/// Extract the message from an error body.
///
/// The backend returns either `{"detail": "..."}"` or
/// `{"detail": {"error": {"message": "...", "row": n}}}`. Anything else
/// falls back to the raw body text.
pub(crate) fn extract_detail(body: &str) -> ErrorDetail {
    let fallback = || ErrorDetail {
        message: body.trim().to_string(),
        row: None,
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback();
    };
    let Some(detail) = value.get("detail") else {
        return fallback();
    };
    if let Some(message) = detail.as_str() {
        return ErrorDetail {
            message: message.to_string(),
            row: None,
        };
    }
    let error = detail.get("error").unwrap_or(detail);
    let message = error
        .get("message")
        .and_then(|message| message.as_str())
        .map(str::to_string);
    match message {
        Some(message) => ErrorDetail {
            message,
            row: error.get("row").and_then(|row| row.as_u64()),
        },
        None => fallback(),
    }
}
