//! Typed client for the sentiment backend API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use super::http::{self, MultipartForm};
use super::wire::{
    HistoryEntry, PredictResponse, SessionResultsFilter, SessionResultsPage, SessionStats,
    SessionsPage, ValidateResponse,
};
use crate::cancel::CancelToken;
use crate::results::label::Label;
use crate::util::notify::Notice;

const MAX_JSON_RESPONSE_BYTES: usize = 8 * 1024 * 1024;
const MAX_ERROR_BODY_BYTES: usize = 256 * 1024;
/// The backend accepts uploads up to 500 MB; allow the same for downloads.
const MAX_DOWNLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Default budget for predict/validate calls; the backend may hold the
/// request open for the whole batch.
pub const LONG_REQUEST_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Failures surfaced by the API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The user abandoned the request. Not a failure; never toasted.
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Invalid backend URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Cannot connect to server: {0}")]
    Connect(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Network error: {0}")]
    Transport(String),
    /// Non-2xx response with the backend's human-readable message.
    #[error("Server error (HTTP {status}): {message}")]
    Status {
        status: u16,
        message: String,
        /// 1-based CSV row the backend blamed, when present.
        row: Option<u64>,
    },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// Dismissible notification for this error, or `None` for cancellation,
    /// which must short-circuit every toast path.
    pub fn notice(&self) -> Option<Notice> {
        if self.is_cancelled() {
            return None;
        }
        Some(Notice::error(self.to_string()))
    }
}

/// Client for the backend HTTP surface.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    long_timeout: Duration,
}

impl ApiClient {
    /// Build a client for the given base URL, e.g. `http://localhost:8000`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|err| ApiError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
        Ok(Self {
            base,
            long_timeout: LONG_REQUEST_TIMEOUT,
        })
    }

    /// Override the predict/validate timeout budget (tests, slow backends).
    pub fn with_long_timeout(mut self, timeout: Duration) -> Self {
        self.long_timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base.as_str().trim_end_matches('/'), path)
    }

    /// Upload a CSV for prediction. Long-running; respects `token`.
    pub fn predict(
        &self,
        filename: &str,
        csv: &[u8],
        enable_preprocessing: bool,
        token: &CancelToken,
    ) -> Result<PredictResponse, ApiError> {
        self.submit_csv("api/predict", filename, csv, enable_preprocessing, token)
    }

    /// Upload a labeled CSV for validation. Long-running; respects `token`.
    pub fn validate(
        &self,
        filename: &str,
        csv: &[u8],
        enable_preprocessing: bool,
        token: &CancelToken,
    ) -> Result<ValidateResponse, ApiError> {
        self.submit_csv("api/validate", filename, csv, enable_preprocessing, token)
    }

    fn submit_csv<T: DeserializeOwned>(
        &self,
        path: &str,
        filename: &str,
        csv: &[u8],
        enable_preprocessing: bool,
        token: &CancelToken,
    ) -> Result<T, ApiError> {
        check_cancelled(token)?;
        let mut form = MultipartForm::new();
        form.add_text(
            "enable_preprocessing",
            if enable_preprocessing { "true" } else { "false" },
        );
        form.add_file("file", filename, csv);
        let (content_type, body) = form.finish();

        let url = self.endpoint(path);
        tracing::info!(%url, bytes = body.len(), "submitting csv to backend");
        let response = http::agent()
            .post(&url)
            .timeout(self.long_timeout)
            .set("Content-Type", &content_type)
            .send_bytes(&body);
        let response = unwrap_response(response, token)?;
        parse_json_body(response)
    }

    /// Fetch a predicted-results CSV blob as text.
    pub fn download_predicted_csv(
        &self,
        id: &str,
        token: &CancelToken,
    ) -> Result<String, ApiError> {
        check_cancelled(token)?;
        let url = self.endpoint(&format!("api/download/predicted/{id}"));
        let response = unwrap_response(http::agent().get(&url).call(), token)?;
        let bytes = http::read_response_bytes(response, MAX_DOWNLOAD_BYTES)
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
        check_cancelled(token)?;
        String::from_utf8(bytes).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    /// Fetch a validation result blob verbatim; saved to disk unmodified.
    pub fn download_validation_json(
        &self,
        id: &str,
        token: &CancelToken,
    ) -> Result<Vec<u8>, ApiError> {
        check_cancelled(token)?;
        let url = self.endpoint(&format!("api/download/validation/{id}"));
        let response = unwrap_response(http::agent().get(&url).call(), token)?;
        let bytes = http::read_response_bytes(response, MAX_DOWNLOAD_BYTES)
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
        check_cancelled(token)?;
        Ok(bytes)
    }

    pub fn list_predictions(&self, token: &CancelToken) -> Result<Vec<HistoryEntry>, ApiError> {
        self.get_json(&self.endpoint("api/predictions/list"), token)
    }

    pub fn list_validations(&self, token: &CancelToken) -> Result<Vec<HistoryEntry>, ApiError> {
        self.get_json(&self.endpoint("api/validations/list"), token)
    }

    pub fn sessions(
        &self,
        limit: u32,
        offset: u32,
        token: &CancelToken,
    ) -> Result<SessionsPage, ApiError> {
        let url = self.endpoint(&format!("api/sessions?limit={limit}&offset={offset}"));
        self.get_json(&url, token)
    }

    pub fn session_stats(
        &self,
        session_id: i64,
        token: &CancelToken,
    ) -> Result<SessionStats, ApiError> {
        self.get_json(&self.endpoint(&format!("api/sessions/{session_id}/stats")), token)
    }

    /// Server-side filtered/paginated session rows; the alternate browsing
    /// path that predates the CSV-download flow.
    pub fn session_results(
        &self,
        session_id: i64,
        filter: &SessionResultsFilter,
        limit: u32,
        offset: u32,
        token: &CancelToken,
    ) -> Result<SessionResultsPage, ApiError> {
        let mut url = Url::parse(&self.endpoint(&format!("api/sessions/{session_id}/results")))
            .map_err(|err| ApiError::InvalidBaseUrl(err.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &limit.to_string());
            pairs.append_pair("offset", &offset.to_string());
            if let Some(label) = filter.pred_label {
                pairs.append_pair("pred_label", &label.as_index().to_string());
            }
            if let Some(min) = filter.min_confidence {
                pairs.append_pair("min_confidence", &min.to_string());
            }
            if let Some(max) = filter.max_confidence {
                pairs.append_pair("max_confidence", &max.to_string());
            }
            if let Some(source) = &filter.source {
                pairs.append_pair("source", source);
            }
            if let Some(search) = &filter.search {
                pairs.append_pair("search", search);
            }
        }
        self.get_json(url.as_str(), token)
    }

    /// Persist a manual correction on the session path.
    pub fn update_result_label(
        &self,
        result_id: i64,
        label: Label,
        token: &CancelToken,
    ) -> Result<(), ApiError> {
        check_cancelled(token)?;
        let url = self.endpoint(&format!(
            "api/results/{result_id}?true_label={}",
            label.as_index()
        ));
        let response = unwrap_response(http::agent().put(&url).call(), token)?;
        // Body is `{"message": "..."}`; nothing the caller needs.
        let _ = http::read_response_bytes(response, MAX_ERROR_BODY_BYTES);
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &CancelToken,
    ) -> Result<T, ApiError> {
        check_cancelled(token)?;
        let response = unwrap_response(http::agent().get(url).call(), token)?;
        check_cancelled(token)?;
        parse_json_body(response)
    }
}

fn check_cancelled(token: &CancelToken) -> Result<(), ApiError> {
    if token.is_cancelled() {
        Err(ApiError::Cancelled)
    } else {
        Ok(())
    }
}

/// Map a ureq result into the client taxonomy, consulting the token so a
/// cancellation raised mid-flight wins over whatever the transport reports.
fn unwrap_response(
    result: Result<ureq::Response, ureq::Error>,
    token: &CancelToken,
) -> Result<ureq::Response, ApiError> {
    match result {
        Ok(response) => {
            check_cancelled(token)?;
            Ok(response)
        }
        Err(ureq::Error::Status(status, response)) => {
            check_cancelled(token)?;
            let body = http::read_response_bytes(response, MAX_ERROR_BODY_BYTES)
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();
            let detail = http::extract_detail(&body);
            Err(ApiError::Status {
                status,
                message: detail.message,
                row: detail.row,
            })
        }
        Err(ureq::Error::Transport(transport)) => {
            check_cancelled(token)?;
            Err(classify_transport(&transport))
        }
    }
}

fn classify_transport(transport: &ureq::Transport) -> ApiError {
    let message = transport.to_string();
    match transport.kind() {
        ureq::ErrorKind::Dns | ureq::ErrorKind::ConnectionFailed => ApiError::Connect(message),
        ureq::ErrorKind::Io if message.to_lowercase().contains("timed out") => {
            ApiError::Timeout(message)
        }
        _ => ApiError::Transport(message),
    }
}

fn parse_json_body<T: DeserializeOwned>(response: ureq::Response) -> Result<T, ApiError> {
    let bytes = http::read_response_bytes(response, MAX_JSON_RESPONSE_BYTES)
        .map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 16 * 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    fn json_response(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        )
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn cancelled_token_short_circuits_before_the_call() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let token = CancelToken::new();
        token.cancel();
        let err = client.list_predictions(&token).unwrap_err();
        assert!(err.is_cancelled());
        assert!(err.notice().is_none());
    }

    #[test]
    fn connection_failure_classifies_as_connect() {
        // Port 9 (discard) is almost always closed.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = client.list_predictions(&CancelToken::new()).unwrap_err();
        assert!(matches!(err, ApiError::Connect(_) | ApiError::Transport(_)));
        assert!(err.notice().is_some());
    }

    #[test]
    fn downloads_predicted_csv_as_text() {
        let url = serve_once(json_response("text,pred_label\nhi,1"));
        let client = ApiClient::new(&url).unwrap();
        let csv = client
            .download_predicted_csv("42", &CancelToken::new())
            .unwrap();
        assert_eq!(csv, "text,pred_label\nhi,1");
    }

    #[test]
    fn surfaces_error_detail_from_status_responses() {
        let body = r#"{"detail": {"error": {"message": "bad csv", "row": 3}}}"#;
        let response = format!(
            "HTTP/1.1 400 Bad Request\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let url = serve_once(response);
        let client = ApiClient::new(&url).unwrap();
        let err = client.list_predictions(&CancelToken::new()).unwrap_err();
        match err {
            ApiError::Status { status, message, row } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad csv");
                assert_eq!(row, Some(3));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn parses_validate_response_end_to_end() {
        let body = r#"{"macro_f1":0.5,"class_metrics":[{"class_label":0,"precision":1.0,"recall":1.0,"f1":1.0}]}"#;
        let url = serve_once(json_response(body));
        let client = ApiClient::new(&url).unwrap();
        let parsed = client
            .validate("reviews.csv", b"text,label\nok,1\n", true, &CancelToken::new())
            .unwrap();
        assert_eq!(parsed.class_metrics.len(), 1);
        assert!((parsed.macro_f1 - 0.5).abs() < f32::EPSILON);
    }
}
