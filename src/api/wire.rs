//! Serde types for the backend API surface.

use serde::{Deserialize, Serialize};

use crate::results::label::Label;

/// Response to `POST /api/predict`.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub status: String,
    /// Number of rows the backend analyzed.
    #[serde(default)]
    pub rows: u64,
    /// Where to fetch the predicted CSV from.
    pub download_url: String,
    /// 1-based input rows dropped during server-side validation.
    #[serde(default)]
    pub skipped_rows: Vec<u64>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub processing_time: Option<f64>,
}

/// Per-class summary statistics from a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class_label: Label,
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
}

/// Response to `POST /api/validate`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateResponse {
    /// Headline metric: arithmetic mean of per-class F1 scores.
    pub macro_f1: f32,
    pub class_metrics: Vec<ClassMetrics>,
    #[serde(default)]
    pub validation_id: Option<String>,
    #[serde(default)]
    pub processing_time: Option<f64>,
}

/// One entry of the prediction/validation history listings.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub rows: Option<u64>,
    #[serde(default)]
    pub macro_f1: Option<f32>,
}

/// One session in `GET /api/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    pub id: i64,
    pub filename: String,
    pub created_at: String,
    pub texts_count: u64,
    #[serde(default)]
    pub avg_confidence: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionsPage {
    pub sessions: Vec<SessionInfo>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Response to `GET /api/sessions/{id}/stats`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStats {
    pub session_id: i64,
    pub filename: String,
    pub created_at: String,
    pub total_texts: u64,
    pub analyzed_texts: u64,
    #[serde(default)]
    pub avg_confidence: Option<f32>,
    #[serde(default)]
    pub min_confidence: Option<f32>,
    #[serde(default)]
    pub max_confidence: Option<f32>,
    /// Keyed by class index rendered as a string, JSON-object style.
    pub class_distribution: std::collections::BTreeMap<String, u64>,
    #[serde(default)]
    pub source_distribution: Option<std::collections::BTreeMap<String, u64>>,
}

/// One stored row in `GET /api/sessions/{id}/results`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionResult {
    pub id: i64,
    pub text: String,
    pub pred_label: Label,
    pub confidence: f32,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub true_label: Option<Label>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionResultsPage {
    pub results: Vec<SessionResult>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Server-side filters for session results; mirrors the client-side
/// `QueryPredicate` plus the confidence band only the backend stores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionResultsFilter {
    pub pred_label: Option<Label>,
    pub min_confidence: Option<f32>,
    pub max_confidence: Option<f32>,
    pub source: Option<String>,
    pub search: Option<String>,
}
