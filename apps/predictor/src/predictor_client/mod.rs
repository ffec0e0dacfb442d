/// Predictor client: the only module that talks to the remote placement-prediction service.
///
/// One POST per submission, no retries and no client-side timeout. The service runs on
/// free hosting and may be cold-starting, so retrying is left to the user.
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::form::PredictionPayload;

pub const DEFAULT_PREDICTOR_URL: &str = "https://placement-predictor-platform.onrender.com/predict";

/// Every way a submission can fail. The controller collapses all of them into one
/// user-facing message; the kind survives only in logs.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("prediction service returned status {status}")]
    HttpStatus { status: u16 },

    #[error("response body is not JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SubmitError {
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::Network(_) => "network",
            SubmitError::HttpStatus { .. } => "http_status",
            SubmitError::Parse(_) => "parse",
        }
    }
}

/// Prediction returned by the service. Any JSON body is accepted: fields that are
/// missing, `null` or of an unexpected type are left empty and the view shows the gaps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PredictionResult {
    pub placement_probability: Option<f64>,
    pub level: Option<String>,
    pub expected_salary_min_lpa: Option<f64>,
    pub expected_salary_max_lpa: Option<f64>,
    pub expected_salary_min_inr: Option<f64>,
    pub expected_salary_max_inr: Option<f64>,
    pub suggestions: Vec<String>,
}

impl PredictionResult {
    /// Reads the known fields out of a parsed body without rejecting anything.
    pub fn from_json(body: &Value) -> Self {
        Self {
            placement_probability: number(body, "placement_probability"),
            level: body.get("level").and_then(text),
            expected_salary_min_lpa: number(body, "expected_salary_min_lpa"),
            expected_salary_max_lpa: number(body, "expected_salary_max_lpa"),
            expected_salary_min_inr: number(body, "expected_salary_min_inr"),
            expected_salary_max_inr: number(body, "expected_salary_max_inr"),
            suggestions: body
                .get("suggestions")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(text).collect())
                .unwrap_or_default(),
        }
    }
}

// Numbers, or strings holding a finite number.
fn number(body: &Value, key: &str) -> Option<f64> {
    match body.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

// Strings as-is, other scalars in their JSON spelling. Arrays, objects and null are skipped.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        _ => None,
    }
}

/// Transport seam between the submission controller and the network.
///
/// `PredictorClient` is the production backend; tests plug in stubs.
#[async_trait]
pub trait PredictionTransport: Send + Sync {
    async fn predict(&self, payload: &PredictionPayload) -> Result<PredictionResult, SubmitError>;
}

#[derive(Clone)]
pub struct PredictorClient {
    client: Client,
    endpoint: Url,
}

impl PredictorClient {
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends a GET to the service root so a dormant instance starts booting
    /// before the first prediction. The body is ignored.
    pub async fn warm_up(&self) -> Result<(), SubmitError> {
        let mut root = self.endpoint.clone();
        root.set_path("/");
        root.set_query(None);

        let status = self.client.get(root).send().await?.status();
        if !status.is_success() {
            return Err(SubmitError::HttpStatus {
                status: status.as_u16(),
            });
        }
        debug!("Prediction service answered warm-up with {status}");
        Ok(())
    }
}

#[async_trait]
impl PredictionTransport for PredictorClient {
    async fn predict(&self, payload: &PredictionPayload) -> Result<PredictionResult, SubmitError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("content-type", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The body of a failed call is never read.
            return Err(SubmitError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let body: Value = serde_json::from_str(&body)?;
        debug!("Prediction service answered with {status}");
        Ok(PredictionResult::from_json(&body))
    }
}
