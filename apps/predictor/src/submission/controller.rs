//! Submission controller: drives one prediction request at a time through
//! Idle → Loading → Success | Failure.
//!
//! The state lives behind a `std::sync::Mutex` that is never held across the network
//! await. Every `begin` bumps a generation counter; an outcome is applied only if it
//! carries the current generation, so a response that outlives a `reset` is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::form::{build, FormState};
use crate::predictor_client::{PredictionResult, PredictionTransport, SubmitError};

/// Shown for every failure kind. Most failures come from the free-tier backend
/// waking up, and the fix in every case is the same: wait and resubmit.
pub const COLD_START_MESSAGE: &str = "Backend may be waking up (free hosting). \
Wait 5–10 seconds and click Predict again. \
If it still fails, refresh the page and try once more.";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading,
    Success { result: PredictionResult },
    Failure { error_message: String },
}

impl SubmissionState {
    pub fn phase(&self) -> Phase {
        match self {
            SubmissionState::Idle => Phase::Idle,
            SubmissionState::Loading => Phase::Loading,
            SubmissionState::Success { .. } => Phase::Success,
            SubmissionState::Failure { .. } => Phase::Failure,
        }
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            SubmissionState::Success { result } => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SubmissionState::Failure { error_message } => Some(error_message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SubmissionState::Loading)
    }
}

/// Proof that the caller moved the controller into Loading. Carries the generation
/// the eventual outcome must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    generation: u64,
}

#[derive(Debug, Default)]
struct Tracked {
    state: SubmissionState,
    generation: u64,
}

pub struct SubmissionController {
    transport: Arc<dyn PredictionTransport>,
    tracked: Mutex<Tracked>,
}

impl SubmissionController {
    pub fn new(transport: Arc<dyn PredictionTransport>) -> Self {
        Self {
            transport,
            tracked: Mutex::new(Tracked::default()),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().state.clone()
    }

    /// Enters Loading, clearing any previous result or error.
    /// Returns `None` while a request is already in flight.
    pub fn begin(&self) -> Option<SubmissionTicket> {
        let mut tracked = self.lock();
        if tracked.state.is_loading() {
            return None;
        }
        tracked.generation += 1;
        tracked.state = SubmissionState::Loading;
        Some(SubmissionTicket {
            generation: tracked.generation,
        })
    }

    /// Applies the outcome of the request identified by `ticket`.
    /// Returns `false` when the ticket is stale and the outcome was dropped.
    pub fn resolve(
        &self,
        ticket: SubmissionTicket,
        outcome: Result<PredictionResult, SubmitError>,
    ) -> bool {
        let mut tracked = self.lock();
        if tracked.generation != ticket.generation || !tracked.state.is_loading() {
            debug!(
                generation = ticket.generation,
                current = tracked.generation,
                "Dropping stale prediction outcome"
            );
            return false;
        }

        tracked.state = match outcome {
            Ok(result) => {
                info!(
                    generation = ticket.generation,
                    suggestions = result.suggestions.len(),
                    "Prediction received"
                );
                SubmissionState::Success { result }
            }
            Err(e) => {
                warn!(
                    generation = ticket.generation,
                    kind = e.kind(),
                    "Prediction failed: {e}"
                );
                SubmissionState::Failure {
                    error_message: COLD_START_MESSAGE.to_string(),
                }
            }
        };
        true
    }

    /// Runs one submission cycle for `form`. Returns the settled state, or `None`
    /// if a request was already in flight and this call was suppressed.
    pub async fn submit(&self, form: &FormState) -> Option<SubmissionState> {
        let Some(ticket) = self.begin() else {
            debug!("Submit ignored: a prediction request is already in flight");
            return None;
        };
        Some(self.run(ticket, form).await)
    }

    /// Sends `form` for the request `ticket` started and returns the state afterwards.
    pub async fn run(&self, ticket: SubmissionTicket, form: &FormState) -> SubmissionState {
        let payload = build(form);
        info!(
            generation = ticket.generation,
            has_mba = payload.mba_p.is_some(),
            "Submitting profile for prediction"
        );

        let outcome = self.transport.predict(&payload).await;
        self.resolve(ticket, outcome);
        self.state()
    }

    /// Back to Idle. A request still in flight resolves into a stale ticket.
    pub fn reset(&self) {
        let mut tracked = self.lock();
        tracked.generation += 1;
        tracked.state = SubmissionState::Idle;
    }

    // Plain data behind the lock, so a poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, Tracked> {
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::form::PredictionPayload;

    fn sample_result() -> PredictionResult {
        PredictionResult {
            placement_probability: Some(78.0),
            level: Some("high".to_string()),
            expected_salary_min_lpa: Some(4.0),
            expected_salary_max_lpa: Some(6.0),
            expected_salary_min_inr: Some(400000.0),
            expected_salary_max_inr: Some(600000.0),
            suggestions: vec!["Add more projects".to_string()],
        }
    }

    fn parse_error() -> SubmitError {
        SubmitError::Parse(serde_json::from_str::<serde_json::Value>("not json").unwrap_err())
    }

    /// Answers each call with the next scripted outcome.
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<PredictionResult, SubmitError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<Result<PredictionResult, SubmitError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PredictionTransport for ScriptedTransport {
        async fn predict(
            &self,
            _payload: &PredictionPayload,
        ) -> Result<PredictionResult, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(SubmitError::HttpStatus { status: 500 }))
        }
    }

    /// Holds every request until released.
    struct GatedTransport {
        entered: Notify,
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PredictionTransport for GatedTransport {
        async fn predict(
            &self,
            _payload: &PredictionPayload,
        ) -> Result<PredictionResult, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(sample_result())
        }
    }

    #[tokio::test]
    async fn test_success_stores_result() {
        let transport = ScriptedTransport::new(vec![Ok(sample_result())]);
        let controller = SubmissionController::new(transport.clone());
        assert_eq!(controller.state().phase(), Phase::Idle);

        let settled = controller.submit(&FormState::default()).await.unwrap();
        assert_eq!(settled.phase(), Phase::Success);
        assert_eq!(settled.result(), Some(&sample_result()));
        assert_eq!(settled.error_message(), None);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_failure_kind_collapses_to_one_message() {
        let transport = ScriptedTransport::new(vec![
            Err(SubmitError::HttpStatus { status: 503 }),
            Err(parse_error()),
        ]);
        let controller = SubmissionController::new(transport);

        for _ in 0..2 {
            let settled = controller.submit(&FormState::default()).await.unwrap();
            assert_eq!(settled.phase(), Phase::Failure);
            assert_eq!(settled.error_message(), Some(COLD_START_MESSAGE));
            assert!(settled.result().is_none());
        }
    }

    #[tokio::test]
    async fn test_unreachable_service_fails_without_result() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let endpoint = format!("http://{addr}/predict").parse().unwrap();
        let client = crate::predictor_client::PredictorClient::new(endpoint).unwrap();
        let controller = SubmissionController::new(Arc::new(client));
        assert_eq!(controller.state(), SubmissionState::Idle);

        let settled = controller.submit(&FormState::default()).await.unwrap();
        assert_eq!(settled.phase(), Phase::Failure);
        assert!(!settled.error_message().unwrap().is_empty());
        assert!(settled.result().is_none());
    }

    #[tokio::test]
    async fn test_any_json_body_is_a_success() {
        let app = axum::Router::new().route(
            "/predict",
            axum::routing::post(|| async {
                r#"{"placement_probability":"78","level":3,"suggestions":null}"#
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        let endpoint = format!("http://{addr}/predict").parse().unwrap();
        let client = crate::predictor_client::PredictorClient::new(endpoint).unwrap();
        let controller = SubmissionController::new(Arc::new(client));

        let settled = controller.submit(&FormState::default()).await.unwrap();
        assert_eq!(settled.phase(), Phase::Success);
        let result = settled.result().unwrap();
        assert_eq!(result.placement_probability, Some(78.0));
        assert_eq!(result.level.as_deref(), Some("3"));
        assert!(result.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_failure_can_be_retried_immediately() {
        let transport = ScriptedTransport::new(vec![
            Err(SubmitError::HttpStatus { status: 502 }),
            Ok(sample_result()),
        ]);
        let controller = SubmissionController::new(transport);

        let first = controller.submit(&FormState::default()).await.unwrap();
        assert_eq!(first.phase(), Phase::Failure);
        let second = controller.submit(&FormState::default()).await.unwrap();
        assert_eq!(second.phase(), Phase::Success);
    }

    #[test]
    fn test_begin_clears_previous_result() {
        let controller = SubmissionController::new(ScriptedTransport::new(vec![]));
        let ticket = controller.begin().unwrap();
        assert!(controller.resolve(ticket, Ok(sample_result())));
        assert_eq!(controller.state().phase(), Phase::Success);

        controller.begin().unwrap();
        assert_eq!(controller.state(), SubmissionState::Loading);
        assert!(controller.state().result().is_none());
    }

    #[test]
    fn test_only_loading_can_settle() {
        let controller = SubmissionController::new(ScriptedTransport::new(vec![]));
        let ticket = controller.begin().unwrap();
        assert!(controller.resolve(ticket, Err(parse_error())));
        // A second outcome for the same request cannot move Failure anywhere.
        assert!(!controller.resolve(ticket, Ok(sample_result())));
        assert_eq!(controller.state().phase(), Phase::Failure);
    }

    #[test]
    fn test_begin_while_loading_is_suppressed() {
        let controller = SubmissionController::new(ScriptedTransport::new(vec![]));
        let first = controller.begin().unwrap();
        assert_eq!(controller.begin(), None);
        assert_eq!(first.generation, 1);
    }

    #[test]
    fn test_outcome_after_reset_is_dropped() {
        let controller = SubmissionController::new(ScriptedTransport::new(vec![]));
        let ticket = controller.begin().unwrap();
        controller.reset();
        assert_eq!(controller.state(), SubmissionState::Idle);

        assert!(!controller.resolve(ticket, Ok(sample_result())));
        assert_eq!(controller.state(), SubmissionState::Idle);

        let next = controller.begin().unwrap();
        assert!(next.generation > ticket.generation);
        assert!(!controller.resolve(ticket, Ok(sample_result())));
        assert!(controller.resolve(next, Ok(sample_result())));
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_a_no_op() {
        let transport = Arc::new(GatedTransport {
            entered: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let controller = Arc::new(SubmissionController::new(transport.clone()));

        let in_flight = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit(&FormState::default()).await })
        };
        transport.entered.notified().await;
        assert!(controller.state().is_loading());

        assert_eq!(controller.submit(&FormState::default()).await, None);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        transport.release.notify_one();
        let settled = in_flight.await.unwrap().unwrap();
        assert_eq!(settled.phase(), Phase::Success);
    }

    #[test]
    fn test_state_serializes_with_phase_tag() {
        let json = serde_json::to_value(SubmissionState::Failure {
            error_message: COLD_START_MESSAGE.to_string(),
        })
        .unwrap();
        assert_eq!(json["phase"], "failure");
        assert_eq!(json["error_message"], COLD_START_MESSAGE);

        let json = serde_json::to_value(SubmissionState::Idle).unwrap();
        assert_eq!(json["phase"], "idle");
    }
}
