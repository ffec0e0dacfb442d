use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::config::Config;
use crate::form::FormState;
use crate::predictor_client::PredictionTransport;
use crate::render::PageRenderer;
use crate::submission::{SubmissionController, SubmissionState};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub renderer: Arc<PageRenderer>,
    /// The app is a single-user local tool: one form session per process.
    pub session: Arc<FormSession>,
}

impl AppState {
    pub fn new(
        config: Config,
        renderer: PageRenderer,
        transport: Arc<dyn PredictionTransport>,
    ) -> Self {
        Self {
            config,
            renderer: Arc::new(renderer),
            session: Arc::new(FormSession::new(transport)),
        }
    }
}

/// The form values last posted by the user plus the controller that submits them.
pub struct FormSession {
    form: Mutex<FormState>,
    controller: SubmissionController,
}

impl FormSession {
    pub fn new(transport: Arc<dyn PredictionTransport>) -> Self {
        Self {
            form: Mutex::new(FormState::default()),
            controller: SubmissionController::new(transport),
        }
    }

    pub fn form(&self) -> FormState {
        self.form
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace_form(&self, form: FormState) {
        *self.form.lock().unwrap_or_else(PoisonError::into_inner) = form;
    }

    /// Submits `form` and keeps it as the session form. While another request is in
    /// flight the post is ignored and the form it was built from stays on display.
    pub async fn submit(&self, form: FormState) -> Option<SubmissionState> {
        let Some(ticket) = self.controller.begin() else {
            debug!("Predict post ignored while a request is in flight");
            return None;
        };
        self.replace_form(form.clone());
        Some(self.controller.run(ticket, &form).await)
    }

    pub fn submission(&self) -> SubmissionState {
        self.controller.state()
    }

    /// Clears the form and forgets any prediction, including one still in flight.
    pub fn reset(&self) {
        self.replace_form(FormState::default());
        self.controller.reset();
    }
}
