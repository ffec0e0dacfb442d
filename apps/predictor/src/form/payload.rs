use serde::{Deserialize, Serialize};

use crate::form::state::FormState;

/// JSON body sent to the prediction service.
///
/// `mba_p` is omitted, not zeroed, when the candidate left it blank: the service
/// reads a missing key as "not an MBA student".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionPayload {
    pub ssc_p: f64,
    pub hsc_p: f64,
    pub degree_p: f64,
    pub etest_p: f64,
    pub workex: String,

    pub projects: u32,
    pub internships: u32,
    pub hackathons: u32,
    pub clubs: u32,
    pub cp_level: String,

    pub has_dsa: bool,
    pub has_web: bool,
    pub has_ml: bool,
    pub has_app: bool,
    pub has_cloud: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mba_p: Option<f64>,
}

/// Coerces a snapshot of the form into the wire payload. Total: malformed numbers
/// default to zero, and percentages are not range-checked.
pub fn build(state: &FormState) -> PredictionPayload {
    PredictionPayload {
        ssc_p: coerce_percentage(&state.ssc_p),
        hsc_p: coerce_percentage(&state.hsc_p),
        degree_p: coerce_percentage(&state.degree_p),
        etest_p: coerce_percentage(&state.etest_p),
        workex: state.workex.clone(),

        projects: coerce_count(&state.projects),
        internships: coerce_count(&state.internships),
        hackathons: coerce_count(&state.hackathons),
        clubs: coerce_count(&state.clubs),
        cp_level: state.cp_level.clone(),

        has_dsa: state.has_dsa,
        has_web: state.has_web,
        has_ml: state.has_ml,
        has_app: state.has_app,
        has_cloud: state.has_cloud,

        mba_p: (!state.mba_p.is_empty()).then(|| coerce_percentage(&state.mba_p)),
    }
}

/// Parses a percentage, falling back to 0.0. Non-finite values fall back too,
/// since JSON has no representation for them.
fn coerce_percentage(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parses a non-negative count. Decimal input is truncated the way a number
/// input would; negative or unparseable input becomes 0.
fn coerce_count(raw: &str) -> u32 {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return n;
    }
    match raw.parse::<f64>() {
        Ok(v) if (0.0..=u32::MAX as f64).contains(&v) => v.trunc() as u32,
        _ => 0,
    }
}
