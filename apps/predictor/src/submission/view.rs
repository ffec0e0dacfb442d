use serde::Serialize;

use crate::predictor_client::PredictionResult;
use crate::submission::controller::SubmissionState;

pub const PLACEHOLDER_PROMPT: &str = "Fill the form and click predict to see your result.";

const MISSING: &str = "n/a";

/// Everything the result panel displays for one SubmissionState.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResultView {
    pub error: Option<String>,
    pub body: ResultBody,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultBody {
    Placeholder { prompt: &'static str },
    Prediction(PredictionSummary),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictionSummary {
    /// e.g. "78% (high chance)"
    pub probability: String,
    /// e.g. "4 – 6 LPA"
    pub salary_lpa: String,
    /// e.g. "Approx. ₹4,00,000 – ₹6,00,000 per year"
    pub salary_inr: String,
    /// Server order.
    pub suggestions: Vec<String>,
}

pub fn render(state: &SubmissionState) -> ResultView {
    let body = match state.result() {
        Some(result) => ResultBody::Prediction(summarize(result)),
        None => ResultBody::Placeholder {
            prompt: PLACEHOLDER_PROMPT,
        },
    };
    ResultView {
        error: state.error_message().map(str::to_string),
        body,
    }
}

fn summarize(result: &PredictionResult) -> PredictionSummary {
    PredictionSummary {
        probability: format!(
            "{}% ({} chance)",
            display_number(result.placement_probability),
            result.level.as_deref().unwrap_or(MISSING)
        ),
        salary_lpa: format!(
            "{} – {} LPA",
            display_number(result.expected_salary_min_lpa),
            display_number(result.expected_salary_max_lpa)
        ),
        salary_inr: format!(
            "Approx. ₹{} – ₹{} per year",
            display_inr(result.expected_salary_min_inr),
            display_inr(result.expected_salary_max_inr)
        ),
        suggestions: result.suggestions.clone(),
    }
}

fn display_number(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

fn display_inr(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), format_en_in)
}

/// Formats a number with en-IN grouping: the last three integer digits, then
/// pairs (1,23,45,678). Keeps at most three fraction digits, trailing zeros trimmed.
pub fn format_en_in(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.3}", value.abs());
    let (int_digits, frac_digits) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_digits = frac_digits.trim_end_matches('0');

    let grouped = group_indian(int_digits);
    let is_zero = int_digits.bytes().all(|b| b == b'0') && frac_digits.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac_digits.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_digits}")
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut pairs = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        pairs.push(pair);
        rest = front;
    }
    pairs.push(rest);
    pairs.reverse();

    format!("{},{}", pairs.join(","), tail)
}
