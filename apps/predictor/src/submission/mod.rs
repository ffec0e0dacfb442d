// Submission lifecycle: the single-flight controller and the pure view over its state.

pub mod controller;
pub mod handlers;
pub mod view;

pub use controller::{SubmissionController, SubmissionState};
pub use view::{render, ResultView};
