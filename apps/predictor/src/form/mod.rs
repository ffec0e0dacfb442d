// Form input lifecycle: raw field edits and their coercion into the wire payload.
// Both halves are synchronous and never fail on user input.

pub mod payload;
pub mod state;

pub use payload::{build, PredictionPayload};
pub use state::{CpLevel, FieldInput, FormField, FormState, WorkExperience};
