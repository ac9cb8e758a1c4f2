//! Shared domain types for the capacity booking pipeline

pub mod capacity;
pub mod error;
pub mod form;
pub mod lead;

pub use capacity::{CapacityConfig, Quote};
pub use error::{Error, Result};
pub use form::{FormCheck, FormField, FormState, LeadForm, SubmitAction};
pub use lead::{LeadSubmission, Violation};
