//! Signal Validation
//!
//! Rejects unusable landmark ratios (NaN, infinite, negative or implausibly
//! large) before they reach the fatigue estimator.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{SignalValidator, ValidationConfig};
