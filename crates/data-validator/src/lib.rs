//! Coordinate Validation
//!
//! Range checking for latitude/longitude pairs before they are written to the store.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, Validator};
