//! Add-item form: transient state, validation and submission.

pub mod controller;
pub mod error;
pub mod state;

pub use controller::AddItemForm;
pub use error::FormError;
pub use state::{FocusedField, FormState};
