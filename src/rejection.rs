use axum::http::StatusCode;
use time::Date;
use tracing::{error, warn};

use crate::{dates::parse_date, form::FormError};

pub type Rejection = (StatusCode, String);

pub fn internal<E: std::fmt::Display>(e: E) -> Rejection {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

pub fn not_found(what: &str) -> Rejection {
    (StatusCode::NOT_FOUND, format!("{what} not found"))
}

pub fn parse_path_date(raw: &str) -> Result<Date, Rejection> {
    parse_date(raw).map_err(|e| {
        warn!(error = %e, date = raw, "invalid diary date");
        (StatusCode::BAD_REQUEST, format!("invalid date {raw:?}, expected YYYY-MM-DD"))
    })
}

/// Every rejected submission is reported; nothing fails silently.
pub fn form_rejection(e: FormError) -> Rejection {
    let status = match &e {
        FormError::EmptyName => StatusCode::BAD_REQUEST,
        FormError::InvalidNutrientValue { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        FormError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}
