use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{AddItemRequest, CreatedEntryResponse},
    services::{daily_log, DailyLog},
};
use crate::{
    form::AddItemForm,
    rejection::{form_rejection, internal, parse_path_date, Rejection},
    state::AppState,
};

pub fn diary_routes() -> Router<AppState> {
    Router::new()
        .route("/diary/:date", get(get_daily_log))
        .route("/diary/:date/meals/:meal_type/entries", post(add_entry))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB, photos travel inline
}

#[instrument(skip(state))]
pub async fn get_daily_log(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailyLog>, Rejection> {
    let date = parse_path_date(&date)?;
    let log = daily_log(state.store.as_ref(), date).await.map_err(internal)?;
    Ok(Json(log))
}

/// POST /diary/:date/meals/:meal_type/entries
/// Submits the add-item form and answers with the refreshed daily log.
#[instrument(skip(state, body))]
pub async fn add_entry(
    State(state): State<AppState>,
    Path((date, meal_type)): Path<(String, String)>,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, HeaderMap, Json<CreatedEntryResponse>), Rejection> {
    let date = parse_path_date(&date)?;
    let form = AddItemForm::new(date, meal_type, state.store.clone());
    let form_state = body.into_form_state();

    let mut dismissed = false;
    let entry = form
        .submit(&form_state, || dismissed = true)
        .await
        .map_err(form_rejection)?;

    let refreshed = if dismissed {
        Some(daily_log(state.store.as_ref(), date).await.map_err(internal)?)
    } else {
        None
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        LOCATION,
        HeaderValue::from_str(&format!("/api/v1/entries/{}", entry.id)).map_err(internal)?,
    );

    Ok((
        StatusCode::CREATED,
        headers,
        Json(CreatedEntryResponse {
            entry,
            daily_log: refreshed,
        }),
    ))
}
