use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{EntriesQuery, FavoriteRequest},
    store::NutritionEntry,
};
use crate::{
    lookup, photos,
    rejection::{internal, not_found, Rejection},
    state::AppState,
};

pub fn entries_routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(list_entries))
        .route("/entries/:id", get(get_entry))
        .route("/entries/:id/favorite", put(set_favorite))
        .route("/entries/:id/photo", get(get_entry_photo))
}

/// GET /entries?name=ap&favorites=false
#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    Query(q): Query<EntriesQuery>,
) -> Result<Json<Vec<NutritionEntry>>, Rejection> {
    let entries = lookup::query(state.store.as_ref(), &q.name, q.favorites)
        .await
        .map_err(internal)?;
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NutritionEntry>, Rejection> {
    match state.store.get_entry(id).await.map_err(internal)? {
        Some(entry) => Ok(Json(entry)),
        None => Err(not_found("entry")),
    }
}

#[instrument(skip(state))]
pub async fn set_favorite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<FavoriteRequest>,
) -> Result<Json<NutritionEntry>, Rejection> {
    let entry = state
        .store
        .set_favorite(id, body.favorite)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("entry"))?;
    info!(%id, favorite = body.favorite, "favorite updated");
    Ok(Json(entry))
}

/// 307 temporary redirect to a presigned url of the entry's photo.
#[instrument(skip(state))]
pub async fn get_entry_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, Rejection> {
    let entry = state
        .store
        .get_entry(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("entry"))?;
    let Some(key) = entry.photo_key else {
        return Err(not_found("photo"));
    };

    let url = photos::presign_meal_photo(
        state.storage.as_ref(),
        &key,
        state.config.photo_link_ttl_secs,
    )
    .await
    .map_err(internal)?;
    Ok(Redirect::temporary(&url))
}
