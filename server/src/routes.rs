use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    battle,
    error::AppError,
    state::AppState,
    utils::{parse_or, parse_required, sanitize_query},
};

const DEFAULT_RADIUS_METERS: u32 = 1000;
const DEFAULT_PHOTO_WIDTH: u32 = 400;

const DETAIL_FIELDS: &[&str] = &[
    "place_id",
    "name",
    "vicinity",
    "rating",
    "user_ratings_total",
    "price_level",
    "photos",
    "geometry",
    "opening_hours",
];

#[derive(Deserialize)]
pub struct NearbyParams {
    session_id: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    radius: Option<String>,
}

#[derive(Deserialize)]
pub struct SessionPayload {
    session_id: Option<String>,
}

#[derive(Deserialize)]
pub struct PhotoParams {
    photo_reference: Option<String>,
    max_width: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    query: Option<String>,
}

#[derive(Deserialize)]
pub struct DetailsParams {
    place_id: Option<String>,
}

pub async fn nearby_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyParams>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = params
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or(AppError::Validation("Missing required parameters"))?;
    let latitude: f64 = parse_required(params.latitude)?;
    let longitude: f64 = parse_required(params.longitude)?;
    let radius = parse_or(params.radius, DEFAULT_RADIUS_METERS)?;

    let restaurants =
        battle::get_or_create_view(&state, &session_id, latitude, longitude, radius).await?;

    Ok(Json(json!({ "restaurants": restaurants })))
}

pub async fn next_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SessionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = payload
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or(AppError::Validation("Missing session_id"))?;

    let advanced = battle::advance(&state, &session_id)?;

    Ok(Json(json!({
        "restaurant": advanced.restaurant,
        "remaining_count": advanced.remaining_count,
    })))
}

pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SessionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = payload
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or(AppError::Validation("Missing session ID"))?;

    battle::reset(&state, &session_id);

    Ok(Json(json!({
        "success": true,
        "message": "Session reset successfully",
    })))
}

pub async fn photo_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PhotoParams>,
) -> Result<Response, AppError> {
    let reference = params
        .photo_reference
        .filter(|r| !r.is_empty())
        .ok_or(AppError::Validation("Missing photo reference"))?;
    let max_width = parse_or(params.max_width, DEFAULT_PHOTO_WIDTH)?;

    let photo = state.places.fetch_photo(&reference, max_width).await?;

    let status = StatusCode::from_u16(photo.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = (status, photo.bytes).into_response();
    if let Some(content_type) = photo.content_type.and_then(|value| value.parse().ok()) {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }

    Ok(response)
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = sanitize_query(&params.query.unwrap_or_default());
    if query.is_empty() {
        return Err(AppError::Validation("Missing search query"));
    }

    let results = state.places.search_by_text(&query).await?;

    Ok(Json(json!({ "results": results })))
}

pub async fn details_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DetailsParams>,
) -> Result<impl IntoResponse, AppError> {
    let place_id = params
        .place_id
        .filter(|id| !id.is_empty())
        .ok_or(AppError::Validation("Missing place_id"))?;

    let restaurant = state.places.lookup_details(&place_id, DETAIL_FIELDS).await?;

    Ok(Json(json!({ "restaurant": restaurant })))
}
