//! Movie metadata and streaming availability handlers

use hyper::StatusCode;

use super::{parse_id, ApiError, HandlerResult};
use crate::config::AppState;
use crate::http;
use crate::model;

const MOVIE_DATA_FAILED: &str = "Failed to fetch movie data";
const REVIEWS_FAILED: &str = "Failed to fetch movie reviews";
const STREAMING_FAILED: &str = "Failed to fetch streaming availability";
const MOVIE_NOT_FOUND: &str = "Movie not found";
const MISSING_TITLE: &str = "Missing movie title";

fn parse_title(raw: &str) -> Result<String, ApiError> {
    model::decode_title(raw).ok_or(ApiError::bad_request(MISSING_TITLE))
}

/// `GET /movies/search/{title}`
pub async fn search_movies(state: &AppState, raw_title: &str) -> HandlerResult {
    let title = parse_title(raw_title)?;
    let body = state
        .omdb
        .search(&title)
        .await
        .map_err(|e| ApiError::from_upstream(&e, MOVIE_NOT_FOUND, MOVIE_DATA_FAILED))?;
    Ok(http::build_json_bytes_response(StatusCode::OK, body))
}

/// `GET /movies/data/{id}`
pub async fn movie_data(state: &AppState, raw_id: &str) -> HandlerResult {
    let id = parse_id(raw_id)?;
    let body = state
        .omdb
        .lookup(&id)
        .await
        .map_err(|e| ApiError::from_upstream(&e, MOVIE_NOT_FOUND, MOVIE_DATA_FAILED))?;
    Ok(http::build_json_bytes_response(StatusCode::OK, body))
}

/// `GET /movies/reviews/{id}`
pub async fn movie_reviews(state: &AppState, raw_id: &str) -> HandlerResult {
    let id = parse_id(raw_id)?;
    let reviews = state
        .omdb
        .reviews(&id)
        .await
        .map_err(|e| ApiError::from_upstream(&e, MOVIE_NOT_FOUND, REVIEWS_FAILED))?;
    Ok(http::build_json_response(StatusCode::OK, &reviews))
}

/// `GET /movies/streaming/{id}`
pub async fn streaming_by_id(state: &AppState, raw_id: &str) -> HandlerResult {
    let id = parse_id(raw_id)?;
    let body = state
        .streaming
        .by_id(&id)
        .await
        .map_err(|e| ApiError::from_upstream(&e, MOVIE_NOT_FOUND, STREAMING_FAILED))?;
    Ok(http::build_json_bytes_response(StatusCode::OK, body))
}

/// `GET /streaming/search/{title}`
pub async fn streaming_search(state: &AppState, raw_title: &str) -> HandlerResult {
    let title = parse_title(raw_title)?;
    let body = state
        .streaming
        .search(&title)
        .await
        .map_err(|e| ApiError::from_upstream(&e, MOVIE_NOT_FOUND, STREAMING_FAILED))?;
    Ok(http::build_json_bytes_response(StatusCode::OK, body))
}
