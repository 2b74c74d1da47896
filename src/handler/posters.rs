//! Poster handlers: proxy download, local retrieval, upload

use hyper::body::Bytes;
use hyper::StatusCode;
use serde::Serialize;

use super::{parse_id, ApiError, HandlerResult};
use crate::config::AppState;
use crate::http::{self, mime};
use crate::logger;
use crate::multipart::{self, MultipartError, FILE_FIELD};

const POSTER_FAILED: &str = "Failed to fetch the poster.";
const POSTER_UNAVAILABLE: &str = "Poster not available for this IMDb ID.";
const NO_UPLOADED_POSTER: &str = "No uploaded poster for this IMDb ID.";
const READ_FAILED: &str = "Failed to read uploaded poster";
const INVALID_MULTIPART: &str = "Invalid multipart body";
const NO_FILE: &str = "No file uploaded";
const PNG_ONLY: &str = "Only PNG files are supported";
const STORE_FAILED: &str = "Failed to store uploaded poster";
const UPLOADED: &str = "Poster uploaded successfully";

#[derive(Debug, Serialize)]
struct UploadResponse<'a> {
    message: &'a str,
}

/// `GET /posters/{id}`: resolve the OMDb poster URL and relay the image
pub async fn proxy_poster(state: &AppState, raw_id: &str) -> HandlerResult {
    let id = parse_id(raw_id)?;
    let image = state
        .omdb
        .fetch_poster(&id)
        .await
        .map_err(|e| ApiError::from_upstream(&e, POSTER_UNAVAILABLE, POSTER_FAILED))?;
    Ok(http::build_image_response(&image.content_type, image.data))
}

/// `GET /posters/uploaded/{id}`
pub async fn uploaded_poster(state: &AppState, raw_id: &str) -> HandlerResult {
    let id = parse_id(raw_id)?;
    match state.posters.load(&id).await {
        Ok(Some(data)) => Ok(http::build_image_response(mime::PNG, data)),
        Ok(None) => Err(ApiError::not_found(NO_UPLOADED_POSTER)),
        Err(e) => {
            logger::log_error(&e.to_string());
            Err(ApiError::internal(READ_FAILED))
        }
    }
}

/// `POST /posters/add/{id}`: accept a multipart `file` field holding a PNG
///
/// The file type is decided by its magic bytes. The poster is stored as
/// `poster_<id>.png`, replacing an earlier upload for the same id.
pub async fn upload_poster(
    state: &AppState,
    raw_id: &str,
    content_type: Option<&str>,
    body: Bytes,
) -> HandlerResult {
    let id = parse_id(raw_id)?;
    logger::log_debug(&format!("Received poster upload for {id}"));

    let boundary = multipart::boundary_from(content_type).map_err(|e| {
        logger::log_warning(&format!("Upload for {id}: {e}"));
        ApiError::bad_request(INVALID_MULTIPART)
    })?;

    let part = multipart::extract_file_field(body, &boundary, FILE_FIELD)
        .await
        .map_err(|e| {
            logger::log_warning(&format!("Upload for {id}: {e}"));
            match e {
                MultipartError::MissingField(_) => ApiError::bad_request(NO_FILE),
                MultipartError::NotMultipart | MultipartError::Malformed(_) => {
                    ApiError::bad_request(INVALID_MULTIPART)
                }
            }
        })?;

    if !mime::is_png(&part.data) {
        logger::log_warning(&format!(
            "Upload for {id} rejected: {} detected as {} (declared {})",
            part.file_name.as_deref().unwrap_or("<unnamed>"),
            mime::sniff_image_type(&part.data).unwrap_or("unknown"),
            part.content_type.as_deref().unwrap_or("none"),
        ));
        return Err(ApiError::bad_request(PNG_ONLY));
    }

    let path = state.posters.save(&id, &part.data).await.map_err(|e| {
        logger::log_error(&e.to_string());
        ApiError::internal(STORE_FAILED)
    })?;
    logger::log_upload_stored(id.as_str(), &path, part.data.len());

    Ok(http::build_json_response(
        StatusCode::OK,
        &UploadResponse { message: UPLOADED },
    ))
}
