//! Request handler module
//!
//! Route dispatch plus the movie, streaming and poster handlers.

pub mod movies;
pub mod posters;
pub mod router;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::http;
use crate::logger;
use crate::model::MovieId;
use crate::upstream::UpstreamError;

// Re-export main entry point
pub use router::{dispatch, handle_request};

pub const INVALID_ID: &str = "Invalid IMDb ID format. Must be like tt1234567.";

/// Handler result; the error side is already a client-facing status + message
pub type HandlerResult = Result<Response<Full<Bytes>>, ApiError>;

/// Client-facing failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: &'static str,
}

impl ApiError {
    pub const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    pub const fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub const fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub const fn internal(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map an upstream failure: "nothing there" is a 404, everything else a 500
    pub fn from_upstream(
        err: &UpstreamError,
        not_found: &'static str,
        failed: &'static str,
    ) -> Self {
        if err.is_not_found() {
            logger::log_debug(&err.to_string());
            Self::not_found(not_found)
        } else {
            logger::log_error(&err.to_string());
            Self::internal(failed)
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        http::build_error_response(self.status, self.message)
    }
}

/// Validate a raw path parameter as a movie id
pub fn parse_id(raw: &str) -> Result<MovieId, ApiError> {
    raw.parse().map_err(|e| {
        logger::log_warning(&format!("Rejected movie id: {e}"));
        ApiError::bad_request(INVALID_ID)
    })
}
