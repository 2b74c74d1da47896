//! Multipart upload extraction
//!
//! The upload body is buffered (bounded by `http.max_body_size`) before it gets
//! here, so parsing runs over a single in-memory chunk.

use std::convert::Infallible;

use futures_util::stream;
use hyper::body::Bytes;

/// Form field carrying the poster
pub const FILE_FIELD: &str = "file";

#[derive(Debug, thiserror::Error)]
pub enum MultipartError {
    #[error("request is not multipart/form-data")]
    NotMultipart,
    #[error("malformed multipart body: {0}")]
    Malformed(#[from] multer::Error),
    #[error("no '{0}' field in upload")]
    MissingField(String),
}

/// A file field read from the form
#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Boundary from a `Content-Type: multipart/form-data; boundary=...` header
pub fn boundary_from(content_type: Option<&str>) -> Result<String, MultipartError> {
    let content_type = content_type.ok_or(MultipartError::NotMultipart)?;
    multer::parse_boundary(content_type).map_err(|_| MultipartError::NotMultipart)
}

/// Find `field_name` in the form and return its contents
///
/// Other fields are skipped, and so are empty parts, which is what a form
/// submitted without choosing a file sends. The first non-empty part wins.
pub async fn extract_file_field(
    body: Bytes,
    boundary: &str,
    field_name: &str,
) -> Result<FilePart, MultipartError> {
    let chunks = stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(chunks, boundary);

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }

        let file_name = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let data = field.bytes().await?;

        if data.is_empty() {
            continue;
        }

        return Ok(FilePart {
            file_name,
            content_type,
            data,
        });
    }

    Err(MultipartError::MissingField(field_name.to_string()))
}
