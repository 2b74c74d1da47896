//! HTTP protocol layer module
//!
//! Response builders and content sniffing shared by all handlers.

pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    apply_common_headers, build_405_response, build_413_response, build_error_response,
    build_health_response, build_image_response, build_json_bytes_response, build_json_response,
    build_options_response,
};
