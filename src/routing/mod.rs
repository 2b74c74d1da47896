//! Routing module
//!
//! Resolves request paths to gateway endpoints:
//! - Movie metadata and search (OMDb)
//! - Streaming availability
//! - Poster download, upload and local retrieval

mod matcher;

pub use matcher::{match_route, Endpoint, RouteMatch};
