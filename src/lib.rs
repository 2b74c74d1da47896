//! Movie gateway
//!
//! HTTP gateway in front of the OMDb metadata API and the RapidAPI streaming
//! availability API, with a local store for uploaded PNG posters.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod model;
pub mod multipart;
pub mod routing;
pub mod server;
pub mod storage;
pub mod upstream;
