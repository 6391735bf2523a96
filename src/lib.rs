//! A minimal pre-threaded HTTP/1.1 server for static files.
//!
//! Requests flow `server` -> `http::parse` -> `handler::StaticFiles` ->
//! `http::Response::to_bytes`, one request per connection.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod middleware;
pub mod server;
pub mod service;

pub use config::{Args, ServerConfig};
pub use error::{Error, Result};
pub use handler::StaticFiles;
pub use server::Server;
