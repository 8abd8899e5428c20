//! mws - a minimal HTTP/1.0 static file server.
//!
//! Serves GET and HEAD for files under a single document root, one request
//! per connection.

pub mod config;
pub mod files;
pub mod http;
pub mod server;
