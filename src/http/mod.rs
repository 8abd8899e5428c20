//! HTTP/1.0 protocol handling.
//!
//! One request line per connection; headers sent by the client are never
//! read.
//!
//! # Architecture
//!
//! - **`line`**: reads a single CRLF-terminated line off the stream
//! - **`parser`**: classifies the line into method and target
//! - **`request`**: the parsed request
//! - **`response`**: status codes and response shapes
//! - **`writer`**: serializes responses and streams file bodies
//! - **`connection`**: the per-connection state machine
//!
//! # Connection State Machine
//!
//! ```text
//!   Accepted ──line──▶ LineRead ──parse──▶ Parsed ──resolve──▶ Resolved
//!      │                  │                                       │
//!      │ too long         │ unknown method / bad target           │ 200 / 404
//!      ├──────────────────┴──────────────▶ Writing ◀──────────────┘
//!      │                  │                   │
//!      │ closed/timeout   │ not HTTP          ▼
//!      └──────────────────┴──────────────▶ Closed ◀── Responded
//! ```
//!
//! Every path ends in `Closed`, after which the socket is shut down.

pub mod connection;
pub mod line;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
