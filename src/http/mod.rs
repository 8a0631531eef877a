//! HTTP wire handling.
//!
//! - **`parser`**: extracts the request line from raw bytes
//! - **`request`**: the parsed request line
//! - **`response`**: the declare-then-render response collector
//! - **`writer`**: writes rendered bytes to the client
//! - **`connection`**: the per-connection state machine
//!
//! # Connection State Machine
//!
//! Each accepted connection is serviced for exactly one request:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← One bounded read
//!        └──────┬──────┘
//!               │ Raw bytes
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← Parse, build environ, call handler, render
//!        └──────┬───────────┘
//!               │ Response bytes (or best-effort 500)
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │ ← Always reached, even on failure
//!        └──────────────────┘
//! ```
//!
//! A malformed request line skips straight to `Closed` without writing.
//! There is no keep-alive: the client learns the response has ended when
//! the connection closes.

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
