//! Shared domain plumbing for the kiosk clients.
//!
//! Holds the pieces both backend clients need: the common error type,
//! shared type aliases, and the text validation gate applied before any
//! user-entered text reaches the wire.

pub mod error;
pub mod text;
pub mod types;
