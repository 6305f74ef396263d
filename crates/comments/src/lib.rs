//! Comment board client library.
//!
//! A typed wrapper over the threaded-comment backend plus the board
//! component that owns pagination, sort and search state, reloads the
//! visible page after every mutation, and renders the loaded tree as
//! indented text.

pub mod api;
pub mod board;
pub mod query;
pub mod render;
pub mod tree;
