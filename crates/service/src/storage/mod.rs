//! Storage abstractions for service layer
//!
//! `snapshot` reads and writes a whole map as one JSON file; `json_map_store`
//! keeps that map in memory behind a reader/writer lock and persists it on
//! every mutation.

pub mod snapshot;
pub mod json_map_store;
