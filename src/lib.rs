//! Renders live election results into static JSON snapshots: national
//! balance of power, poll-closing "big boards", and per-state and
//! per-county detail files.

pub mod bop;
pub mod candidate;
pub mod collate;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod render;
pub mod resolver;
pub mod select;
pub mod serialize;
pub mod staleness;

#[cfg(test)]
mod testing;

pub use config::{Environment, FailurePolicy, RenderConfig};
pub use db::{MemoryStore, ResultStore, SqliteStore};
pub use error::RenderError;
pub use render::Renderer;
