//! docbatch - batch document migration for Firestore-style stores
//!
//! This crate provides the core functionality for the `docbatch` CLI tool:
//! bulk read, write, update and delete against a cloud document store,
//! with a portable JSON/JSONL representation of the store's native types.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - The value union, records, and the wrapper-key protocol
//! - [`codec`] - Native values ⇄ portable JSON
//! - [`format`] - Input format detection and parsing (JSON / JSONL)
//! - [`path`] - Collection/document path resolution
//! - [`query`] - Filter condition parsing
//! - [`store`] - The document store seam (Firestore REST, in-memory)
//! - [`pipeline`] - Batched read/write/update/delete drivers
//! - [`validate`] - Per-record validation hook
//! - [`config`] - Backend and credential resolution
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod path;
pub mod pipeline;
pub mod query;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
