//! Core types shared across docassert facilities
//!
//! This crate provides the vocabulary used by both the comparison engine and
//! the error and logging facilities:
//!
//! - **Document formats**: `DocumentFormat`, `DocumentSide`
//! - **Schema constants**: Canonical field keys and event names

pub mod format;
pub mod schema;

pub use format::{DocumentFormat, DocumentSide};
