//! Core library for the badge-export command line application.
//!
//! The export reads the first sheet of a workbook, downloads the photo and QR
//! code of every row, merges rows into fixed-size groups and writes the
//! result as CSV. IO adapters live under [`io`], the row representations in
//! [`model`], media enrichment in [`enrich`], grouping and merging in
//! [`flatten`], and the orchestration in [`pipeline`].

pub mod config;
pub mod enrich;
pub mod error;
pub mod flatten;
pub mod io;
pub mod logging;
pub mod model;
pub mod pipeline;

pub use error::{Result, ToolError};
