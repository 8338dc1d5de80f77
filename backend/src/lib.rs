//! # trackdb - flat music catalog to relational tables
//!
//! trackdb takes a denormalized track export (one row per track, artists
//! packed into one delimited field) and produces six normalized tables plus
//! an idempotent SQL load script.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  Flat CSV   │────▶│   Parser    │────▶│  Normalizer  │──┬─▶│  6 × CSV    │
//! │ (one/track) │     │ (auto-enc)  │     │  (ids+links) │  │  └─────────────┘
//! └─────────────┘     └─────────────┘     └──────────────┘  │  ┌─────────────┐
//!                                                           └─▶│  SQL script │
//!                                                              └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trackdb::{normalize_file, RunOptions};
//!
//! let summary = normalize_file(&RunOptions::new("dataset.csv", "out")).unwrap();
//! println!("{} artists", summary.counts.artists);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Source row, entity rows, [`Catalog`]
//! - [`parser`] - Source CSV reading with auto-detection
//! - [`transform`] - Id generation, normalization, pipeline
//! - [`sql`] - Schema DDL and INSERT generation
//! - [`export`] - CSV export of the normalized tables
//! - [`logs`] - Run log

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Normalization
pub mod transform;

// Output
pub mod export;
pub mod sql;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{CsvError, EmitError, PipelineError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Album, AlbumArtist, Artist, AudioFeatures, Catalog, SourceRow, TableCounts, Track,
    TrackArtist,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_source_bytes, parse_source_file,
    ParseResult,
};

// =============================================================================
// Re-exports - Normalization
// =============================================================================

pub use transform::{normalize, NormalizeOptions, NormalizeStats};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    normalize_bytes, normalize_file, write_sql_file, RunOptions, RunSummary, DEFAULT_SQL_FILE,
};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use export::{write_table, write_tables};
pub use sql::{render_script, schema_ddl, write_script};
