//! SQL script generation.
//!
//! - schema: static table definitions and DDL
//! - writer: literal encoding, INSERT statements, full script

pub mod schema;
pub mod writer;

pub use schema::{schema_ddl, TableSchema, ALL_TABLES};
pub use writer::{insert_statement, render_script, write_script, SqlRow, SqlValue};
