//! Normalization module.
//!
//! - ids: surrogate key sequences and name registries
//! - normalizer: flat rows to the six catalog tables
//! - pipeline: end-to-end run (parse, normalize, write outputs)

pub mod ids;
pub mod normalizer;
pub mod pipeline;

pub use ids::{IdSequence, KeyRegistry};
pub use normalizer::{normalize, split_artists, NormalizeOptions, NormalizeStats};
pub use pipeline::*;
