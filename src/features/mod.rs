//! Feature assembly and the ordered feature schema

pub mod assembler;
pub mod schema;

pub use assembler::{assemble, AssembledData};
pub use schema::{FeatureMatrix, FeatureSchema, FEATURE_COLUMNS, PACE_COLUMN, PIT_COLUMN};
