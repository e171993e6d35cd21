//! Ingestion, validation and train/test split for the student dropout
//! dataset.
//!
//! The raw export is read by [`data::loader`], checked by the three
//! validators in [`validate`], and split by [`data::split`].
//! [`pipeline::run`] wires the steps together.

pub mod data;
pub mod error;
pub mod pipeline;
pub mod validate;

pub use data::model::{Dataset, Value};
pub use error::ValidationError;
