//! Data layer: core types, ingestion, and the train/test split.
//!
//! Architecture:
//! ```text
//!  raw data.csv (';'-delimited)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file, clean header → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Dataset  │  named columns, rows of Value
//!   └──────────┘
//!        │   (validated by crate::validate)
//!        ▼
//!   ┌──────────┐
//!   │  split    │  seeded shuffle → train / test
//!   └──────────┘
//! ```

pub mod loader;
pub mod model;
pub mod sample;
pub mod split;
