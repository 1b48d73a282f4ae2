#![warn(clippy::pedantic)]

pub mod builder;

pub use builder::{AnalysisPlacement, FcsBuilder, Layout, HEADER_SIZE, OFFSET_FIELDS};
