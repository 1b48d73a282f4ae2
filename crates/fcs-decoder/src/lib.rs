#![warn(clippy::pedantic)]

pub mod config;
pub mod decoder;
pub mod document;
pub mod error;
pub mod plan;
pub mod streaming;

mod matrix_reader;

pub use config::{DecodeOptions, Skip};
pub use decoder::FcsDecoder;
pub use document::Document;
pub use error::{DecodeError, StreamFailure};
pub use plan::DecodePlan;
pub use streaming::{Progress, StreamingDecoder, decode_reader};
