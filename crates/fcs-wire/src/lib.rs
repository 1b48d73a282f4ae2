#![warn(clippy::pedantic)]

pub mod element;
pub mod error;
pub mod header;

pub use element::{ByteOrder, ElementKind};
pub use error::WireError;
pub use header::{FcsHeader, HEADER_SIZE};
