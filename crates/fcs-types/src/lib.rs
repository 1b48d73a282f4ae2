#![warn(clippy::pedantic)]

pub mod error;
pub mod enums;
pub mod keywords;
pub mod segment;
pub mod matrix;

pub use enums::{DataFormat, GroupBy, TextEncoding};
pub use error::TypeError;
pub use matrix::DataMatrix;
pub use segment::Segment;
