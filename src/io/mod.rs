//! File input and output.

pub mod reader;
pub mod writer;

pub use reader::{InputFile, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
