//! Bounded, UTF-8 checked reading of source, grammar and token files

mod processor;

pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};
