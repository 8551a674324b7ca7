// Internal modules
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use grammar::{compile, CompiledGrammar, GrammarError};
pub use lexical::{tokenize, LexerError};
pub use pipeline::{process_files, PipelineError, PipelineResult};
pub use syntax::{LL1Parser, SyntaxError};

pub use pipeline::output::PipelineOutput;
