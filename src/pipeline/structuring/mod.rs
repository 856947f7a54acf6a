pub mod circuit;
pub mod heuristic;
pub mod mapper;
pub mod parser;
pub mod prompt;
pub mod render;

pub use circuit::*;
pub use heuristic::*;
pub use mapper::*;
pub use parser::*;
pub use prompt::*;
pub use render::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuringError {
    /// The model ignored the output contract.
    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),

    /// A required field is missing; nothing is persisted.
    #[error("Validation failed: {0}")]
    Validation(String),
}
