use crate::file_processor::{FileProcessorError, OutputError};
use crate::lexical::LexerError;
use crate::logging::Code;
use crate::utils::Position;

/// Failure of one file at any pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Output failed: {0}")]
    Output(#[from] OutputError),
}

impl PipelineError {
    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::FileProcessing(e) => e.error_code(),
            PipelineError::LexicalAnalysis(e) => e.error_code(),
            PipelineError::Output(e) => e.error_code(),
        }
    }

    /// Source position for lexical failures
    pub fn position(&self) -> Option<Position> {
        match self {
            PipelineError::LexicalAnalysis(e) => e.position(),
            _ => None,
        }
    }

    /// The error without its stage prefix
    pub fn detail(&self) -> String {
        match self {
            PipelineError::FileProcessing(e) => e.to_string(),
            PipelineError::LexicalAnalysis(e) => e.to_string(),
            PipelineError::Output(e) => e.to_string(),
        }
    }
}
