//! Source file reading and generated file writing

mod output;
mod processor;

use crate::config::compile_time::file_processing::{LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT};
use crate::logging::codes;
use crate::log_debug;
use std::path::Path;

pub use output::{OutputError, OutputLayout};
pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

pub const DEFAULT_SOURCE_EXTENSION: &str = "pyzh";
pub const DEFAULT_TARGET_EXTENSION: &str = "py";
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "生成";

/// Read a source file with default settings
pub fn process_file(path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(path)
}

pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

pub fn get_large_file_threshold() -> u64 {
    LARGE_FILE_THRESHOLD
}

/// Check that every file and output error code is registered
pub fn init_file_processor_logging() -> Result<(), String> {
    let registered = [
        codes::file_processing::FILE_NOT_FOUND,
        codes::file_processing::INVALID_EXTENSION,
        codes::file_processing::FILE_TOO_LARGE,
        codes::file_processing::PERMISSION_DENIED,
        codes::file_processing::INVALID_ENCODING,
        codes::file_processing::IO_ERROR,
        codes::file_processing::INVALID_PATH,
        codes::file_processing::TOO_MANY_LINES,
        codes::output::OUTPUT_PATH_INVALID,
        codes::output::OUTPUT_DIRECTORY_FAILURE,
        codes::output::OUTPUT_WRITE_FAILURE,
    ];

    for code in &registered {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "File processor error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("File processor compile-time configuration loaded",
        "max_file_size" => MAX_FILE_SIZE,
        "large_file_threshold" => LARGE_FILE_THRESHOLD,
        "max_line_count" => MAX_LINE_COUNT
    );

    Ok(())
}
