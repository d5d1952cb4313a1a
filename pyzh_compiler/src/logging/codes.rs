//! Error and success codes with their classification metadata
//!
//! Every code the translator emits is declared here together with its
//! category, severity and a suggested action.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Code wrapper shared by error and success events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Metadata attached to an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Keyword table loading
pub mod configuration {
    use super::Code;

    pub const KEYWORD_TABLE_UNREADABLE: Code = Code::new("E001");
    pub const KEYWORD_TABLE_INVALID: Code = Code::new("E002");
    pub const INVALID_KEYWORD_ENTRY: Code = Code::new("E003");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

pub mod lexical {
    use super::Code;

    pub const LEXICAL_FAILURE: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const UNTERMINATED_CONTINUATION: Code = Code::new("E022");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

/// Writing generated files
pub mod output {
    use super::Code;

    pub const OUTPUT_PATH_INVALID: Code = Code::new("E060");
    pub const OUTPUT_DIRECTORY_FAILURE: Code = Code::new("E061");
    pub const OUTPUT_WRITE_FAILURE: Code = Code::new("E062");
}

pub mod batch {
    use super::Code;

    pub const DIRECTORY_NOT_FOUND: Code = Code::new("E070");
    pub const NO_FILES_FOUND: Code = Code::new("E071");
    pub const TOO_MANY_FILES: Code = Code::new("E072");
    pub const WORKER_FAILURE: Code = Code::new("E073");
}

pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const KEYWORD_TABLE_LOADED: Code = Code::new("I010");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const MULTILINE_STRING_COLLECTED: Code = Code::new("I021");
    pub const TRANSLATION_COMPLETE: Code = Code::new("I030");
    pub const OUTPUT_WRITTEN: Code = Code::new("I040");
    pub const BATCH_COMPLETE: Code = Code::new("I050");
}

// (code, category, severity, recoverable, requires_halt, description, action)
type Entry = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

const ERROR_TABLE: &[Entry] = &[
    ("ERR001", "System", Severity::Critical, false, true,
        "Internal translator error",
        "File a bug report with the input that triggered it"),
    ("ERR002", "System", Severity::Critical, false, true,
        "Logging or configuration initialization failed",
        "Check PYZH_* environment variables"),
    ("E001", "Configuration", Severity::High, false, true,
        "Keyword table file could not be read",
        "Check the path passed with --keywords or PYZH_KEYWORD_TABLE"),
    ("E002", "Configuration", Severity::High, false, true,
        "Keyword table is not valid TOML",
        "Fix the TOML syntax; entries belong under a [keywords] table"),
    ("E003", "Configuration", Severity::High, false, true,
        "Keyword table entry is not a single identifier mapping",
        "Keys must be identifier-shaped and values non-empty"),
    ("E005", "FileProcessing", Severity::Medium, false, true,
        "Source file not found",
        "Check the file path"),
    ("E006", "FileProcessing", Severity::Low, true, false,
        "Source file has the wrong extension",
        "Rename the file with the dialect extension"),
    ("E007", "FileProcessing", Severity::Medium, false, true,
        "Source file exceeds the maximum size",
        "Split the file or rebuild with a larger limit profile"),
    ("E009", "FileProcessing", Severity::Medium, false, true,
        "Permission denied reading the source file",
        "Check file permissions"),
    ("E010", "FileProcessing", Severity::Medium, false, true,
        "Source file is not valid UTF-8",
        "Re-encode the file as UTF-8"),
    ("E011", "FileProcessing", Severity::Medium, false, true,
        "I/O error while reading the source file",
        "Check the filesystem and retry"),
    ("E012", "FileProcessing", Severity::Medium, false, true,
        "Path is not a regular file",
        "Pass a file or a project directory"),
    ("E013", "FileProcessing", Severity::Medium, false, true,
        "Source file has too many lines",
        "Split the file or rebuild with a larger limit profile"),
    ("E020", "Lexical", Severity::High, false, true,
        "No token rule matches the input at this position",
        "Remove or quote the offending character"),
    ("E021", "Lexical", Severity::High, false, true,
        "Triple-quoted string is never closed",
        "Add the matching closing delimiter"),
    ("E022", "Lexical", Severity::High, false, true,
        "Line continuation at end of input",
        "Remove the trailing backslash or add the continued line"),
    ("E027", "Lexical", Severity::High, false, true,
        "Token count exceeds the configured ceiling",
        "Split the file or rebuild with a larger limit profile"),
    ("E060", "Output", Severity::High, false, true,
        "Input path is outside the project root",
        "Run the translator from the project root"),
    ("E061", "Output", Severity::High, false, true,
        "Output directory could not be created",
        "Check permissions on the output location"),
    ("E062", "Output", Severity::High, false, true,
        "Generated file could not be written",
        "Check permissions and free space on the output location"),
    ("E070", "Batch", Severity::High, false, true,
        "Project directory not found",
        "Check the directory path"),
    ("E071", "Batch", Severity::Low, true, false,
        "No dialect source files found",
        "Check the directory and the source extension"),
    ("E072", "Batch", Severity::Medium, false, true,
        "Too many source files for one batch",
        "Pass --max-files or translate subdirectories separately"),
    ("E073", "Batch", Severity::High, false, true,
        "A worker thread failed",
        "Re-run with --sequential to isolate the failing file"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        ERROR_TABLE
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Category of a code; success codes (`I...`) report "Success".
pub fn get_category(code: &str) -> &'static str {
    match get_error_metadata(code) {
        Some(metadata) => metadata.category,
        None if code.starts_with('I') => "Success",
        None => "Unknown",
    }
}
