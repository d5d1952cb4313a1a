// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Read and parse an environment variable, falling back to `default` when
/// it is unset or unparsable.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Reject inputs that do not carry the dialect source extension
    pub require_source_extension: bool,

    /// Whether to log timing for each file read
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_source_extension: env_or(env_vars::REQUIRE_SOURCE_EXTENSION, true),
            enable_performance_logging: env_or(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPreferences {
    /// Whether to collect per-category token counts
    pub collect_detailed_metrics: bool,

    /// Whether to log each collected multi-line string
    pub log_multiline_strings: bool,

    /// Whether to show position information in error messages
    pub include_position_in_errors: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_or(env_vars::LEXICAL_DETAILED_METRICS, true),
            log_multiline_strings: env_or(env_vars::LEXICAL_LOG_MULTILINE, false),
            include_position_in_errors: env_or(env_vars::LEXICAL_INCLUDE_POSITIONS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationPreferences {
    /// Extension (without dot) of dialect source files
    pub source_extension: String,

    /// Extension (without dot) of generated files
    pub target_extension: String,

    /// Name of the output directory created under the project root
    pub output_dir_name: String,

    /// Module imported by the preamble of every generated file
    pub runtime_module: String,

    /// Optional keyword table replacing or extending the built-in one
    pub keyword_table_path: Option<PathBuf>,
}

impl Default for TranslationPreferences {
    fn default() -> Self {
        Self {
            source_extension: env_or(env_vars::SOURCE_EXTENSION, "pyzh".to_string()),
            target_extension: env_or(env_vars::TARGET_EXTENSION, "py".to_string()),
            output_dir_name: env_or(env_vars::OUTPUT_DIR_NAME, "生成".to_string()),
            runtime_module: env_or(env_vars::RUNTIME_MODULE, "python内建函数".to_string()),
            keyword_table_path: env::var_os(env_vars::KEYWORD_TABLE).map(PathBuf::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to emit JSON lines instead of plain text
    pub use_structured_logging: bool,

    /// Whether to echo non-error events to the console
    pub enable_console_logging: bool,

    pub min_log_level: LogLevel,

    /// Whether to include timing events in logs
    pub log_performance_events: bool,

    /// Whether to print the cargo-style error summary
    pub enable_cargo_style_output: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env_or(env_vars::LOGGING_LOG_PERFORMANCE, true),
            enable_cargo_style_output: env_or(env_vars::LOGGING_CARGO_STYLE, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub translation: TranslationPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Snapshot of the current environment
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File processor
    pub const REQUIRE_SOURCE_EXTENSION: &str = "PYZH_REQUIRE_SOURCE_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "PYZH_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "PYZH_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_LOG_MULTILINE: &str = "PYZH_LEXICAL_LOG_MULTILINE";
    pub const LEXICAL_INCLUDE_POSITIONS: &str = "PYZH_LEXICAL_INCLUDE_POSITIONS";

    // Translation
    pub const SOURCE_EXTENSION: &str = "PYZH_SOURCE_EXTENSION";
    pub const TARGET_EXTENSION: &str = "PYZH_TARGET_EXTENSION";
    pub const OUTPUT_DIR_NAME: &str = "PYZH_OUTPUT_DIR";
    pub const RUNTIME_MODULE: &str = "PYZH_RUNTIME_MODULE";
    pub const KEYWORD_TABLE: &str = "PYZH_KEYWORD_TABLE";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "PYZH_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "PYZH_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "PYZH_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "PYZH_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_CARGO_STYLE: &str = "PYZH_LOGGING_CARGO_STYLE";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_env_or_falls_back_on_unset_variable() {
        let value: usize = env_or("PYZH_TEST_UNSET_VARIABLE_FOR_DEFAULTS", 7);
        assert_eq!(value, 7);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Info < LogLevel::Debug);
    }
}
