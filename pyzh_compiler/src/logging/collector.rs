//! Per-file event collection with cargo-style reporting

use super::codes;
use super::events::LogEvent;
use crate::config::compile_time::logging::MAX_LOG_EVENTS_PER_FILE;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// The file a thread is currently translating
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Thread-safe collector of error and warning events, grouped by file
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    seen_files: Mutex<BTreeSet<PathBuf>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            seen_files: Mutex::new(BTreeSet::new()),
            processing_start: Instant::now(),
        }
    }

    /// Record an event for a file, keeping at most the per-file limit
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = lock(&self.file_events);
        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn record_file_context(&self, context: &FileProcessingContext) {
        lock(&self.seen_files).insert(context.file_path.clone());
    }

    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        lock(&self.file_events)
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        lock(&self.file_events).clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = lock(&self.file_events);
        let seen = lock(&self.seen_files);

        let mut summary = ProcessingSummary {
            total_processing_time: self.processing_start.elapsed(),
            ..Default::default()
        };

        let all_files: BTreeSet<&PathBuf> = seen.iter().chain(events.keys()).collect();
        summary.total_files = all_files.len();

        for file in all_files {
            let file_events = events.get(file).map(Vec::as_slice).unwrap_or(&[]);
            if file_events.iter().any(LogEvent::is_error) {
                summary.failed_files += 1;
            } else {
                summary.successful_files += 1;
            }
            summary.total_errors += file_events.iter().filter(|e| e.is_error()).count();
            summary.total_warnings += file_events.iter().filter(|e| e.is_warning()).count();
        }

        summary
    }

    pub fn clear(&self) {
        lock(&self.file_events).clear();
        lock(&self.seen_files).clear();
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn location(file_path: &Path, event: &LogEvent) -> String {
    event
        .span
        .as_ref()
        .map(|s| format!("\n  --> {}:{}", file_path.display(), s.start))
        .unwrap_or_default()
}

/// Render collected errors and warnings the way cargo prints diagnostics
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let reportable: Vec<&LogEvent> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if reportable.is_empty() {
            continue;
        }

        output.push_str(&format!("Translating {}...\n", file_path.display()));

        for event in reportable {
            let label = if event.is_error() { "error" } else { "warning" };
            output.push_str(&format!(
                "{}[{}]: {}{}\n",
                label,
                event.code,
                event.message,
                location(file_path, event)
            ));

            for (key, value) in &event.context {
                if key != "file" && key != "file_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }

            if event.is_error() {
                let action = codes::get_action(event.code.as_str());
                if action != "No specific action available" {
                    output.push_str(&format!("  = help: {}\n", action));
                }
            }
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!(
            "error: {} of {} file(s) failed to translate ({} error(s))\n",
            summary.failed_files, summary.total_files, summary.total_errors
        ));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("warning: {} warning(s) emitted\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{Position, Span};

    #[test]
    fn test_summary_counts_clean_and_failed_files() {
        let collector = ErrorCollector::new();
        collector.record_file_context(&FileProcessingContext::new("ok.pyzh".into(), 0));
        collector.record_file_context(&FileProcessingContext::new("bad.pyzh".into(), 1));
        collector.record_event(
            Path::new("bad.pyzh"),
            LogEvent::error(codes::lexical::UNTERMINATED_STRING, "never closed"),
        );

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.successful_files, 1);
        assert_eq!(summary.failed_files, 1);
        assert!(summary.has_errors());
        assert_eq!(collector.get_file_errors(Path::new("bad.pyzh")).len(), 1);
    }

    #[test]
    fn test_event_limit_adds_single_overflow_warning() {
        let collector = ErrorCollector::new();
        let path = Path::new("noisy.pyzh");
        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 5 {
            collector.record_event(path, LogEvent::warning("w"));
        }
        let events = &collector.get_all_file_events()[path];
        assert_eq!(events.len(), MAX_LOG_EVENTS_PER_FILE + 1);
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let event = LogEvent::error(codes::lexical::LEXICAL_FAILURE, "No token rule matches '`'")
            .with_span(Span::single(Position::new(2, 4, 3)))
            .with_context("character", "`")
            .with_context("file", "skipped");
        collector.record_event(Path::new("src/main.pyzh"), event);

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Translating src/main.pyzh..."));
        assert!(output.contains("error[E020]: No token rule matches '`'"));
        assert!(output.contains("--> src/main.pyzh:4:3"));
        assert!(output.contains("= character: `"));
        assert!(!output.contains("= file: skipped"));
        assert!(output.contains("= help:"));
        assert!(output.contains("1 of 1 file(s) failed"));
    }
}
