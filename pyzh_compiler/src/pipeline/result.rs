use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of translating one file
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub input_path: PathBuf,
    /// `None` when the output was not written to disk
    pub output_path: Option<PathBuf>,
    pub file_metadata: FileMetadata,
    pub lexical_metrics: LexicalMetrics,
    pub token_count: usize,
    pub substitutions: usize,
    pub output_bytes: usize,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn log_success(&self) {
        let seconds = self.processing_duration.as_secs_f64();
        let output = self
            .output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());

        crate::log_success!(
            crate::logging::codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
            "File translated",
            "file" => self.input_path.display(),
            "output" => output,
            "tokens" => self.token_count,
            "substitutions" => self.substitutions,
            "duration_ms" => format!("{:.2}", seconds * 1000.0),
            "processing_rate_bytes_per_sec" => format!("{:.0}",
                if seconds > 0.0 { self.file_metadata.size as f64 / seconds } else { 0.0 })
        );
    }
}
