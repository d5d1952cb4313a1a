//! Directory translation
//!
//! Discovers dialect sources under a project root and translates each one
//! independently, sequentially or on worker threads sharing one keyword
//! table. A failing file is recorded and the batch continues unless
//! `fail_fast` is set.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::{FileProcessor, OutputLayout};
use crate::grammar::KeywordTable;
use crate::logging::{codes, Code};
use crate::pipeline::{self, PipelineError, PipelineResult};
use crate::translation::{Preamble, Translator};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    /// Process at most this many files (in path order)
    pub max_files: Option<usize>,
    pub progress_reporting: bool,
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4),
            recursive: true,
            max_files: None,
            progress_reporting: true,
            fail_fast: false,
        }
    }
}

/// Everything a worker needs to translate files; cheap to clone
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub layout: OutputLayout,
    pub processor: FileProcessor,
    pub table: Arc<KeywordTable>,
    pub preamble: Preamble,
    pub lexical: LexicalPreferences,
}

impl BatchJob {
    pub fn new(layout: OutputLayout, table: Arc<KeywordTable>, preamble: Preamble) -> Self {
        Self {
            layout,
            processor: FileProcessor::new(),
            table,
            preamble,
            lexical: LexicalPreferences::default(),
        }
    }

    pub fn with_lexical_preferences(mut self, preferences: LexicalPreferences) -> Self {
        self.lexical = preferences;
        self
    }

    pub fn with_processor(mut self, processor: FileProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn project_root(&self) -> &Path {
        self.layout.project_root()
    }

    fn translator(&self) -> Translator<'_> {
        Translator::new(&self.table, self.preamble.clone())
            .with_lexical_preferences(self.lexical.clone())
    }

    fn translate_file(&self, translator: &Translator<'_>, file: &Path, file_id: usize)
        -> Result<PipelineResult, PipelineError>
    {
        pipeline::process_file_with(&self.processor, file, &self.layout, translator, file_id)
    }
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_files.is_empty()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.successful_files.len() as f64 / self.files_processed as f64
        }
    }

    pub fn total_substitutions(&self) -> usize {
        self.successful_files
            .iter()
            .map(|(_, result)| result.substitutions)
            .sum()
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.files_processed += other.files_processed;
    }

    fn sort_by_path(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "Translated {} of {} file(s) ({:.1}%), {} failed, {} keyword substitution(s), {:.2}s total",
            self.success_count(),
            self.files_processed,
            self.success_rate() * 100.0,
            self.failure_count(),
            self.total_substitutions(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No .{extension} files found in directory: {path}")]
    NoFilesFound { path: String, extension: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("IO error during directory traversal of {path}: {error}")]
    IoError { path: String, error: String },

    #[error("Worker thread failed: {message}")]
    WorkerFailure { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::batch::DIRECTORY_NOT_FOUND,
            BatchError::NoFilesFound { .. } => codes::batch::NO_FILES_FOUND,
            BatchError::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
            BatchError::IoError { .. } => codes::file_processing::IO_ERROR,
            BatchError::WorkerFailure { .. } => codes::batch::WORKER_FAILURE,
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Dialect sources under the project root in path order, excluding
/// anything inside the output root
pub fn discover_source_files(job: &BatchJob, config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    let root = job.project_root();
    crate::log_info!("Starting file discovery",
        "directory" => root.display(),
        "recursive" => config.recursive
    );

    if !root.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: root.display().to_string(),
        });
    }

    let mut files = Vec::new();
    visit_directory(root, job, config.recursive, &mut files)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: root.display().to_string(),
            extension: job.processor.source_extension.clone(),
        });
    }

    files.sort();

    if let Some(max_files) = config.max_files {
        if files.len() > max_files {
            crate::log_warning!("Reached maximum file limit",
                "files_found" => files.len(),
                "limit" => max_files
            );
            files.truncate(max_files);
        }
    }

    if files.len() > MAX_FILES_PER_BATCH {
        return Err(BatchError::TooManyFiles {
            count: files.len(),
            max: MAX_FILES_PER_BATCH,
        });
    }

    crate::log_debug!("File discovery completed",
        "files_found" => files.len(),
        "directory" => root.display()
    );

    Ok(files)
}

fn visit_directory(
    dir_path: &Path,
    job: &BatchJob,
    recursive: bool,
    files: &mut Vec<PathBuf>,
) -> Result<(), BatchError> {
    let io_error = |e: std::io::Error| BatchError::IoError {
        path: dir_path.display().to_string(),
        error: e.to_string(),
    };

    for entry in fs::read_dir(dir_path).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();

        if path.is_dir() {
            if recursive && !job.layout.is_in_output(&path) {
                visit_directory(&path, job, recursive, files)?;
            }
        } else if path.is_file() && job.processor.is_source_path(&path) {
            files.push(path);
        }
    }

    Ok(())
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

pub fn process_directory_sequential(
    job: &BatchJob,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    crate::log_info!("Starting sequential batch translation",
        "directory" => job.project_root().display()
    );

    let files = discover_source_files(job, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    let translator = job.translator();

    for (file_id, file_path) in files.iter().enumerate() {
        if config.progress_reporting {
            println!(
                "Translating file {} of {}: {}",
                file_id + 1,
                files.len(),
                file_path.display()
            );
        }

        match job.translate_file(&translator, file_path, file_id) {
            Ok(result) => results.add_success(file_path.clone(), result),
            Err(error) => {
                results.add_failure(file_path.clone(), error);
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch translation");
                    break;
                }
            }
        }
    }

    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, 1);
    Ok(results)
}

pub fn process_directory_parallel(
    job: &BatchJob,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let threads = config.max_threads.clamp(1, MAX_WORKER_THREADS);
    crate::log_info!("Starting parallel batch translation",
        "directory" => job.project_root().display(),
        "max_threads" => threads
    );

    let files = discover_source_files(job, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    let chunk_size = calculate_chunk_size(files.len(), threads);
    let stop = Arc::new(AtomicBool::new(false));

    crate::log_debug!("Parallel translation configuration",
        "total_files" => files.len(),
        "files_per_thread" => chunk_size,
        "threads" => threads
    );

    let mut handles = Vec::new();
    for (chunk_index, chunk) in files.chunks(chunk_size).enumerate() {
        let job = job.clone();
        let stop = Arc::clone(&stop);
        let chunk = chunk.to_vec();
        let first_id = chunk_index * chunk_size;
        let fail_fast = config.fail_fast;
        let progress_reporting = config.progress_reporting;

        handles.push(thread::spawn(move || {
            let translator = job.translator();
            let mut local = BatchResults::new();

            for (offset, file_path) in chunk.into_iter().enumerate() {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                if progress_reporting {
                    println!("Translating {}", file_path.display());
                }
                match job.translate_file(&translator, &file_path, first_id + offset) {
                    Ok(result) => local.add_success(file_path, result),
                    Err(error) => {
                        local.add_failure(file_path, error);
                        if fail_fast {
                            stop.store(true, Ordering::Relaxed);
                        }
                    }
                }
            }
            local
        }));
    }

    for handle in handles {
        let local = handle.join().map_err(|_| BatchError::WorkerFailure {
            message: "worker thread panicked during translation".to_string(),
        })?;
        results.merge(local);
    }

    if stop.load(Ordering::Relaxed) {
        crate::log_warning!("Fail-fast mode enabled, batch translation stopped early");
    }

    results.sort_by_path();
    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, threads);
    Ok(results)
}

/// Files per worker so that `max_threads` workers cover every file
fn calculate_chunk_size(file_count: usize, max_threads: usize) -> usize {
    file_count.div_ceil(max_threads.max(1)).max(1)
}

fn log_batch_complete(results: &BatchResults, threads: usize) {
    crate::log_success!(codes::success::BATCH_COMPLETE, "Batch translation completed",
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

/// Translate a project directory, choosing the mode from `config.max_threads`
pub fn process_directory_with_config(
    job: &BatchJob,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    if config.max_threads <= 1 {
        process_directory_sequential(job, config)
    } else {
        process_directory_parallel(job, config)
    }
}
