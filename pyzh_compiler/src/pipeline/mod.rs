//! Per-file translation: read, translate, write

mod error;
mod result;
mod validation;

pub use error::PipelineError;
pub use result::PipelineResult;
pub use validation::validate_pipeline;

use crate::file_processor::{FileProcessor, OutputLayout};
use crate::logging;
use crate::translation::{TranslationReport, Translator};
use std::path::Path;
use std::time::Instant;

/// Translate one file and write it under the layout's output root
pub fn process_file(
    input: &Path,
    layout: &OutputLayout,
    translator: &Translator<'_>,
) -> Result<PipelineResult, PipelineError> {
    process_file_with(&FileProcessor::new(), input, layout, translator, 0)
}

/// `process_file` with an explicit reader; `file_id` tags log events
pub fn process_file_with(
    processor: &FileProcessor,
    input: &Path,
    layout: &OutputLayout,
    translator: &Translator<'_>,
    file_id: usize,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(input.to_path_buf(), file_id, || {
        crate::log_info!("Translating file", "file" => input.display());

        let file_result = processor.process_file(input)?;
        let report = translator.translate_detailed(&file_result.source)?;
        let output_path = layout.write_output(input, &report.output)?;

        let result = PipelineResult {
            input_path: input.to_path_buf(),
            output_path: Some(output_path),
            file_metadata: file_result.metadata,
            token_count: report.token_count(),
            substitutions: report.substitutions,
            output_bytes: report.output.len(),
            lexical_metrics: report.metrics,
            processing_duration: start_time.elapsed(),
        };
        result.log_success();

        Ok(result)
    })
}

/// Translate one file without writing anything
pub fn translate_to_string(
    input: &Path,
    translator: &Translator<'_>,
) -> Result<TranslationReport, PipelineError> {
    translate_file_with(&FileProcessor::new(), input, translator)
}

pub fn translate_file_with(
    processor: &FileProcessor,
    input: &Path,
    translator: &Translator<'_>,
) -> Result<TranslationReport, PipelineError> {
    logging::with_file_context(input.to_path_buf(), 0, || {
        let file_result = processor.process_file(input)?;
        Ok(translator.translate_detailed(&file_result.source)?)
    })
}
