use pyzh_compiler::batch::{self, BatchConfig, BatchJob};
use pyzh_compiler::config::runtime::RuntimeConfig;
use pyzh_compiler::file_processor::{FileProcessor, OutputLayout};
use pyzh_compiler::grammar::KeywordTable;
use pyzh_compiler::translation::{Preamble, Translator};
use pyzh_compiler::utils::SourceMap;
use pyzh_compiler::{lexical, logging, pipeline};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parsed command line
#[derive(Debug)]
struct CliOptions {
    input: PathBuf,
    out: Option<PathBuf>,
    keywords: Option<PathBuf>,
    stdout: bool,
    dump_tokens: bool,
    batch: BatchConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = RuntimeConfig::from_env();
    logging::config::init_runtime_preferences(runtime.logging.clone())?;
    logging::init_global_logging()?;
    pipeline::validate_pipeline()?;

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pyzhc");
    if args.len() < 2 {
        eprintln!("Usage: {} <file.pyzh|project-dir> [options]", program);
        eprintln!("       {} --help", program);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(program);
        return Ok(());
    }

    let options = parse_options(&args[1], &args[2..]);

    let keyword_path = options
        .keywords
        .clone()
        .or_else(|| runtime.translation.keyword_table_path.clone());
    let table = match load_keyword_table(keyword_path.as_deref()) {
        Ok(table) => table,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    };

    let preamble = Preamble::from_preferences(&runtime.translation);
    let processor = FileProcessor::from_preferences(&runtime.file_processor, &runtime.translation);

    let input_path = options.input.as_path();
    let project_root = if input_path.is_dir() {
        input_path.to_path_buf()
    } else {
        match input_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    };
    let mut layout = OutputLayout::from_preferences(project_root, &runtime.translation);
    if let Some(out) = &options.out {
        layout = layout.with_output_root(out);
    }

    if input_path.is_file() {
        let translator = Translator::new(&table, preamble)
            .with_lexical_preferences(runtime.lexical.clone());
        process_single_file(&options, &processor, &layout, &translator)?;
    } else if input_path.is_dir() {
        let job = BatchJob::new(layout, Arc::new(table), preamble)
            .with_processor(processor)
            .with_lexical_preferences(runtime.lexical.clone());
        process_directory_batch(&job, &options.batch)?;
    } else {
        eprintln!("Error: Input must be a file (.{}) or directory", runtime.translation.source_extension);
        eprintln!("  Path: {}", input_path.display());
        std::process::exit(1);
    }

    Ok(())
}

fn print_help(program_name: &str) {
    println!("pyzhc v{}", env!("CARGO_PKG_VERSION"));
    println!("Translate Chinese-keyword Python sources (.pyzh) into standard Python");
    println!();
    println!("USAGE:");
    println!("    {} <file.pyzh> [options]          # Translate one file", program_name);
    println!("    {} <project-dir> [options]        # Translate every .pyzh file", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --out DIR           Output root (default: <project>/生成)");
    println!("    --keywords FILE     Load the keyword table from a TOML file");
    println!("    --stdout            Print the translation instead of writing it (file only)");
    println!("    --dump-tokens       Print the token stream as JSON (file only)");
    println!("    --sequential        Force sequential processing (no parallelism)");
    println!("    --parallel          Force parallel processing (default)");
    println!("    --threads N         Set maximum number of threads (default: auto)");
    println!("    --no-recursive      Don't search subdirectories");
    println!("    --max-files N       Limit maximum files to process");
    println!("    --fail-fast         Stop on first error");
    println!("    --quiet             Suppress progress reporting");
    println!();
    println!("ENVIRONMENT:");
    println!("    PYZH_KEYWORD_TABLE, PYZH_RUNTIME_MODULE, PYZH_OUTPUT_DIR,");
    println!("    PYZH_LOGGING_MIN_LEVEL and other PYZH_* variables override defaults");
    println!();
    println!("EXAMPLES:");
    println!("    {} 主程序.pyzh                     # Writes 生成/主程序.py", program_name);
    println!("    {} 主程序.pyzh --stdout            # Print to stdout", program_name);
    println!("    {} project/ --threads 4            # 4 threads max", program_name);
    println!("    {} project/ --sequential --fail-fast", program_name);
    println!();
    println!("BUILD:");
    println!("    {}", pyzh_compiler::config::build_info::source_info());
}

fn parse_options(input: &str, args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        input: PathBuf::from(input),
        out: None,
        keywords: None,
        stdout: false,
        dump_tokens: false,
        batch: BatchConfig::default(),
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--out" | "--keywords" => {
                if let Some(value) = args.get(i + 1) {
                    if args[i] == "--out" {
                        options.out = Some(PathBuf::from(value));
                    } else {
                        options.keywords = Some(PathBuf::from(value));
                    }
                    i += 1;
                } else {
                    eprintln!("Warning: {} requires a path", args[i]);
                }
            }
            "--stdout" => options.stdout = true,
            "--dump-tokens" => options.dump_tokens = true,
            "--sequential" => options.batch.max_threads = 1,
            "--parallel" => {}
            "--threads" => match args.get(i + 1) {
                Some(value) => {
                    match value.parse::<usize>() {
                        Ok(threads) => options.batch.max_threads = threads.max(1),
                        Err(_) => eprintln!("Warning: Invalid thread count '{}', using default", value),
                    }
                    i += 1;
                }
                None => eprintln!("Warning: --threads requires a number"),
            },
            "--no-recursive" => options.batch.recursive = false,
            "--max-files" => match args.get(i + 1) {
                Some(value) => {
                    match value.parse::<usize>() {
                        Ok(max_files) => options.batch.max_files = Some(max_files),
                        Err(_) => eprintln!("Warning: Invalid max files '{}', ignoring", value),
                    }
                    i += 1;
                }
                None => eprintln!("Warning: --max-files requires a number"),
            },
            "--fail-fast" => options.batch.fail_fast = true,
            "--quiet" => options.batch.progress_reporting = false,
            other => eprintln!("Warning: Unknown option '{}'", other),
        }
        i += 1;
    }

    options
}

fn load_keyword_table(path: Option<&Path>) -> Result<KeywordTable, String> {
    match path {
        Some(path) => KeywordTable::from_file(path)
            .map_err(|e| format!("[{}] {}", e.error_code(), e)),
        None => Ok(KeywordTable::builtin()),
    }
}

fn process_single_file(
    options: &CliOptions,
    processor: &FileProcessor,
    layout: &OutputLayout,
    translator: &Translator<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = options.input.as_path();

    if options.dump_tokens {
        let outcome = processor
            .process_file(input)
            .map_err(pipeline::PipelineError::from)
            .and_then(|file| Ok(lexical::tokenize(&file.source)?));
        match outcome {
            Ok(tokens) => println!("{}", tokens.to_json()?),
            Err(error) => fail_single_file(input, &error),
        }
        return Ok(());
    }

    if options.stdout {
        match pipeline::translate_file_with(processor, input, translator) {
            Ok(report) => print!("{}", report.output),
            Err(error) => fail_single_file(input, &error),
        }
        return Ok(());
    }

    println!("Translating file: {}", input.display());
    match pipeline::process_file_with(processor, input, layout, translator, 0) {
        Ok(result) => {
            println!("\nSUCCESS: {} tokens, {} keyword substitution(s)",
                result.token_count, result.substitutions);
            if let Some(output_path) = &result.output_path {
                println!("  Output: {}", output_path.display());
            }
            logging::print_cargo_style_summary();
        }
        Err(error) => fail_single_file(input, &error),
    }

    Ok(())
}

fn fail_single_file(input: &Path, error: &pipeline::PipelineError) -> ! {
    eprintln!("\nFAILED: {}", error);
    print_detailed_error(input, error);
    logging::print_cargo_style_summary();
    std::process::exit(1);
}

fn process_directory_batch(
    job: &BatchJob,
    config: &BatchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting batch translation: {}", job.project_root().display());
    println!(
        "Configuration: {} threads, recursive={}, fail_fast={}",
        config.max_threads, config.recursive, config.fail_fast
    );
    println!("Output root: {}", job.layout.output_root().display());

    if let Some(max_files) = config.max_files {
        println!("File limit: {} files maximum", max_files);
    }

    match batch::process_directory_with_config(job, config) {
        Ok(results) => {
            println!("\nBatch translation completed!");
            print_batch_results(&results);
            logging::print_cargo_style_summary();

            if results.has_failures() {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("Batch translation failed: [{}] {}", error.error_code(), error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_batch_results(results: &batch::BatchResults) {
    println!("{}", results.summary());
    println!("  Files discovered: {}", results.files_discovered);

    if results.files_processed > 0 {
        let avg_time = results.processing_duration.as_secs_f64() / results.files_processed as f64;
        println!("  Average time per file: {:.3}s", avg_time);
    }

    if results.has_failures() {
        println!("\nFailed Files:");
        for (file_path, error) in &results.failed_files {
            println!("  {}: {}", file_path.display(), get_error_summary(error));
        }
    }

    if results.success_count() > 0 && results.success_count() <= 10 {
        println!("\nTranslated Files:");
        for (file_path, result) in &results.successful_files {
            println!(
                "  {}: {} tokens, {} substitution(s)",
                file_path.display(),
                result.token_count,
                result.substitutions
            );
        }
    } else if results.success_count() > 10 {
        println!("\n{} files translated (showing first 5):", results.success_count());
        for (file_path, result) in results.successful_files.iter().take(5) {
            println!(
                "  {}: {} tokens, {} substitution(s)",
                file_path.display(),
                result.token_count,
                result.substitutions
            );
        }
        println!("  ... and {} more", results.success_count() - 5);
    }
}

fn get_error_summary(error: &pipeline::PipelineError) -> String {
    let stage = match error {
        pipeline::PipelineError::FileProcessing(_) => "File processing error",
        pipeline::PipelineError::LexicalAnalysis(_) => "Lexical analysis error",
        pipeline::PipelineError::Output(_) => "Output error",
    };
    match error.position() {
        Some(position) => format!("{} at {}", stage, position),
        None => stage.to_string(),
    }
}

/// Stage header plus, for lexical errors, the offending line with a caret
fn print_detailed_error(input: &Path, error: &pipeline::PipelineError) {
    let stage = match error {
        pipeline::PipelineError::FileProcessing(_) => "File processing",
        pipeline::PipelineError::LexicalAnalysis(_) => "Lexical analysis",
        pipeline::PipelineError::Output(_) => "Output",
    };
    eprintln!("{} stage failed [{}]:", stage, error.error_code());

    let snippet = error.position().and_then(|position| {
        let source = std::fs::read_to_string(input).ok()?;
        let source = lexical::normalize_line_endings(&source).into_owned();
        Some(SourceMap::new(source).format_error(
            &input.display().to_string(),
            position,
            &error.detail(),
        ))
    });

    match snippet {
        Some(snippet) => eprint!("{}", snippet),
        None => eprintln!("  {}", error.detail()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyzh_compiler::lexical::LexerError;
    use pyzh_compiler::utils::Position;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let args = strings(&[
            "--threads", "4", "--fail-fast", "--no-recursive", "--out", "build", "--stdout",
        ]);
        let options = parse_options("project", &args);
        assert_eq!(options.input, PathBuf::from("project"));
        assert_eq!(options.batch.max_threads, 4);
        assert!(options.batch.fail_fast);
        assert!(!options.batch.recursive);
        assert_eq!(options.out, Some(PathBuf::from("build")));
        assert!(options.stdout);
        assert!(!options.dump_tokens);
    }

    #[test]
    fn test_parse_options_invalid() {
        let args = strings(&["--threads", "invalid", "--unknown-option", "--keywords"]);
        let options = parse_options("a.pyzh", &args);
        assert_ne!(options.batch.max_threads, 0);
        assert!(options.keywords.is_none());
    }

    #[test]
    fn test_sequential_and_quiet() {
        let options = parse_options("p", &strings(&["--sequential", "--quiet", "--max-files", "3"]));
        assert_eq!(options.batch.max_threads, 1);
        assert!(!options.batch.progress_reporting);
        assert_eq!(options.batch.max_files, Some(3));
    }

    #[test]
    fn test_get_error_summary() {
        let error = pipeline::PipelineError::LexicalAnalysis(LexerError::UnterminatedContinuation {
            position: Position::new(0, 2, 7),
        });
        assert_eq!(get_error_summary(&error), "Lexical analysis error at 2:7");
    }

    #[test]
    fn test_missing_keyword_table_is_reported() {
        let message = load_keyword_table(Some(Path::new("/nonexistent/keywords.toml"))).unwrap_err();
        assert!(message.starts_with("[E001]"));
        assert!(load_keyword_table(None).unwrap().contains("若"));
    }
}
