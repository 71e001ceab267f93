//! Batch processing: every CSV of the input directory, one at a time.
//!
//! Files are independent. A failing file is recorded and the run moves on;
//! output is only written once a file has fully normalized.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tabnorm_ingest::{
    CsvOptions, list_csv_files, output_path_for, read_csv_table, write_csv_table,
};
use tabnorm_reference::{ReferenceCache, ReferenceStore};
use tabnorm_transform::{NormalizationReport, TableNormalizer};
use tracing::{error, info, info_span, warn};

/// Where a run reads from and writes to.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub csv: CsvOptions,
    pub output_delimiter: u8,
    /// Normalize without writing output files.
    pub dry_run: bool,
}

/// Result of one input file.
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub result: std::result::Result<FileSummary, String>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn file_name(&self) -> String {
        self.input.file_name().map_or_else(
            || self.input.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }
}

#[derive(Debug)]
pub struct FileSummary {
    /// `None` on dry runs.
    pub output: Option<PathBuf>,
    pub rows: usize,
    pub columns: usize,
    pub report: NormalizationReport,
}

#[derive(Debug)]
pub struct BatchResult {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub files: Vec<FileOutcome>,
    /// Round trips issued to the reference store during the run.
    pub reference_queries: usize,
}

impl BatchResult {
    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|file| !file.is_ok())
    }

    pub fn has_errors(&self) -> bool {
        self.failed().next().is_some()
    }
}

/// Reads, normalizes and writes one file.
pub fn process_file<S: ReferenceStore>(
    path: &Path,
    options: &BatchOptions,
    normalizer: &TableNormalizer,
    cache: &mut ReferenceCache<S>,
) -> Result<FileSummary> {
    let table = read_csv_table(path, &options.csv)
        .with_context(|| format!("read {}", path.display()))?;
    let normalized = normalizer
        .normalize(table, cache)
        .with_context(|| format!("normalize {}", path.display()))?;

    let output = if options.dry_run {
        None
    } else {
        let output = output_path_for(path, &options.output_dir);
        write_csv_table(&output, &normalized.table, options.output_delimiter)
            .with_context(|| format!("write {}", output.display()))?;
        Some(output)
    };

    Ok(FileSummary {
        output,
        rows: normalized.table.height(),
        columns: normalized.table.width(),
        report: normalized.report,
    })
}

/// Processes every CSV file of `options.input_dir` in name order.
///
/// A missing input directory is created and yields an empty run. Only an
/// unreadable input directory or an unwritable output directory fails the
/// run as a whole; per-file failures end up in [`BatchResult::files`].
pub fn run_batch<S: ReferenceStore>(
    options: &BatchOptions,
    normalizer: &TableNormalizer,
    cache: &mut ReferenceCache<S>,
) -> Result<BatchResult> {
    let span = info_span!("batch", input_dir = %options.input_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    if !options.input_dir.exists() {
        warn!(input_dir = %options.input_dir.display(), "input directory missing, creating it");
        std::fs::create_dir_all(&options.input_dir).with_context(|| {
            format!("create input directory {}", options.input_dir.display())
        })?;
    }
    let inputs = list_csv_files(&options.input_dir)
        .with_context(|| format!("list input directory {}", options.input_dir.display()))?;
    if inputs.is_empty() {
        warn!(input_dir = %options.input_dir.display(), "no CSV files found");
    }
    if !options.dry_run {
        std::fs::create_dir_all(&options.output_dir).with_context(|| {
            format!("create output directory {}", options.output_dir.display())
        })?;
    }

    let mut files = Vec::with_capacity(inputs.len());
    for input in inputs {
        let file_span = info_span!("file", file = %input.display());
        let _file_guard = file_span.enter();
        let file_start = Instant::now();

        let result = match process_file(&input, options, normalizer, cache) {
            Ok(summary) => {
                info!(
                    rows = summary.rows,
                    columns = summary.columns,
                    duration_ms = file_start.elapsed().as_millis(),
                    "file processed"
                );
                Ok(summary)
            }
            Err(err) => {
                let message = format!("{err:#}");
                error!(error = %message, "file failed");
                Err(message)
            }
        };
        files.push(FileOutcome { input, result });
    }

    let result = BatchResult {
        input_dir: options.input_dir.clone(),
        output_dir: options.output_dir.clone(),
        dry_run: options.dry_run,
        files,
        reference_queries: cache.query_count(),
    };
    info!(
        files = result.files.len(),
        failed = result.failed().count(),
        reference_queries = result.reference_queries,
        duration_ms = start.elapsed().as_millis(),
        "batch complete"
    );
    Ok(result)
}
