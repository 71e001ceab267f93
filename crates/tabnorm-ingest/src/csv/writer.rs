//! CSV output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tabnorm_model::Table;

use crate::error::{IngestError, Result};

fn write_records<W: Write>(out: W, table: &Table, delimiter: u8) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(out);
    writer.write_record(table.column_names())?;
    for idx in 0..table.height() {
        let row = table.row(idx).unwrap_or_default();
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Renders `table` as CSV text: a header line, then one line per row.
///
/// Nulls are written as empty fields.
pub fn render_csv(table: &Table, delimiter: u8) -> String {
    let mut buffer = Vec::new();
    // In-memory writes do not fail.
    if write_records(&mut buffer, table, delimiter).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `table` to `path`.
///
/// Output goes to a temp file next to `path` that is renamed into place once
/// complete, so a failed write never leaves a partial file behind.
pub fn write_csv_table(path: &Path, table: &Table, delimiter: u8) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| IngestError::Write {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = temp_path_for(path);
    let file = fs::File::create(&temp_path).map_err(|e| IngestError::Write {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;

    if let Err(error) = write_records(std::io::BufWriter::new(file), table, delimiter) {
        let _ = fs::remove_file(&temp_path);
        return Err(IngestError::Write {
            operation: "write",
            path: temp_path,
            source: error.into(),
        });
    }

    fs::rename(&temp_path, path).map_err(|e| IngestError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "wrote csv"
    );
    Ok(())
}
