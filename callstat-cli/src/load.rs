//! Reads dialer exports into a single Arrow batch.
//!
//! CSV cells are all read as `Utf8`, the way the dialer's spreadsheet export
//! is consumed; time parsing happens later in the engine. Arrow IPC files keep
//! their native column types.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use arrow::array::{Array, AsArray};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::ipc::reader::FileReader;
use arrow::record_batch::RecordBatch;
use callstat_schema::{is_unnamed, looks_headerless, rename_columns};
use tracing::debug;

pub fn load_table(path: &Path) -> anyhow::Result<RecordBatch> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => load_csv(path),
        Some("arrow") | Some("ipc") => load_ipc(path),
        _ => bail!("unsupported input format: {}", path.display()),
    }
}

/// CSV with header detection: the first line names the columns unless its
/// first three cells are blank or `Unnamed*`, in which case it is data and
/// the names stay unnamed for the engine to synthesize.
pub fn load_csv(path: &Path) -> anyhow::Result<RecordBatch> {
    let mut file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let (inferred, _) = Format::default()
        .with_header(false)
        .infer_schema(BufReader::new(&file), Some(1))?;
    let width = inferred.fields().len();
    if width == 0 {
        bail!("{} is empty", path.display());
    }
    file.seek(SeekFrom::Start(0))?;

    let raw_schema = Arc::new(Schema::new(
        (0..width)
            .map(|i| Field::new(unnamed(i), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let batches = ReaderBuilder::new(raw_schema.clone())
        .with_header(false)
        .build(file)?
        .collect::<Result<Vec<_>, _>>()?;
    let raw = concat_batches(&raw_schema, &batches)?;
    if raw.num_rows() == 0 {
        bail!("{} is empty", path.display());
    }

    let header = first_row(&raw);
    if looks_headerless(&header) {
        debug!(path = %path.display(), "no header row, keeping first line as data");
        return Ok(raw);
    }

    let data = raw.slice(1, raw.num_rows() - 1);
    Ok(rename_columns(&data, &header)?)
}

pub fn load_ipc(path: &Path) -> anyhow::Result<RecordBatch> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = FileReader::try_new(file, None)?;
    let schema = reader.schema();
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

fn unnamed(i: usize) -> String {
    format!("Unnamed: {i}")
}

fn first_row(raw: &RecordBatch) -> Vec<String> {
    raw.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let cells = col.as_string::<i32>();
            if cells.is_null(0) || is_unnamed(cells.value(0)) {
                unnamed(i)
            } else {
                cells.value(0).to_string()
            }
        })
        .collect()
}
