//! Header normalization: map whatever the export called its columns onto the
//! canonical `CallRecords` vocabulary.

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::{CallRecords, SchemaError};

/// Prefix spreadsheet readers give to columns with an empty header cell.
pub const UNNAMED_PREFIX: &str = "Unnamed";

pub fn is_unnamed(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name.starts_with(UNNAMED_PREFIX)
}

/// True when none of the leading required positions carries a real header,
/// i.e. the first row of the file is data.
pub fn looks_headerless<S: AsRef<str>>(names: &[S]) -> bool {
    names
        .iter()
        .take(CallRecords::COLUMNS.len())
        .all(|n| is_unnamed(n.as_ref()))
}

/// Positional names for a headerless table: the required columns first, then `col_{i}`.
pub fn synthesized_names(num_columns: usize) -> Result<Vec<String>, SchemaError> {
    let required = CallRecords::COLUMNS.len();
    if num_columns < required {
        return Err(SchemaError::TooFewColumns(num_columns));
    }
    Ok(CallRecords::COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain((required..num_columns).map(|i| format!("col_{i}")))
        .collect())
}

/// Headers the dialer writes in its Russian UI.
pub fn default_aliases() -> BTreeMap<String, String> {
    [("Время", "Time"), ("Результат", "Result"), ("Сотрудник", "Employee")]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

/// Rebuild `batch` with new column names; data buffers are shared, not copied.
pub fn rename_columns(batch: &RecordBatch, names: &[String]) -> Result<RecordBatch, SchemaError> {
    let schema = batch.schema();
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .zip(names)
        .map(|(field, name)| field.as_ref().clone().with_name(name.clone()))
        .collect();
    let renamed = Schema::new_with_metadata(fields, schema.metadata().clone());
    Ok(RecordBatch::try_new(Arc::new(renamed), batch.columns().to_vec())?)
}

#[derive(Clone, Debug)]
pub struct HeaderNormalizer {
    aliases: BTreeMap<String, String>,
}

impl Default for HeaderNormalizer {
    fn default() -> Self {
        Self::new(default_aliases())
    }
}

impl HeaderNormalizer {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    /// Resolve final column names: synthesize them when the header row is
    /// blank, otherwise translate aliases and keep everything else.
    pub fn normalize_names<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<String>, SchemaError> {
        if looks_headerless(names) {
            return synthesized_names(names.len());
        }
        Ok(names
            .iter()
            .map(|n| {
                let trimmed = n.as_ref().trim();
                self.aliases
                    .get(trimmed)
                    .cloned()
                    .unwrap_or_else(|| trimmed.to_string())
            })
            .collect())
    }

    pub fn normalize(&self, batch: &RecordBatch) -> Result<RecordBatch, SchemaError> {
        let current: Vec<String> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        let names = self.normalize_names(&current)?;
        if names == current {
            return Ok(batch.clone());
        }
        rename_columns(batch, &names)
    }
}
