//! Raw tabular sources.
//!
//! A [`Table`] is the header plus every row of one CSV file as strings, in
//! file order, with no filtering or coercion. Typed decoding happens in
//! [`Table::records`], which runs serde and then [`Validate`].

use crate::error::LoadError;
use crate::validate::Validate;
use abyssal_core::{LineRecord, SourceRows};
use csv::{ReaderBuilder, StringRecord, Trim};
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// One data row and the 1-based line it starts on.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub line: usize,
    pub values: StringRecord,
}

/// Header and rows of one source file.
#[derive(Debug, Clone)]
pub struct Table {
    source: String,
    path: PathBuf,
    headers: StringRecord,
    rows: Vec<TableRow>,
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

impl Table {
    /// Reads a CSV file, gunzipping it first when the name ends in `.gz`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        if path.extension().is_some_and(|ext| ext == "gz") {
            Self::from_reader(path, GzDecoder::new(reader))
        } else {
            Self::from_reader(path, reader)
        }
    }

    /// Reads CSV text from any reader; `path` only names the source.
    pub fn from_reader<R: Read>(path: &Path, reader: R) -> Result<Self, LoadError> {
        let source = source_name(path);
        let mut csv = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers = csv
            .headers()
            .map_err(|e| LoadError::from_csv(&source, path, 1, e))?
            .clone();

        let mut rows = Vec::new();
        for (index, result) in csv.records().enumerate() {
            let fallback = index + 2;
            let values = result.map_err(|e| LoadError::from_csv(&source, path, fallback, e))?;
            let line = values
                .position()
                .and_then(|p| usize::try_from(p.line()).ok())
                .unwrap_or(fallback);
            rows.push(TableRow { line, values });
        }

        tracing::debug!(source = %source, columns = headers.len(), rows = rows.len(), "Table read");
        Ok(Self {
            source,
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Column names in file order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fails unless every group has at least one spelling in the header.
    pub fn require_columns(&self, required: &[&[&str]]) -> Result<(), LoadError> {
        for spellings in required {
            if !spellings.iter().any(|name| self.column_index(name).is_some()) {
                return Err(LoadError::MissingColumn {
                    source_name: self.source.clone(),
                    column: spellings.first().copied().unwrap_or_default().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Decodes and validates every row into `T`, keeping line numbers.
    pub fn records<T>(&self) -> Result<SourceRows<T>, LoadError>
    where
        T: DeserializeOwned + Validate,
    {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut values = row.values.clone();
                values.trim();
                let record: T = values
                    .deserialize(Some(&self.headers))
                    .map_err(|e| LoadError::from_csv(&self.source, &self.path, row.line, e))?;
                let record = record
                    .validate()
                    .map_err(|reason| LoadError::invalid(&self.source, row.line, reason))?;
                Ok(LineRecord {
                    line: row.line,
                    record,
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;
        Ok(SourceRows::new(self.source.clone(), rows))
    }
}
