//! Reading tables out of a downloaded export archive.
//!
//! The archive is a zip of tab-separated tables. Older exports name their
//! entries `WCA_export_RanksSingle.tsv` with camelCase headers; newer ones
//! use `ranks_single.tsv` with snake_case headers. Both map onto the same
//! normalized table and column names.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use serde::Deserialize;
use zip::ZipArchive;

use crate::error::ArchiveError;

const EXPORT_PREFIX: &str = "wca_export_";

/// Header spellings that camelCase splitting alone does not fix.
const ALIASES: &[(&str, &str)] = &[("subid", "sub_id")];

/// Normalize a table entry name or column header.
///
/// Strips any directory and `.tsv` extension plus the `WCA_export_` prefix,
/// converts camelCase to snake_case and lowercases the result.
pub fn normalize_name(raw: &str) -> String {
    let base = raw.rsplit('/').next().unwrap_or(raw).trim();
    let base = match base.len().checked_sub(4) {
        Some(cut) if base.is_char_boundary(cut) && base[cut..].eq_ignore_ascii_case(".tsv") => {
            &base[..cut]
        }
        _ => base,
    };

    let chars: Vec<char> = base.chars().collect();
    let mut out = String::with_capacity(base.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }

    let out = match out.strip_prefix(EXPORT_PREFIX) {
        Some(rest) => rest.to_string(),
        None => out,
    };
    ALIASES
        .iter()
        .find(|(from, _)| *from == out)
        .map(|(_, to)| to.to_string())
        .unwrap_or(out)
}

/// Contents of the archive's `metadata.json`, when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchiveMetadata {
    #[serde(default)]
    pub export_date: Option<String>,
    #[serde(default)]
    pub export_format_version: Option<String>,
}

/// An opened export archive with its tables indexed by normalized name.
pub struct ExportArchive {
    zip: ZipArchive<File>,
    tables: HashMap<String, usize>,
    metadata_index: Option<usize>,
    path: PathBuf,
}

impl ExportArchive {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path)?;
        let mut zip = ZipArchive::new(file)?;

        let mut tables = HashMap::new();
        let mut metadata_index = None;
        for i in 0..zip.len() {
            let (name, is_dir) = {
                let entry = zip.by_index(i)?;
                (entry.name().to_string(), entry.is_dir())
            };
            if is_dir {
                continue;
            }
            let lower = name.to_lowercase();
            if lower.ends_with(".tsv") {
                let table = normalize_name(&name);
                log::debug!("Archive entry {name} -> table {table}");
                tables.entry(table).or_insert(i);
            } else if lower.ends_with("metadata.json") {
                metadata_index = Some(i);
            }
        }

        Ok(Self {
            zip,
            tables,
            metadata_index,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Normalized names of every table in the archive, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Parse `metadata.json` if the archive has one.
    pub fn metadata(&mut self) -> Result<Option<ArchiveMetadata>, ArchiveError> {
        let Some(index) = self.metadata_index else {
            return Ok(None);
        };
        let mut contents = String::new();
        self.zip.by_index(index)?.read_to_string(&mut contents)?;
        match serde_json::from_str(&contents) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) => {
                log::warn!("Ignoring unreadable archive metadata.json: {e}");
                Ok(None)
            }
        }
    }

    /// Open a table for streaming.
    pub fn table(&mut self, table: &str) -> Result<TsvTable<impl Read + '_>, ArchiveError> {
        let index = *self
            .tables
            .get(table)
            .ok_or_else(|| ArchiveError::MissingTable(table.to_string()))?;
        let entry = self.zip.by_index(index)?;
        TsvTable::new(table, entry)
    }
}

/// A tab-separated table with normalized headers.
pub struct TsvTable<R: Read> {
    name: String,
    headers: Vec<String>,
    columns: HashMap<String, usize>,
    reader: csv::Reader<R>,
}

impl<R: Read> TsvTable<R> {
    pub fn new(name: &str, source: R) -> Result<Self, ArchiveError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .has_headers(true)
            .flexible(false)
            .from_reader(source);
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| row_error(name, &e))?
            .iter()
            .map(normalize_name)
            .collect();
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        Ok(Self {
            name: name.to_string(),
            headers,
            columns,
            reader,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Index of a required column.
    pub fn column(&self, column: &str) -> Result<usize, ArchiveError> {
        self.optional_column(column)
            .ok_or_else(|| ArchiveError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    pub fn optional_column(&self, column: &str) -> Option<usize> {
        self.columns.get(column).copied()
    }

    /// Iterate the data rows. Rows with the wrong number of fields are errors.
    pub fn rows(&mut self) -> impl Iterator<Item = Result<TsvRow, ArchiveError>> + '_ {
        let table = self.name.clone();
        self.reader.records().map(move |result| match result {
            Ok(record) => Ok(TsvRow {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                record,
            }),
            Err(e) => Err(row_error(&table, &e)),
        })
    }
}

fn row_error(table: &str, err: &csv::Error) -> ArchiveError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        _ => err.to_string(),
    };
    ArchiveError::Row {
        table: table.to_string(),
        line,
        message,
    }
}

/// One data row and its line in the source file.
#[derive(Debug, Clone)]
pub struct TsvRow {
    pub line: u64,
    record: StringRecord,
}

impl TsvRow {
    /// Field value, or `""` past the end of the row.
    pub fn get(&self, index: usize) -> &str {
        self.record.get(index).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }
}
