//! JSONL (JSON Lines) table files.
//!
//! Each table is one file; each line is a valid JSON object representing one
//! row. Rewrites go through a whole-file replace, which is what keeps the
//! keyed upserts in the store implementation simple.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::{StorageConfig, StorageError, Table};

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for a table.
    pub fn for_table(config: &StorageConfig, table: Table) -> Self {
        Self::new(config.table_path(table))
    }

    fn open(&self, truncate: bool) -> Result<BufWriter<File>, StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = if truncate {
            File::create(&self.path)?
        } else {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?
        };
        Ok(BufWriter::new(file))
    }

    fn write_rows(&self, writer: &mut BufWriter<File>, rows: &[T]) -> Result<(), StorageError> {
        for row in rows {
            serde_json::to_writer(&mut *writer, row)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Append a single row to the file.
    pub fn append(&self, row: &T) -> Result<(), StorageError> {
        let mut writer = self.open(false)?;
        self.write_rows(&mut writer, std::slice::from_ref(row))?;
        debug!(path = ?self.path, "appended row");
        Ok(())
    }

    /// Append multiple rows to the file.
    pub fn append_batch(&self, rows: &[T]) -> Result<usize, StorageError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let mut writer = self.open(false)?;
        self.write_rows(&mut writer, rows)?;
        debug!(path = ?self.path, count = rows.len(), "appended rows");
        Ok(rows.len())
    }

    /// Write rows, replacing the entire file.
    pub fn write_all(&self, rows: &[T]) -> Result<usize, StorageError> {
        let mut writer = self.open(true)?;
        self.write_rows(&mut writer, rows)?;
        debug!(path = ?self.path, count = rows.len(), "rewrote table");
        Ok(rows.len())
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for a table.
    pub fn for_table(config: &StorageConfig, table: Table) -> Self {
        Self::new(config.table_path(table))
    }

    /// Read all rows. A table whose file does not exist yet is empty, not an
    /// error. Unparseable lines are skipped with a warning so one corrupt
    /// row cannot take the whole table down.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut rows = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(row) => rows.push(row),
                Err(e) => warn!(
                    path = ?self.path,
                    line = line_no + 1,
                    error = %e,
                    "skipping unparseable row"
                ),
            }
        }
        Ok(rows)
    }

    /// Read rows matching a predicate.
    pub fn read_filtered<F: Fn(&T) -> bool>(&self, predicate: F) -> Result<Vec<T>, StorageError> {
        Ok(self.read_all()?.into_iter().filter(|r| predicate(r)).collect())
    }
}
