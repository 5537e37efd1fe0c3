//! Idempotent merge of a run's records into the CSV store.
//!
//! The store is append-only: existing rows are never rewritten, so its row
//! count can only grow. A record is novel when its `(name, company)` key is
//! not already present. The read-check-append pass holds an exclusive lock on
//! the store file, so two concurrent runs cannot both decide the same record
//! is novel.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use bbts_core::{ListingKey, ListingRecord, StoreSchema};

use crate::error::StoreError;

/// What a merge did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOutcome {
    /// Rows appended (or written after the header, for a new store).
    pub written: usize,
    /// Records dropped because their key was already stored or appeared
    /// earlier in the same batch.
    pub skipped_duplicate: usize,
    /// The store did not exist (or was empty) and was created by this merge.
    pub created: bool,
}

impl MergeOutcome {
    /// `true` when the store is byte-for-byte what it was before the merge.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.written == 0 && !self.created
    }
}

/// Merges `records` into the store at `path`.
///
/// - Missing or zero-length store: writes the `schema` header, then every
///   record (a batch with no records still produces a headered file).
/// - Existing store: validates its header against `schema`, then appends
///   only records whose key is not already stored.
///
/// Duplicate keys within `records` are collapsed; the first occurrence wins.
///
/// # Errors
///
/// - [`StoreError::SchemaMismatch`]: the stored header differs from `schema`.
///   Nothing is written.
/// - [`StoreError::Csv`]: an existing row cannot be parsed (including rows
///   whose width differs from the header).
/// - [`StoreError::Lock`] / [`StoreError::Io`]: filesystem failures.
pub fn merge_into_store(
    path: &Path,
    schema: StoreSchema,
    records: &[ListingRecord],
) -> Result<MergeOutcome, StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(io_err)?;

    file.lock().map_err(|source| StoreError::Lock {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "acquired store lock");

    let len = file.metadata().map_err(io_err)?.len();
    let outcome = if len == 0 {
        create_store(&file, path, schema, records)?
    } else {
        append_novel(&file, path, schema, records)?
    };

    tracing::info!(
        path = %path.display(),
        written = outcome.written,
        skipped_duplicate = outcome.skipped_duplicate,
        created = outcome.created,
        "merged records into store"
    );

    // The lock is released when `file` is dropped.
    Ok(outcome)
}

fn create_store(
    file: &File,
    path: &Path,
    schema: StoreSchema,
    records: &[ListingRecord],
) -> Result<MergeOutcome, StoreError> {
    let mut seen = HashSet::new();
    let (novel, skipped_duplicate) = partition_novel(records, &mut seen);

    tracing::info!(path = %path.display(), %schema, "creating store");
    write_rows(file, path, schema, Some(schema.headers()), &novel)?;

    Ok(MergeOutcome {
        written: novel.len(),
        skipped_duplicate,
        created: true,
    })
}

fn append_novel(
    file: &File,
    path: &Path,
    schema: StoreSchema,
    records: &[ListingRecord],
) -> Result<MergeOutcome, StoreError> {
    let mut seen = read_existing_keys(file, path, schema)?;
    let existing = seen.len();
    let (novel, skipped_duplicate) = partition_novel(records, &mut seen);

    tracing::debug!(
        existing_keys = existing,
        candidates = records.len(),
        novel = novel.len(),
        "computed novel records"
    );

    if novel.is_empty() {
        return Ok(MergeOutcome {
            written: 0,
            skipped_duplicate,
            created: false,
        });
    }

    ensure_trailing_newline(file, path)?;
    write_rows(file, path, schema, None, &novel)?;

    Ok(MergeOutcome {
        written: novel.len(),
        skipped_duplicate,
        created: false,
    })
}

/// Reads the store's header and every row's key. The header must match
/// `schema` exactly, column for column.
fn read_existing_keys(
    file: &File,
    path: &Path,
    schema: StoreSchema,
) -> Result<HashSet<ListingKey>, StoreError> {
    let csv_err = |source: csv::Error| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut handle = file;
    handle.seek(SeekFrom::Start(0)).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(handle);

    let header = reader.headers().map_err(csv_err)?;
    if !header.iter().eq(schema.headers().iter().copied()) {
        return Err(StoreError::SchemaMismatch {
            path: path.to_path_buf(),
            expected: schema.headers().join(","),
            found: header.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut keys = HashSet::new();
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        let name = row.get(StoreSchema::NAME_COLUMN).unwrap_or_default();
        let company = row.get(StoreSchema::COMPANY_COLUMN).unwrap_or_default();
        keys.insert(ListingKey::new(name, company));
    }
    Ok(keys)
}

/// Splits `records` into those whose key is not yet in `seen` (inserting
/// them) and a count of the rest.
fn partition_novel<'a>(
    records: &'a [ListingRecord],
    seen: &mut HashSet<ListingKey>,
) -> (Vec<&'a ListingRecord>, usize) {
    let mut novel = Vec::new();
    let mut skipped = 0usize;
    for record in records {
        if seen.insert(record.key()) {
            novel.push(record);
        } else {
            skipped += 1;
        }
    }
    (novel, skipped)
}

/// A store last written by another tool may lack a final newline; appending
/// straight after it would glue the first new row onto the last old one.
fn ensure_trailing_newline(file: &File, path: &Path) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut handle = file;
    handle.seek(SeekFrom::End(-1)).map_err(io_err)?;
    let mut last = [0u8; 1];
    handle.read_exact(&mut last).map_err(io_err)?;
    if last[0] != b'\n' {
        handle.write_all(b"\n").map_err(io_err)?;
    }
    Ok(())
}

fn write_rows(
    file: &File,
    path: &Path,
    schema: StoreSchema,
    header: Option<&[&str]>,
    rows: &[&ListingRecord],
) -> Result<(), StoreError> {
    let csv_err = |source: csv::Error| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if let Some(header) = header {
        writer.write_record(header).map_err(csv_err)?;
    }
    for record in rows {
        writer.write_record(record.to_row(schema)).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    drop(writer);

    file.sync_data().map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
