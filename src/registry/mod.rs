//! Durable record of completed downloads.
//!
//! The registry maps an item identity (its source URL) to the output path it
//! was saved as. It is loaded fully into memory when opened and every new
//! entry is appended to the backing CSV file and flushed before `add`
//! returns. The file is never rewritten or compacted.
//!
//! # Ownership
//!
//! - [`Registry`] owns the append handle. Mutation needs `&mut self`, so a
//!   single owner (the download manager's aggregation task) is the only
//!   writer and no internal lock is needed around the file.
//! - [`RegistryIndex`] is a cheap, cloneable read view of the same entries
//!   that any task may query with [`RegistryIndex::exists`]. It observes the
//!   entries loaded at open time plus every `add` that has already returned.
//!
//! # Backing format
//!
//! Two columns, no header: `identity,output_path`. Rows with any other
//! column count are skipped with a warning when loading.

mod error;

pub use error::RegistryError;

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, instrument, warn};

/// Number of columns in a well-formed registry row.
const RECORD_COLUMNS: usize = 2;

/// Backing store formats, selected by registry file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryFormat {
    /// Comma separated `identity,output_path` rows.
    Csv,
}

impl RegistryFormat {
    /// Selects the backing format for `path` from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnsupportedFormat`] for anything but `.csv`.
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            _ => Err(RegistryError::unsupported_format(path, extension)),
        }
    }
}

/// Shared read-only view of the registry entries.
#[derive(Debug, Clone, Default)]
pub struct RegistryIndex {
    entries: Arc<DashMap<String, PathBuf>>,
}

impl RegistryIndex {
    /// Returns true if `key` has a completed download recorded.
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the recorded output path for `key`.
    #[must_use]
    pub fn output_path(&self, key: &str) -> Option<PathBuf> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Returns the number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or replaces the entry for `key`.
    fn upsert(&self, key: &str, output_path: &Path) {
        self.entries
            .insert(key.to_string(), output_path.to_path_buf());
    }

    /// Inserts unless the key is present. Returns true when inserted.
    fn insert_new(&self, key: &str, output_path: &Path) -> bool {
        match self.entries.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(output_path.to_path_buf());
                true
            }
        }
    }
}

/// Persistent identity -> output path registry with an append-only CSV store.
pub struct Registry {
    path: PathBuf,
    index: RegistryIndex,
    file: File,
    // Set when an append failed part way; the next append starts a new row.
    torn_tail: bool,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("path", &self.path)
            .field("entries", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Opens the registry at `path`, loading every well-formed row.
    ///
    /// A missing file is created. Malformed rows are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnsupportedFormat`] if the extension is not
    /// `.csv`, or [`RegistryError::Io`] if the file cannot be read or opened
    /// for appending.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        RegistryFormat::from_path(path)?;

        let index = RegistryIndex::default();
        let skipped = load_entries(path, &index)?;

        let mut file = open_for_append(path)?;
        terminate_last_row(&mut file, path)?;

        info!(
            path = %path.display(),
            entries = index.len(),
            skipped,
            "registry opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            index,
            file,
            torn_tail: false,
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a read view that stays in sync with later `add` calls.
    #[must_use]
    pub fn index(&self) -> RegistryIndex {
        self.index.clone()
    }

    /// Returns true if `key` has a completed download recorded.
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.index.exists(key)
    }

    /// Records a completed download and flushes it to disk before returning.
    ///
    /// Entries are never overwritten: adding a key that is already present
    /// leaves the first entry in place and returns `Ok(false)`.
    ///
    /// Each record is encoded in full before it touches the file, so a failed
    /// add never leaves bytes behind for a later add to write out.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the record cannot be encoded, written or
    /// synced. The in-memory index is only updated after the write succeeds.
    pub fn add(&mut self, key: &str, output_path: &Path) -> Result<bool, RegistryError> {
        if self.index.exists(key) {
            debug!(key, "registry already has entry, keeping the first one");
            return Ok(false);
        }

        let output = output_path.to_string_lossy();
        let record =
            encode_record(key, output.as_ref()).map_err(|e| RegistryError::write(&self.path, e))?;
        if self.torn_tail {
            terminate_last_row(&mut self.file, &self.path)?;
            self.torn_tail = false;
        }
        if let Err(e) = self.append(&record) {
            self.torn_tail = true;
            return Err(e);
        }

        self.index.insert_new(key, output_path);
        debug!(key, path = %output_path.display(), "registry entry added");
        Ok(true)
    }

    /// Flushes and releases the backing file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] if the final flush fails.
    pub fn close(mut self) -> Result<(), RegistryError> {
        self.sync()?;
        debug!(path = %self.path.display(), entries = self.index.len(), "registry closed");
        Ok(())
    }

    fn append(&mut self, record: &[u8]) -> Result<(), RegistryError> {
        self.file
            .write_all(record)
            .map_err(|e| RegistryError::io(&self.path, e))?;
        self.sync()
    }

    fn sync(&mut self) -> Result<(), RegistryError> {
        self.file
            .sync_data()
            .map_err(|e| RegistryError::io(&self.path, e))
    }

    /// Swaps the backing handle, returning the previous one.
    #[cfg(test)]
    pub(crate) fn replace_file(&mut self, file: File) -> File {
        std::mem::replace(&mut self.file, file)
    }
}

/// Encodes one `identity,output_path` row, quoting fields as needed.
fn encode_record(key: &str, output: &str) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record([key, output])?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Loads rows from `path` into `index`, returning the number of skipped rows.
///
/// A key listed more than once maps to its last row.
fn load_entries(path: &Path, index: &RegistryIndex) -> Result<usize, RegistryError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(RegistryError::io(path, e)),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut skipped = 0;
    for record in reader.records() {
        match record {
            Ok(row) if row.len() == RECORD_COLUMNS => {
                index.upsert(&row[0], Path::new(&row[1]));
            }
            Ok(row) => {
                skipped += 1;
                warn!(
                    path = %path.display(),
                    line = row.position().map(csv::Position::line),
                    columns = row.len(),
                    row = ?row,
                    "skipping malformed registry row"
                );
            }
            Err(e) if e.is_io_error() => {
                return Err(RegistryError::io(
                    path,
                    std::io::Error::other(e.to_string()),
                ));
            }
            Err(e) => {
                skipped += 1;
                warn!(path = %path.display(), error = %e, "skipping unreadable registry row");
            }
        }
    }
    Ok(skipped)
}

fn open_for_append(path: &Path) -> Result<File, RegistryError> {
    let mut options = OpenOptions::new();
    options.read(true).append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o660);
    }
    options.open(path).map_err(|e| RegistryError::io(path, e))
}

/// Appends a newline if the file does not already end with one, so the next
/// record starts on its own row.
fn terminate_last_row(file: &mut File, path: &Path) -> Result<(), RegistryError> {
    let len = file
        .metadata()
        .map_err(|e| RegistryError::io(path, e))?
        .len();
    if len == 0 {
        return Ok(());
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))
        .and_then(|_| file.read_exact(&mut last))
        .map_err(|e| RegistryError::io(path, e))?;
    if last[0] != b'\n' {
        debug!(path = %path.display(), "registry file lacks trailing newline, terminating last row");
        file.write_all(b"\n")
            .map_err(|e| RegistryError::io(path, e))?;
    }
    Ok(())
}
