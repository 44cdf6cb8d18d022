//! The ACL store contract (component G) and two backends.
//!
//! The original five-function contract (`open`/`close`/`count`/`put`/`get`)
//! collapses here into the usual Rust idiom: a backend-specific
//! constructor stands in for `open`, `Drop` (plus, for `FileStore`, the
//! fact every `put` is written through immediately) stands in for
//! `close`, and `count`/`put`/`get` remain trait methods. `iter_entries`
//! is an addition beyond the original contract, for a future dump
//! front-end to use.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("store file is corrupt: {0}")]
    Corrupt(String),
}

type Key = (Vec<u8>, Vec<u8>);

/// A keyed store mapping `(remote-selector bytes, local-core-id bytes)` to
/// rule bytes.
///
/// A later `put` with the same key replaces an earlier one — this is an
/// explicit requirement on every backend, not just an accident of how a
/// particular one happens to scan its entries.
pub trait AclStore {
    fn put(&mut self, remote_selector: &[u8], local_core_id: &[u8], rule: &[u8]) -> Result<(), StoreError>;

    fn get(&self, remote_selector: &[u8], local_core_id: &[u8]) -> Result<Option<&[u8]>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;

    /// Every `(remote_selector, local_core_id, rule)` triple currently in
    /// the store, in unspecified order.
    fn iter_entries(&self) -> Box<dyn Iterator<Item = (&[u8], &[u8], &[u8])> + '_>;
}

/// The in-memory reference backend: a `HashMap` keyed on the exact
/// `(remote_selector, local_core_id)` pair. Used pervasively in tests and
/// as `FileStore`'s in-memory index.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<Key, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AclStore for MemoryStore {
    fn put(&mut self, remote_selector: &[u8], local_core_id: &[u8], rule: &[u8]) -> Result<(), StoreError> {
        self.entries
            .insert((remote_selector.to_vec(), local_core_id.to_vec()), rule.to_vec());
        Ok(())
    }

    fn get(&self, remote_selector: &[u8], local_core_id: &[u8]) -> Result<Option<&[u8]>, StoreError> {
        let key = (remote_selector.to_vec(), local_core_id.to_vec());
        Ok(self.entries.get(&key).map(Vec::as_slice))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.entries.len())
    }

    fn iter_entries(&self) -> Box<dyn Iterator<Item = (&[u8], &[u8], &[u8])> + '_> {
        Box::new(
            self.entries
                .iter()
                .map(|((sel, id), rule)| (sel.as_slice(), id.as_slice(), rule.as_slice())),
        )
    }
}

/// A simple on-disk backend: every `put` is appended to `path` as a
/// length-prefixed record (three little-endian `u32` lengths, then the
/// three byte strings back to back), and `open` replays the whole file to
/// rebuild an in-memory index. There is no compaction — a key written many
/// times accumulates one record per write — which is the trade the loader
/// makes in exchange for "rebuild the cache" being nothing more than
/// deleting the file.
#[derive(Debug)]
pub struct FileStore {
    file: File,
    path: PathBuf,
    index: MemoryStore,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().create(true).read(true).append(true).open(&path)?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        let mut index = MemoryStore::new();
        let mut cursor = 0usize;
        while cursor < contents.len() {
            let (sel, id, rule, next) = read_record(&contents, cursor)?;
            index.put(sel, id, rule)?;
            cursor = next;
        }

        Ok(Self { file, path, index })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_record(buf: &[u8], at: usize) -> Result<(&[u8], &[u8], &[u8], usize), StoreError> {
    let lens = read_three_lengths(buf, at)?;
    let (sel_len, id_len, rule_len) = lens;
    let header_end = at + 12;
    let sel_end = header_end + sel_len;
    let id_end = sel_end + id_len;
    let rule_end = id_end + rule_len;
    if rule_end > buf.len() {
        return Err(StoreError::Corrupt("record length runs past end of file".into()));
    }
    Ok((&buf[header_end..sel_end], &buf[sel_end..id_end], &buf[id_end..rule_end], rule_end))
}

fn read_three_lengths(buf: &[u8], at: usize) -> Result<(usize, usize, usize), StoreError> {
    if at + 12 > buf.len() {
        return Err(StoreError::Corrupt("truncated record header".into()));
    }
    let read_u32 = |off: usize| -> u32 {
        u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
    };
    Ok((read_u32(at) as usize, read_u32(at + 4) as usize, read_u32(at + 8) as usize))
}

fn write_record(file: &mut File, remote_selector: &[u8], local_core_id: &[u8], rule: &[u8]) -> Result<(), StoreError> {
    let mut header = Vec::with_capacity(12);
    header.extend_from_slice(&(remote_selector.len() as u32).to_le_bytes());
    header.extend_from_slice(&(local_core_id.len() as u32).to_le_bytes());
    header.extend_from_slice(&(rule.len() as u32).to_le_bytes());
    file.write_all(&header)?;
    file.write_all(remote_selector)?;
    file.write_all(local_core_id)?;
    file.write_all(rule)?;
    file.flush()?;
    Ok(())
}

impl AclStore for FileStore {
    fn put(&mut self, remote_selector: &[u8], local_core_id: &[u8], rule: &[u8]) -> Result<(), StoreError> {
        write_record(&mut self.file, remote_selector, local_core_id, rule)?;
        self.index.put(remote_selector, local_core_id, rule)
    }

    fn get(&self, remote_selector: &[u8], local_core_id: &[u8]) -> Result<Option<&[u8]>, StoreError> {
        self.index.get(remote_selector, local_core_id)
    }

    fn count(&self) -> Result<usize, StoreError> {
        self.index.count()
    }

    fn iter_entries(&self) -> Box<dyn Iterator<Item = (&[u8], &[u8], &[u8])> + '_> {
        self.index.iter_entries()
    }
}

/// Removes the backing file. Exposed for the loader's cache-invalidation
/// path; dropping a `FileStore` leaves the file on disk.
pub fn remove_file_store(path: impl AsRef<Path>) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
