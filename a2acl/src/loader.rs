//! Policy-file loading (component I): turns a text policy file into a
//! populated store, with an mtime-keyed on-disk cache so repeated loads of
//! an unchanged file skip re-parsing.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

use a2id_types::{A2Id, ParseError};

use crate::parser::{parse, ParseMode};
use crate::policy::{parse_policy_line, PolicyLineError};
use crate::store::{AclStore, FileStore, StoreError};

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("I/O error reading {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed policy line {line} in {path:?}: {source}")]
    Policy {
        path: PathBuf,
        line: usize,
        #[source]
        source: PolicyLineError,
    },
    #[error("invalid remote selector on line {line} in {path:?}: {source}")]
    InvalidSelector {
        path: PathBuf,
        line: usize,
        #[source]
        source: ParseError,
    },
    #[error("invalid local identifier on line {line} in {path:?}: {source}")]
    InvalidLocalId {
        path: PathBuf,
        line: usize,
        #[source]
        source: ParseError,
    },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

fn cache_path_for(policy_path: &Path) -> PathBuf {
    let mut cache = policy_path.as_os_str().to_owned();
    cache.push(".db");
    PathBuf::from(cache)
}

fn mtime(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// True if `cache` is missing, or is older than `source`. A `FileStore`'s
/// cache is never more authoritative than the policy text that produced
/// it, so any ambiguity (an unreadable cache, an unreadable source) is
/// treated as "stale" rather than risking a silently out of date load.
fn is_stale(source: &Path, cache: &Path) -> bool {
    let source_mtime = match mtime(source) {
        Ok(t) => t,
        Err(_) => return true,
    };
    let cache_mtime = match mtime(cache) {
        Ok(t) => t,
        Err(_) => return true,
    };
    cache_mtime < source_mtime
}

/// Loads `policy_path` into a [`FileStore`], rebuilding the `<policy_path>.db`
/// cache whenever it is missing or older than the policy file. Returns the
/// store and the number of entries it now holds.
///
/// Per the original semantics, the first malformed line aborts the whole
/// load — a half-applied policy file is worse than none.
pub fn load(policy_path: impl AsRef<Path>) -> Result<(FileStore, usize), LoaderError> {
    let policy_path = policy_path.as_ref();
    let cache_path = cache_path_for(policy_path);

    if is_stale(policy_path, &cache_path) {
        log::debug!("loader: cache {:?} stale or missing, rebuilding from {:?}", cache_path, policy_path);
        crate::store::remove_file_store(&cache_path).map_err(|source| LoaderError::Io {
            path: cache_path.clone(),
            source,
        })?;
        let mut store = FileStore::open(&cache_path)?;
        let count = load_from_path(policy_path, &mut store)?;
        Ok((store, count))
    } else {
        log::debug!("loader: reusing cache {:?}", cache_path);
        let store = FileStore::open(&cache_path)?;
        let count = store.count()?;
        Ok((store, count))
    }
}

fn load_from_path(policy_path: &Path, store: &mut dyn AclStore) -> Result<usize, LoaderError> {
    let file = fs::File::open(policy_path).map_err(|source| LoaderError::Io {
        path: policy_path.to_path_buf(),
        source,
    })?;
    load_from_reader(BufReader::new(file), policy_path, store)
}

fn load_from_reader(reader: impl BufRead, policy_path: &Path, store: &mut dyn AclStore) -> Result<usize, LoaderError> {
    let mut count = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.map_err(|source| LoaderError::Io {
            path: policy_path.to_path_buf(),
            source,
        })?;
        if line.is_empty() {
            continue;
        }

        let parsed = parse_policy_line(line.as_bytes()).map_err(|source| LoaderError::Policy {
            path: policy_path.to_path_buf(),
            line: line_no,
            source,
        })?;

        let selector = parse(parsed.remote_selector, ParseMode::Selector).map_err(|source| LoaderError::InvalidSelector {
            path: policy_path.to_path_buf(),
            line: line_no,
            source,
        })?;
        let local: A2Id = parse(parsed.local_id, ParseMode::Identifier).map_err(|source| LoaderError::InvalidLocalId {
            path: policy_path.to_path_buf(),
            line: line_no,
            source,
        })?;

        store.put(selector.as_bytes(), &local.core_form(), parsed.rule)?;
        count += 1;
    }
    log::debug!("loader: loaded {count} entries from {:?}", policy_path);
    Ok(count)
}
