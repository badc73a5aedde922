//! File-backed [`PersistentKv`] store.
//!
//! Values are byte strings kept hex-encoded in a flat TOML table, so the
//! file stays readable and hand-editable:
//!
//! ```toml
//! device_id = "0a1b2c3d4e5f"
//! run_in_background = "01"
//! ```
//!
//! The whole table is cached in memory and rewritten on every `set`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use crate::application::collaborators::{PersistentKv, StorageError};

pub const STATE_FILE_NAME: &str = "state.toml";

#[derive(Debug)]
pub struct TomlKvStore {
    path: PathBuf,
    cache: Mutex<BTreeMap<String, String>>,
}

impl TomlKvStore {
    /// Opens the store at `path`.  A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be read and
    /// [`StorageError::Parse`] if it is not a TOML table of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let cache = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        Ok(Self {
            path,
            cache: Mutex::new(cache),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, table: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string(table)?;
        std::fs::write(&self.path, content).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl PersistentKv for TomlKvStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let cache = self.cache.lock().ok()?;
        let value = cache.get(key)?;
        let decoded = decode_hex(value);
        if decoded.is_none() {
            warn!("{}", StorageError::Corrupt { key: key.to_string() });
        }
        decoded
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut cache = self.cache.lock().map_err(|_| StorageError::Corrupt {
            key: key.to_string(),
        })?;
        cache.insert(key.to_string(), encode_hex(value));
        self.persist(&cache)
    }
}

// ── Hex ───────────────────────────────────────────────────────────────────────

fn encode_hex(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(DIGITS[usize::from(b >> 4)] as char);
        out.push(DIGITS[usize::from(b & 0x0F)] as char);
    }
    out
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    text.as_bytes()
        .chunks(2)
        .map(|pair| {
            let hi = char::from(pair[0]).to_digit(16)?;
            let lo = char::from(pair[1]).to_digit(16)?;
            u8::try_from(hi << 4 | lo).ok()
        })
        .collect()
}
