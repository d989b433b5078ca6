//! Directory-backed key store
//!
//! Layout: `<store_dir>/<namespace>/<fingerprint>.json`, one record per key.
//! Metadata updates hold an exclusive advisory lock on `<fingerprint>.lock`
//! so helper processes running at the same time never interleave a
//! read-modify-write on the same key. The operating system drops the lock
//! when its holder exits, so a lock file left behind by a crash never blocks
//! later callers. Records are replaced by write-then-rename and, on Unix,
//! are readable by the owner only.

use super::{always_accept, GeneratedKey, KeyStore, KeyStoreError, Result, UpCallback};
use crate::websafe;

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use softu2f_crypto::KeyPair;

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

const RECORD_EXTENSION: &str = "json";
const LOCK_EXTENSION: &str = "lock";

/// How long to wait for another process to release a key
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(10);

#[cfg(unix)]
const FILE_MODE: u32 = 0o600;
#[cfg(unix)]
const DIR_MODE: u32 = 0o700;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredKey {
    private_key: String,
    metadata: String,
}

/// Exclusive advisory lock on one key, released on drop
///
/// The lock file itself is never removed; only the lock held on it matters.
struct KeyLock {
    file: File,
}

impl KeyLock {
    fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        let file = private_file(OpenOptions::new().write(true).create(true)).open(path)?;
        let contended = fs2::lock_contended_error().kind();
        let deadline = Instant::now() + timeout;
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => return Ok(Self { file }),
                Err(e) if e.kind() == contended => {
                    if Instant::now() >= deadline {
                        return Err(KeyStoreError::Busy);
                    }
                    thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for KeyLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("failed to release key lock: {}", e);
        }
    }
}

/// Restrict newly created files to the owner
#[cfg(unix)]
fn private_file(options: &mut OpenOptions) -> &mut OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(FILE_MODE)
}

#[cfg(not(unix))]
fn private_file(options: &mut OpenOptions) -> &mut OpenOptions {
    options
}

#[cfg(unix)]
fn create_private_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(DIR_MODE).create(path)
}

#[cfg(not(unix))]
fn create_private_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Map a namespace onto a single path component
fn namespace_dir(namespace: &str) -> String {
    namespace
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Key store persisted as one JSON file per key
pub struct FileKeyStore {
    root: PathBuf,
    lock_timeout: Duration,
    up: UpCallback,
}

impl FileKeyStore {
    /// Open (creating if needed) the namespace directory under `store_dir`
    pub fn open(store_dir: &Path, namespace: &str) -> Result<Self> {
        Self::with_presence(store_dir, namespace, always_accept())
    }

    pub fn with_presence(store_dir: &Path, namespace: &str, up: UpCallback) -> Result<Self> {
        let root = store_dir.join(namespace_dir(namespace));
        create_private_dir(&root)?;
        log::debug!("key store at {}", root.display());
        Ok(Self {
            root,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            up,
        })
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove a key; returns whether it existed
    pub fn delete(&self, fingerprint: &[u8]) -> Result<bool> {
        let _lock = self.lock(fingerprint)?;
        match fs::remove_file(self.record_path(fingerprint)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn path_with(&self, fingerprint: &[u8], extension: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", websafe::encode(fingerprint), extension))
    }

    fn record_path(&self, fingerprint: &[u8]) -> PathBuf {
        self.path_with(fingerprint, RECORD_EXTENSION)
    }

    fn lock(&self, fingerprint: &[u8]) -> Result<KeyLock> {
        KeyLock::acquire(&self.path_with(fingerprint, LOCK_EXTENSION), self.lock_timeout)
    }

    fn check_root(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(KeyStoreError::Gone(format!(
                "{} no longer exists",
                self.root.display()
            )));
        }
        Ok(())
    }

    fn read(&self, fingerprint: &[u8]) -> Result<StoredKey> {
        self.check_root()?;
        let raw = match fs::read(self.record_path(fingerprint)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(KeyStoreError::NotFound),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&raw).map_err(|e| KeyStoreError::Corrupt(e.to_string()))
    }

    fn write(&self, fingerprint: &[u8], record: &StoredKey) -> Result<()> {
        self.check_root()?;
        let path = self.record_path(fingerprint);
        let tmp = path.with_extension(format!("tmp{}", std::process::id()));

        let body = serde_json::to_vec(record).map_err(|e| KeyStoreError::Corrupt(e.to_string()))?;
        let mut file = private_file(OpenOptions::new().write(true).create(true).truncate(true))
            .open(&tmp)?;
        file.write_all(&body)?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn decode_field(value: &str, field: &str) -> Result<Vec<u8>> {
        websafe::decode(value).map_err(|e| KeyStoreError::Corrupt(format!("{}: {}", field, e)))
    }
}

impl KeyStore for FileKeyStore {
    type KeyRef = KeyPair;

    fn generate_key(&self, metadata: &[u8]) -> Result<GeneratedKey> {
        let key = KeyPair::generate();
        let generated = GeneratedKey {
            fingerprint: key.fingerprint(),
            public_key: key.public_key(),
        };

        let record = StoredKey {
            private_key: websafe::encode(&key.secret_bytes()),
            metadata: websafe::encode(metadata),
        };
        self.write(&generated.fingerprint, &record)?;
        Ok(generated)
    }

    fn find_key(&self, fingerprint: &[u8]) -> Result<KeyPair> {
        let record = self.read(fingerprint)?;
        let key =
            KeyPair::from_secret_bytes(&Self::decode_field(&record.private_key, "privateKey")?)?;
        if key.fingerprint() != fingerprint {
            return Err(KeyStoreError::Corrupt(
                "fingerprint does not match stored key".to_string(),
            ));
        }
        Ok(key)
    }

    fn sign(&self, data: &[u8], key: &KeyPair) -> Result<Vec<u8>> {
        (self.up)("authenticate").into_result()?;
        Ok(key.sign(data))
    }

    fn metadata(&self, fingerprint: &[u8]) -> Result<Vec<u8>> {
        let record = self.read(fingerprint)?;
        Self::decode_field(&record.metadata, "metadata")
    }

    fn set_metadata(&self, fingerprint: &[u8], metadata: &[u8]) -> Result<()> {
        self.update_metadata(fingerprint, &mut |_| Ok(metadata.to_vec()))
            .map(|_| ())
    }

    fn update_metadata(
        &self,
        fingerprint: &[u8],
        update: &mut dyn FnMut(&[u8]) -> Result<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let _lock = self.lock(fingerprint)?;
        let mut record = self.read(fingerprint)?;
        let current = Self::decode_field(&record.metadata, "metadata")?;

        let updated = update(&current)?;
        record.metadata = websafe::encode(&updated);
        self.write(fingerprint, &record)?;
        Ok(updated)
    }

    fn count(&self) -> Result<usize> {
        self.check_root()?;
        let mut count = 0;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == RECORD_EXTENSION) {
                count += 1;
            }
        }
        Ok(count)
    }
}
