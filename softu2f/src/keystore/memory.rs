use super::{always_accept, GeneratedKey, KeyStore, KeyStoreError, Result, UpCallback};

use softu2f_crypto::KeyPair;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

struct Entry {
    key: KeyPair,
    metadata: Vec<u8>,
}

/// In-process key store
///
/// The mutex makes metadata updates atomic within one process. Nothing is
/// persisted.
pub struct MemoryKeyStore {
    namespace: String,
    entries: Mutex<HashMap<Vec<u8>, Entry>>,
    up: UpCallback,
}

impl MemoryKeyStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_presence(namespace, always_accept())
    }

    pub fn with_presence(namespace: impl Into<String>, up: UpCallback) -> Self {
        Self {
            namespace: namespace.into(),
            entries: Mutex::new(HashMap::new()),
            up,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Remove a key; returns whether it existed
    pub fn delete(&self, fingerprint: &[u8]) -> Result<bool> {
        Ok(self.lock()?.remove(fingerprint).is_some())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Vec<u8>, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| KeyStoreError::Corrupt("key store lock poisoned".to_string()))
    }
}

impl KeyStore for MemoryKeyStore {
    type KeyRef = KeyPair;

    fn generate_key(&self, metadata: &[u8]) -> Result<GeneratedKey> {
        let key = KeyPair::generate();
        let generated = GeneratedKey {
            fingerprint: key.fingerprint(),
            public_key: key.public_key(),
        };

        self.lock()?.insert(
            generated.fingerprint.clone(),
            Entry {
                key,
                metadata: metadata.to_vec(),
            },
        );
        Ok(generated)
    }

    fn find_key(&self, fingerprint: &[u8]) -> Result<KeyPair> {
        self.lock()?
            .get(fingerprint)
            .map(|entry| entry.key.clone())
            .ok_or(KeyStoreError::NotFound)
    }

    fn sign(&self, data: &[u8], key: &KeyPair) -> Result<Vec<u8>> {
        (self.up)("authenticate").into_result()?;
        Ok(key.sign(data))
    }

    fn metadata(&self, fingerprint: &[u8]) -> Result<Vec<u8>> {
        self.lock()?
            .get(fingerprint)
            .map(|entry| entry.metadata.clone())
            .ok_or(KeyStoreError::NotFound)
    }

    fn set_metadata(&self, fingerprint: &[u8], metadata: &[u8]) -> Result<()> {
        let mut entries = self.lock()?;
        let entry = entries.get_mut(fingerprint).ok_or(KeyStoreError::NotFound)?;
        entry.metadata = metadata.to_vec();
        Ok(())
    }

    fn update_metadata(
        &self,
        fingerprint: &[u8],
        update: &mut dyn FnMut(&[u8]) -> Result<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let mut entries = self.lock()?;
        let entry = entries.get_mut(fingerprint).ok_or(KeyStoreError::NotFound)?;
        let updated = update(&entry.metadata)?;
        entry.metadata = updated.clone();
        Ok(updated)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::UpResult;
    use softu2f_crypto::verify;
    use std::sync::Arc;

    #[test]
    fn test_generate_and_find() {
        let store = MemoryKeyStore::new("SoftU2F Tests");
        assert_eq!(store.count().unwrap(), 0);

        let generated = store.generate_key(b"meta").unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(generated.public_key.len(), 65);

        let key = store.find_key(&generated.fingerprint).unwrap();
        assert_eq!(key.public_key(), generated.public_key);
        assert_eq!(store.metadata(&generated.fingerprint).unwrap(), b"meta".to_vec());
    }

    #[test]
    fn test_unknown_fingerprint() {
        let store = MemoryKeyStore::new("SoftU2F Tests");
        assert!(matches!(store.find_key(b"missing"), Err(KeyStoreError::NotFound)));
        assert!(matches!(store.metadata(b"missing"), Err(KeyStoreError::NotFound)));
        assert!(matches!(
            store.set_metadata(b"missing", b""),
            Err(KeyStoreError::NotFound)
        ));
    }

    #[test]
    fn test_sign_verify() {
        let store = MemoryKeyStore::new("SoftU2F Tests");
        let generated = store.generate_key(b"").unwrap();
        let key = store.find_key(&generated.fingerprint).unwrap();

        let signature = store.sign(b"hello, world!", &key).unwrap();
        assert!(verify(&generated.public_key, b"hello, world!", &signature).is_ok());
    }

    #[test]
    fn test_sign_denied() {
        let store =
            MemoryKeyStore::with_presence("SoftU2F Tests", Arc::new(|_| UpResult::Denied));
        let generated = store.generate_key(b"").unwrap();
        let key = store.find_key(&generated.fingerprint).unwrap();
        assert!(matches!(
            store.sign(b"data", &key),
            Err(KeyStoreError::UserCancelled)
        ));
    }

    #[test]
    fn test_update_metadata() {
        let store = MemoryKeyStore::new("SoftU2F Tests");
        let generated = store.generate_key(b"1").unwrap();

        let updated = store
            .update_metadata(&generated.fingerprint, &mut |current| {
                let mut next = current.to_vec();
                next.push(b'2');
                Ok(next)
            })
            .unwrap();
        assert_eq!(updated, b"12".to_vec());
        assert_eq!(store.metadata(&generated.fingerprint).unwrap(), b"12".to_vec());

        // A failed update leaves the metadata untouched
        let result = store.update_metadata(&generated.fingerprint, &mut |_| {
            Err(KeyStoreError::CounterExhausted)
        });
        assert!(result.is_err());
        assert_eq!(store.metadata(&generated.fingerprint).unwrap(), b"12".to_vec());
    }

    #[test]
    fn test_delete() {
        let store = MemoryKeyStore::new("SoftU2F Tests");
        let generated = store.generate_key(b"").unwrap();
        assert!(store.delete(&generated.fingerprint).unwrap());
        assert!(!store.delete(&generated.fingerprint).unwrap());
        assert_eq!(store.count().unwrap(), 0);
    }
}
