//! Per-key registration metadata
//!
//! Stored by the key store as opaque bytes; the helper encodes it as JSON.

use crate::keystore::{KeyStoreError, Result};
use crate::websafe;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataWire {
    counter: u32,
    application_parameter: String,
}

/// Signature counter and owning relying party of a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationMetadata {
    pub counter: u32,
    pub application_parameter: Vec<u8>,
}

impl RegistrationMetadata {
    /// Metadata for a freshly registered key
    pub fn new(application_parameter: &[u8]) -> Self {
        Self {
            counter: 0,
            application_parameter: application_parameter.to_vec(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let wire = MetadataWire {
            counter: self.counter,
            application_parameter: websafe::encode(&self.application_parameter),
        };
        serde_json::to_vec(&wire).map_err(|e| KeyStoreError::Corrupt(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let wire: MetadataWire =
            serde_json::from_slice(bytes).map_err(|e| KeyStoreError::Corrupt(e.to_string()))?;
        let application_parameter = websafe::decode(&wire.application_parameter)
            .map_err(|e| KeyStoreError::Corrupt(format!("applicationParameter: {}", e)))?;
        Ok(Self {
            counter: wire.counter,
            application_parameter,
        })
    }

    /// Advance the counter by one
    pub fn advance(&mut self) -> Result<u32> {
        self.counter = self
            .counter
            .checked_add(1)
            .ok_or(KeyStoreError::CounterExhausted)?;
        Ok(self.counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_layout() {
        let metadata = RegistrationMetadata::new(&[0xff, 0xef, 0x00, 0x12]);
        let value: serde_json::Value = serde_json::from_slice(&metadata.to_bytes().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"counter": 0, "applicationParameter": "_-8AEg"})
        );
        assert_eq!(
            RegistrationMetadata::from_bytes(&metadata.to_bytes().unwrap()).unwrap(),
            metadata
        );
    }

    #[test]
    fn test_advance() {
        let mut metadata = RegistrationMetadata::new(&[1; 32]);
        assert_eq!(metadata.advance().unwrap(), 1);
        assert_eq!(metadata.advance().unwrap(), 2);

        metadata.counter = u32::MAX;
        assert!(matches!(metadata.advance(), Err(KeyStoreError::CounterExhausted)));
        assert_eq!(metadata.counter, u32::MAX);
    }

    #[test]
    fn test_corrupt() {
        assert!(matches!(
            RegistrationMetadata::from_bytes(b"not json"),
            Err(KeyStoreError::Corrupt(_))
        ));
        assert!(matches!(
            RegistrationMetadata::from_bytes(br#"{"counter":1,"applicationParameter":"!"}"#),
            Err(KeyStoreError::Corrupt(_))
        ));
    }
}
