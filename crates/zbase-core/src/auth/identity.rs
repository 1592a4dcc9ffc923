//! Identity files: a user id with its key pair

use std::fmt;
use std::path::Path;

use p256::ecdsa::{SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use super::keys::{decode_private_key, decode_public_key, encode_private_key, encode_public_key};
use crate::error::Error;
use crate::Result;

/// On-disk form
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdentityDefinition {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    pub_key: String,
    priv_key: String,
}

/// A user id together with the keys that sign its requests
#[derive(Clone)]
pub struct Identity {
    pub id: String,
    pub parent_id: Option<String>,
    pub signing_key: SigningKey,
    pub verifying_key: VerifyingKey,
}

impl Identity {
    pub fn new(id: impl Into<String>, parent_id: Option<String>, signing_key: SigningKey) -> Self {
        let verifying_key = VerifyingKey::from(&signing_key);
        Self {
            id: id.into(),
            parent_id,
            signing_key,
            verifying_key,
        }
    }

    /// Fresh identity with a random key pair
    pub fn generate(id: impl Into<String>, parent_id: Option<String>) -> Self {
        let (signing_key, _) = super::generate_key_pair();
        Self::new(id, parent_id, signing_key)
    }

    pub fn public_key_pem(&self) -> Result<String> {
        encode_public_key(&self.verifying_key)
    }

    /// Load an identity file, rejecting a public key that does not match the private key
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let def: IdentityDefinition = serde_json::from_str(&content)?;

        let signing_key = decode_private_key(&def.priv_key)?;
        let verifying_key = decode_public_key(&def.pub_key)?;
        if VerifyingKey::from(&signing_key) != verifying_key {
            return Err(Error::KeyDecode(format!(
                "identity {}: public key does not match private key",
                def.id
            )));
        }

        tracing::debug!(id = %def.id, "Loaded identity");
        Ok(Self {
            id: def.id,
            parent_id: def.parent_id,
            signing_key,
            verifying_key,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let def = IdentityDefinition {
            id: self.id.clone(),
            parent_id: self.parent_id.clone(),
            pub_key: encode_public_key(&self.verifying_key)?,
            priv_key: encode_private_key(&self.signing_key)?,
        };
        let content = serde_json::to_string_pretty(&def)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("parent_id", &self.parent_id)
            .finish_non_exhaustive()
    }
}
