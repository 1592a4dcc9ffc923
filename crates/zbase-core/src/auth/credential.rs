//! Proof of credential for one request: a bearer token or a signature

use p256::ecdsa::SigningKey;

use super::signing::sign;
use crate::error::Error;
use crate::wire::{CredentialProofType, EcdsaSignature, ProofOfCredential};
use crate::Result;

/// The proof attached to one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Signature(EcdsaSignature),
    Token(String),
}

impl Credential {
    /// Pick the credential form for a request
    ///
    /// A bearer token wins over a key when both are held; with neither the
    /// caller is not ready to make authenticated requests.
    pub fn for_request(
        token: Option<&str>,
        key: Option<&SigningKey>,
        uid: &str,
        nonce: i64,
        extra: &[u8],
    ) -> Result<Self> {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            return Ok(Credential::Token(token.to_string()));
        }
        match key {
            Some(key) => Ok(Credential::Signature(sign(uid, nonce, extra, key)?)),
            None => Err(Error::NotReady(
                "no signing key or login token available".to_string(),
            )),
        }
    }

    pub fn to_proof(&self) -> ProofOfCredential {
        match self {
            Credential::Signature(sig) => ProofOfCredential {
                cred_type: CredentialProofType::Signature,
                signature: Some(sig.clone()),
                jwt_token: None,
            },
            Credential::Token(token) => ProofOfCredential {
                cred_type: CredentialProofType::JwtToken,
                signature: None,
                jwt_token: Some(token.clone()),
            },
        }
    }
}

impl From<Credential> for ProofOfCredential {
    fn from(credential: Credential) -> Self {
        credential.to_proof()
    }
}
