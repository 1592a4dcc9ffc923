//! Canonical signing bytes and ECDSA P-256 signatures
//!
//! Every signed request hashes `uid || decimal(nonce) || extra` with SHA-256
//! and signs the digest. `r` and `s` travel as base-10 strings.

use alloy_primitives::U256;
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::FieldBytes;
use sha2::{Digest, Sha256};

use crate::error::Error;
use crate::wire::{EcdsaSignature, PermissionsEntry};
use crate::Result;

/// `utf8(uid) || decimal(nonce)`
pub fn signing_bytes(uid: &str, nonce: i64) -> Vec<u8> {
    format!("{}{}", uid, nonce).into_bytes()
}

/// Canonical bytes of one permission grant
///
/// `[audience, level] || id || table_id || audience_id`, then for each
/// constraint `[constraint type, value type] || field key || required value`.
/// Key-pattern constraints have no field key.
pub fn permission_signing_bytes(entry: &PermissionsEntry) -> Vec<u8> {
    let mut bytes = vec![entry.audience_type.code(), entry.level.code()];
    bytes.extend_from_slice(entry.id.as_bytes());
    bytes.extend_from_slice(entry.table_id.as_bytes());
    bytes.extend_from_slice(entry.audience_id.as_bytes());

    for constraint in &entry.constraints {
        if let Some(field) = &constraint.field_constraint {
            bytes.push(field.constraint_type.code());
            bytes.push(field.value_type.code());
            bytes.extend_from_slice(field.field_key.as_bytes());
            bytes.extend_from_slice(field.required_value.as_bytes());
        } else if let Some(key) = &constraint.key_constraint {
            bytes.push(key.constraint_type.code());
            bytes.push(key.value_type.code());
            bytes.extend_from_slice(key.required_value.as_bytes());
        }
    }
    bytes
}

/// Concatenated canonical bytes of every grant, in order
pub fn permission_set_signing_bytes(entries: &[PermissionsEntry]) -> Vec<u8> {
    entries.iter().flat_map(permission_signing_bytes).collect()
}

/// `utf8(table_id) || permission set bytes`
pub fn table_create_signing_bytes(table_id: &str, permissions: &[PermissionsEntry]) -> Vec<u8> {
    let mut bytes = table_id.as_bytes().to_vec();
    bytes.extend(permission_set_signing_bytes(permissions));
    bytes
}

fn request_digest(uid: &str, nonce: i64, extra: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(signing_bytes(uid, nonce));
    hasher.update(extra);
    hasher.finalize().to_vec()
}

/// Sign a request on behalf of `uid`
pub fn sign(uid: &str, nonce: i64, extra: &[u8], key: &SigningKey) -> Result<EcdsaSignature> {
    let digest = request_digest(uid, nonce, extra);
    let signature: Signature = key
        .sign_prehash(&digest)
        .map_err(|e| Error::Signature(e.to_string()))?;
    let (r, s) = signature.split_bytes();
    Ok(EcdsaSignature {
        r: bytes_to_decimal(&r),
        s: bytes_to_decimal(&s),
    })
}

/// Check a decimal `(r, s)` pair against the request's canonical bytes
///
/// Malformed scalars verify as `false`.
pub fn verify(
    uid: &str,
    nonce: i64,
    extra: &[u8],
    key: &VerifyingKey,
    r: &str,
    s: &str,
) -> bool {
    let signature = match (decimal_to_field_bytes(r), decimal_to_field_bytes(s)) {
        (Ok(r), Ok(s)) => match Signature::from_scalars(r, s) {
            Ok(sig) => sig,
            Err(_) => return false,
        },
        _ => return false,
    };
    let digest = request_digest(uid, nonce, extra);
    key.verify_prehash(&digest, &signature).is_ok()
}

/// Big-endian unsigned bytes to base-10
fn bytes_to_decimal(bytes: &[u8]) -> String {
    U256::from_be_slice(bytes).to_string()
}

/// Base-10 to a 32-byte big-endian scalar
fn decimal_to_field_bytes(decimal: &str) -> Result<FieldBytes> {
    if decimal.is_empty() || !decimal.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Signature(format!("non-decimal scalar {:?}", decimal)));
    }
    let value: U256 = decimal
        .parse()
        .map_err(|e| Error::Signature(format!("invalid signature scalar: {}", e)))?;
    Ok(FieldBytes::clone_from_slice(&value.to_be_bytes::<32>()))
}
