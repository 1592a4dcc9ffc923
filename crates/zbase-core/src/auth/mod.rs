//! Request authentication
//!
//! Signatures bind a request to the caller's id, a fresh nonce and, for
//! writes and structural changes, extra canonical bytes derived from the
//! request content. A bearer token from a password login replaces the
//! signature when the client holds one.

mod credential;
mod digest;
mod identity;
mod keys;
mod signing;

pub use credential::Credential;
pub use digest::{multi_put_digest, put_digest, DigestStrategy};
pub use identity::Identity;
pub use keys::{
    decode_private_key, decode_public_key, encode_private_key, encode_public_key,
    generate_key_pair,
};
pub use signing::{
    permission_set_signing_bytes, permission_signing_bytes, sign, signing_bytes,
    table_create_signing_bytes, verify,
};

pub use p256::ecdsa::{SigningKey, VerifyingKey};
