//! zbase-core: request construction for the zbase key/value and query service
//!
//! This crate holds everything a client needs to build a request before it
//! touches the network:
//! - Query algebra: typed filter nodes that compile to the wire `SubQuery` tree
//! - Filter language: a small text grammar that parses into the same nodes
//! - Credentials: canonical signing bytes, ECDSA P-256 signatures, bearer tokens
//! - Batch digests: content hashes binding a multi-put signature to its pairs
//! - Permission and index entities for table creation
//!
//! Nothing here performs I/O against the remote service. The async transport,
//! pagination and nonce issuing live in `zbase-client`.
//!
//! ## Canonical signing bytes
//!
//! | Request | Extra bytes appended after `uid || nonce` |
//! |---------|-------------------------------------------|
//! | single put | `MD5(key || value)` |
//! | multi put | digest selected by [`DigestStrategy`] |
//! | delete key | `key` |
//! | delete table | `table_id` |
//! | create table | `table_id || permission bytes` |
//! | set permission | permission bytes |
//! | reads, listings | nothing |

pub mod auth;
mod config;
mod error;
mod permissions;
pub mod query;
mod table;
mod version;
pub mod wire;

pub use auth::{
    decode_private_key, decode_public_key, encode_private_key, encode_public_key,
    generate_key_pair, multi_put_digest, sign, verify, Credential, DigestStrategy, Identity,
};
pub use config::{ClientConfig, CLIENT_VERSION};
pub use error::Error;
pub use permissions::{PermissionConstraint, PermissionEntry};
pub use query::{parse_filter, FilterExpr, Query, QueryValue};
pub use table::{IndexedField, TableDefinition, TableScope};
pub use version::is_version_at_least;

pub type Result<T> = std::result::Result<T, Error>;

/// Size limits shared by the client and the service
pub mod constants {
    /// Largest message the service accepts in one request
    pub const MAX_MESSAGE_BYTES: u64 = 4_000_000;

    /// Default ceiling for one page of a multi-put (half a message)
    pub const DEFAULT_MAX_PAGE_BYTES: u64 = MAX_MESSAGE_BYTES / 2;

    /// Default expected size of a single stored value, used to size read pages
    pub const DEFAULT_MAX_ITEM_BYTES: u64 = 1_000;
}
