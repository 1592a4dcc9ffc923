//! zbase-client: async client for the zbase key/value and query service
//!
//! Builds on `zbase-core` for request construction and adds:
//! - Transport: JSON over HTTP via reqwest, one POST per service method
//! - Nonces: a single issuer shared by every clone of a client
//! - Pagination: lazy cursors over paged reads, byte-bounded paged writes
//!
//! ## Example
//!
//! ```ignore
//! use zbase_client::ZbClient;
//! use zbase_core::{ClientConfig, Identity, Query, TableScope};
//!
//! let identity = Identity::load("identity.json")?;
//! let client = ZbClient::new(ClientConfig::new("http://localhost:9443"), &identity)?;
//! let scope = TableScope::new(client.user_id(), "people");
//!
//! let adults = client.query(&scope, &Query::gte("age", 18)).await?;
//! for key in adults.keys_all().await? {
//!     println!("{}", key);
//! }
//! ```

mod client;
mod error;
pub mod metrics;
mod nonce;
pub mod pagination;

pub use client::{ClientBuilder, NewSubUser, SubUserChanges, ZbClient};
pub use error::{ClientError, Result};
pub use nonce::NonceMaker;
pub use pagination::{GetPages, Page, PageData, PaginationHandler, PutPages};
