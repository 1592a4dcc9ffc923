//! zbase: client library for the zbase key/value and query service
//!
//! - [`zbase_core`]: request construction, query language, credentials (no I/O)
//! - [`zbase_client`]: async transport, nonces and pagination

pub use zbase_client;
pub use zbase_core;

pub use zbase_client::{ClientBuilder, ClientError, ZbClient};
pub use zbase_core::{ClientConfig, Identity, Query, TableScope};
