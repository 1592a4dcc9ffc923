//! Paged reads and writes
//!
//! Reads are walked lazily through a [`PaginationHandler`]; reads of many keys
//! are split into key groups first ([`GetPages`]). Writes are split into
//! byte-bounded pages up front ([`PutPages`]) and pushed in order.

mod get;
mod handler;
mod put;

pub use get::{GetPages, GroupFetch};
pub use handler::{PaginationHandler, Requester};
pub use put::PutPages;

/// Key/value data of one or more pages, in arrival order
pub type PageData = indexmap::IndexMap<String, Vec<u8>>;

/// One fetched page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub data: PageData,
    pub has_next_page: bool,
}

impl Page {
    /// Page of keys with empty values, as returned by listings and queries
    pub fn from_keys(keys: Vec<String>, has_next_page: bool) -> Self {
        Self {
            data: keys.into_iter().map(|k| (k, Vec::new())).collect(),
            has_next_page,
        }
    }
}
