//! Table-level entities

use crate::permissions::PermissionEntry;
use crate::wire::{PermissionsEntry, QueryOrdering, TableDataFormat, TableIndexField};

/// A field the service should index for queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedField {
    pub field: String,
    pub language_code: String,
    pub ordering: QueryOrdering,
}

impl IndexedField {
    pub fn new(field: impl Into<String>, ordering: QueryOrdering) -> Self {
        Self {
            field: field.into(),
            language_code: String::new(),
            ordering,
        }
    }

    /// Language of a full-text index, e.g. `"en"`
    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language_code = code.into();
        self
    }

    pub fn to_wire(&self) -> TableIndexField {
        TableIndexField {
            field: self.field.clone(),
            ordering: self.ordering,
            language_code: self.language_code.clone(),
        }
    }
}

/// The table a request addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableScope {
    pub owner_id: String,
    pub table_id: String,
}

impl TableScope {
    pub fn new(owner_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            table_id: table_id.into(),
        }
    }
}

/// Everything needed to create a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub table_id: String,
    pub data_format: TableDataFormat,
    pub indices: Vec<IndexedField>,
    pub permissions: Vec<PermissionEntry>,
    /// Accept bearer tokens as well as signatures for requests on this table
    pub allow_token_auth: bool,
}

impl TableDefinition {
    pub fn new(table_id: impl Into<String>, data_format: TableDataFormat) -> Self {
        Self {
            table_id: table_id.into(),
            data_format,
            indices: Vec::new(),
            permissions: Vec::new(),
            allow_token_auth: false,
        }
    }

    pub fn with_index(mut self, field: IndexedField) -> Self {
        self.indices.push(field);
        self
    }

    pub fn with_permission(mut self, entry: PermissionEntry) -> Self {
        self.permissions.push(entry);
        self
    }

    pub fn with_token_auth(mut self, allow: bool) -> Self {
        self.allow_token_auth = allow;
        self
    }

    pub fn indices_to_wire(&self) -> Vec<TableIndexField> {
        self.indices.iter().map(IndexedField::to_wire).collect()
    }

    /// Permission entries of a table owned by `uid`
    pub fn permissions_to_wire(&self, uid: &str) -> Vec<PermissionsEntry> {
        self.permissions
            .iter()
            .map(|p| p.to_wire(uid, &self.table_id))
            .collect()
    }
}
