//! Messages exchanged with the service
//!
//! Field names are camelCase on the wire; enum values are SCREAMING_SNAKE_CASE.

mod credential;
mod messages;
mod query;
mod table;

pub use credential::{CredentialProofType, EcdsaSignature, ProofOfCredential};
pub use messages::{
    AuthResponse, AuthenticateUser, DataPair, DataResponse, DeleteObjectRequest, KeysResponse,
    ListKeysRequest, ListTablesRequest, NewIdentityConfirm, NewIdentityResponse,
    NewSubIdentityRequest, PaginationInfo, SetPermission, SimpleRequest, SubIdentitiesList,
    SubIdentityModify, SystemObjectType, TableGet, TablePut, TablePutMulti, TableQuery,
    TablesList, VersionDetails, ZbError,
};
pub use query::{Comparison, LogicalOperator, QueryOperator, QueryOrdering, SubQuery};
pub use table::{
    FieldConstraint, FieldConstraintType, FieldConstraintValueType, KeyPatternConstraint,
    PermissionAudienceType, PermissionConstraintType, PermissionLevel, PermissionsEntry,
    TableCreate, TableDataFormat, TableIndexField, WirePermissionConstraint,
};

/// Endpoint names, appended to `{server_url}/v1/`
pub mod methods {
    pub const VERSION_INFO: &str = "version";
    pub const LOGIN_USER: &str = "login";
    pub const LIST_TABLES: &str = "tables/list";
    pub const CREATE_TABLE: &str = "tables/create";
    pub const SET_PERMISSION: &str = "tables/permission";
    pub const DELETE_OBJECT: &str = "objects/delete";
    pub const PUT_DATA: &str = "data/put";
    pub const PUT_DATA_MULTI: &str = "data/put_multi";
    pub const GET_DATA: &str = "data/get";
    pub const LIST_KEYS: &str = "keys/list";
    pub const QUERY_KEYS: &str = "keys/query";
    pub const CREATE_USER: &str = "users/create";
    pub const CONFIRM_IDENTITY: &str = "users/confirm";
    pub const LIST_SUB_IDENTITIES: &str = "users/list";
    pub const MODIFY_SUB_IDENTITY: &str = "users/modify";
}
