//! Request and response payloads

use serde::{Deserialize, Serialize};

use super::{PermissionsEntry, ProofOfCredential, SubQuery, TableCreate};

/// Key/value pair of a write batch; values travel hex-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPair {
    pub key: String,
    #[serde(with = "hex_bytes")]
    pub value: Vec<u8>,
}

impl DataPair {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePut {
    pub id: String,
    pub table_owner_id: String,
    pub table_id: String,
    pub key: String,
    #[serde(with = "hex_bytes")]
    pub value: Vec<u8>,
    pub overwrite: bool,
    pub nonce: i64,
    pub credential: ProofOfCredential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePutMulti {
    pub id: String,
    pub table_owner_id: String,
    pub table_id: String,
    pub overwrite: bool,
    pub nonce: i64,
    pub credential: ProofOfCredential,
    pub pairs: Vec<DataPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableGet {
    pub id: String,
    pub table_owner_id: String,
    pub table_id: String,
    pub nonce: i64,
    pub credential: ProofOfCredential,
    pub page_index: u64,
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListKeysRequest {
    pub id: String,
    pub table_owner_id: String,
    pub table_id: String,
    #[serde(default)]
    pub pattern: String,
    pub nonce: i64,
    pub page_index: u64,
    pub credential: ProofOfCredential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableQuery {
    pub id: String,
    pub table_owner_id: String,
    pub table_id: String,
    pub query: SubQuery,
    pub nonce: i64,
    pub page_index: u64,
    pub credential: ProofOfCredential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemObjectType {
    Key,
    Table,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObjectRequest {
    pub id: String,
    pub object_type: SystemObjectType,
    pub table_owner_id: String,
    pub table_id: String,
    pub object_id: String,
    pub nonce: i64,
    pub credential: ProofOfCredential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTablesRequest {
    pub id: String,
    pub table_owner_id: String,
    pub nonce: i64,
    pub credential: ProofOfCredential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateUser {
    #[serde(default)]
    pub parent_id: String,
    pub handle: String,
    pub password: String,
    pub nonce: i64,
}

/// Request carrying only the caller's identity and credential
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleRequest {
    pub id: String,
    pub nonce: i64,
    pub credential: ProofOfCredential,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubIdentityRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub login_password: String,
    #[serde(default)]
    pub pub_key_encoded: String,
    #[serde(default)]
    pub signup_code: String,
    #[serde(default)]
    pub group_id: String,
}

/// Sub-user update; empty strings leave a field unchanged
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubIdentityModify {
    pub id: String,
    pub sub_id: String,
    #[serde(default)]
    pub new_name: String,
    #[serde(default)]
    pub new_email: String,
    #[serde(default)]
    pub new_mobile: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub new_pub_key: String,
    pub nonce: i64,
    pub credential: ProofOfCredential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIdentityConfirm {
    pub id: String,
    #[serde(default)]
    pub parent_id: String,
    pub verification_code: String,
}

/// In-band error payload; an empty message means success
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZbError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl ZbError {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn is_error(&self) -> bool {
        !self.message.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse {
    #[serde(default)]
    pub data: Vec<DataPair>,
    #[serde(default)]
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysResponse {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: String,
    #[serde(default)]
    pub jwt_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesList {
    #[serde(default)]
    pub table_definitions: Vec<TableCreate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubIdentitiesList {
    #[serde(default)]
    pub sub_identities: Vec<NewSubIdentityRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIdentityResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDetails {
    pub server_version: String,
    pub min_client_version: String,
}

/// Permission grant sent on its own (outside table creation)
pub type SetPermission = PermissionsEntry;

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
