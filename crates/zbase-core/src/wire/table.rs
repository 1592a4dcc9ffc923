//! Table definition and permission messages
//!
//! The numeric codes returned by the `code()` methods are the bytes that go
//! into permission signing bytes, so they must stay stable.

use serde::{Deserialize, Serialize};

use super::{ProofOfCredential, QueryOrdering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableDataFormat {
    #[default]
    Binary,
    PlainText,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionLevel {
    Read,
    Append,
    Delete,
    Administer,
}

impl PermissionLevel {
    pub fn code(self) -> u8 {
        match self {
            PermissionLevel::Read => 0,
            PermissionLevel::Append => 1,
            PermissionLevel::Delete => 2,
            PermissionLevel::Administer => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionAudienceType {
    User,
    Individual,
    Public,
}

impl PermissionAudienceType {
    pub fn code(self) -> u8 {
        match self {
            PermissionAudienceType::User => 0,
            PermissionAudienceType::Individual => 1,
            PermissionAudienceType::Public => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionConstraintType {
    Field,
    KeyPattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldConstraintType {
    #[default]
    EqualsValue,
}

impl FieldConstraintType {
    pub fn code(self) -> u8 {
        match self {
            FieldConstraintType::EqualsValue => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldConstraintValueType {
    Constant,
    Uid,
    Timestamp,
    NaturalOrder,
    Random,
}

impl FieldConstraintValueType {
    pub fn code(self) -> u8 {
        match self {
            FieldConstraintValueType::Constant => 0,
            FieldConstraintValueType::Uid => 1,
            FieldConstraintValueType::Timestamp => 2,
            FieldConstraintValueType::NaturalOrder => 3,
            FieldConstraintValueType::Random => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConstraint {
    pub constraint_type: FieldConstraintType,
    pub field_key: String,
    pub value_type: FieldConstraintValueType,
    pub required_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPatternConstraint {
    pub constraint_type: FieldConstraintType,
    pub value_type: FieldConstraintValueType,
    pub required_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePermissionConstraint {
    pub constraint_type: PermissionConstraintType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_constraint: Option<FieldConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_constraint: Option<KeyPatternConstraint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsEntry {
    pub id: String,
    pub table_id: String,
    pub audience_type: PermissionAudienceType,
    pub audience_id: String,
    pub level: PermissionLevel,
    #[serde(default)]
    pub nonce: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<ProofOfCredential>,
    #[serde(default)]
    pub constraints: Vec<WirePermissionConstraint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableIndexField {
    pub field: String,
    pub ordering: QueryOrdering,
    #[serde(default)]
    pub language_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCreate {
    pub id: String,
    pub table_id: String,
    pub data_format: TableDataFormat,
    #[serde(default)]
    pub indices: Vec<TableIndexField>,
    pub nonce: i64,
    #[serde(default)]
    pub allow_token_auth: bool,
    pub credential: ProofOfCredential,
    #[serde(default)]
    pub permissions: Vec<PermissionsEntry>,
}
