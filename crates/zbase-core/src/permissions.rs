//! Permission grants as users write them
//!
//! A constraint's required value may be a literal or one of the shorthands
//! `@uid`, `@time`, `@order` and `@random` (case-insensitive), which the
//! service fills in at write time. The field name `@key` constrains the
//! record key instead of a field of the value.

use crate::wire::{
    FieldConstraint, FieldConstraintType, FieldConstraintValueType, KeyPatternConstraint,
    PermissionAudienceType, PermissionConstraintType, PermissionLevel, PermissionsEntry,
    WirePermissionConstraint,
};

const KEY_FIELD: &str = "@key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionConstraint {
    pub field: String,
    pub required_value: String,
}

impl PermissionConstraint {
    pub fn new(field: impl Into<String>, required_value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            required_value: required_value.into(),
        }
    }

    /// Field must equal the writer's user id
    pub fn user_id(field: impl Into<String>) -> Self {
        Self::new(field, "@uid")
    }

    /// Field must equal the write timestamp
    pub fn time(field: impl Into<String>) -> Self {
        Self::new(field, "@time")
    }

    pub fn order(field: impl Into<String>) -> Self {
        Self::new(field, "@order")
    }

    pub fn random(field: impl Into<String>) -> Self {
        Self::new(field, "@random")
    }

    fn value_type(&self) -> (FieldConstraintValueType, String) {
        match self.required_value.to_lowercase().as_str() {
            "@uid" => (FieldConstraintValueType::Uid, String::new()),
            "@time" => (FieldConstraintValueType::Timestamp, String::new()),
            "@order" => (FieldConstraintValueType::NaturalOrder, String::new()),
            "@random" => (FieldConstraintValueType::Random, String::new()),
            _ => (
                FieldConstraintValueType::Constant,
                self.required_value.clone(),
            ),
        }
    }

    pub fn to_wire(&self) -> WirePermissionConstraint {
        let (value_type, required_value) = self.value_type();
        if self.field == KEY_FIELD {
            WirePermissionConstraint {
                constraint_type: PermissionConstraintType::KeyPattern,
                field_constraint: None,
                key_constraint: Some(KeyPatternConstraint {
                    constraint_type: FieldConstraintType::EqualsValue,
                    value_type,
                    required_value,
                }),
            }
        } else {
            WirePermissionConstraint {
                constraint_type: PermissionConstraintType::Field,
                field_constraint: Some(FieldConstraint {
                    constraint_type: FieldConstraintType::EqualsValue,
                    field_key: self.field.clone(),
                    value_type,
                    required_value,
                }),
                key_constraint: None,
            }
        }
    }
}

/// One grant of access to a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEntry {
    pub level: PermissionLevel,
    pub audience_type: PermissionAudienceType,
    pub audience_id: String,
    pub constraints: Vec<PermissionConstraint>,
}

impl PermissionEntry {
    pub fn new(
        level: PermissionLevel,
        audience_type: PermissionAudienceType,
        audience_id: impl Into<String>,
    ) -> Self {
        Self {
            level,
            audience_type,
            audience_id: audience_id.into(),
            constraints: Vec::new(),
        }
    }

    /// Grant to everyone
    pub fn public(level: PermissionLevel) -> Self {
        Self::new(level, PermissionAudienceType::Public, "")
    }

    pub fn with_constraint(mut self, constraint: PermissionConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn add_constraint(&mut self, constraint: PermissionConstraint) {
        self.constraints.push(constraint);
    }

    /// Wire form for table `table_id` owned by `uid`; nonce and credential are left empty
    pub fn to_wire(&self, uid: &str, table_id: &str) -> PermissionsEntry {
        PermissionsEntry {
            id: uid.to_string(),
            table_id: table_id.to_string(),
            audience_type: self.audience_type,
            audience_id: self.audience_id.clone(),
            level: self.level,
            nonce: 0,
            credential: None,
            constraints: self
                .constraints
                .iter()
                .map(PermissionConstraint::to_wire)
                .collect(),
        }
    }
}
