//! The `users` record type and its row representation.

use crate::config::{FieldDescriptor, FieldKind, RecordType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

pub const USERS_TABLE: &str = "users";

/// Fields the server assigns; never accepted from clients.
pub const SERVER_ASSIGNED: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// Field that identifies an account; unique in the store.
pub const ACCOUNT_FIELD: &str = "account";

pub fn user_record_type() -> RecordType {
    RecordType::new(
        USERS_TABLE,
        vec![
            FieldDescriptor::new("id", FieldKind::Integer).primary_key(),
            FieldDescriptor::new(ACCOUNT_FIELD, FieldKind::String)
                .required()
                .unique()
                .length(3, 50),
            FieldDescriptor::new("password", FieldKind::String).required().length(6, 100),
            FieldDescriptor::new("nickName", FieldKind::String).length(1, 50),
            FieldDescriptor::new("associatedUid", FieldKind::Integer),
            FieldDescriptor::new("avatar", FieldKind::String).length(1, 200),
            FieldDescriptor::new("createdAt", FieldKind::Date).required(),
            FieldDescriptor::new("updatedAt", FieldKind::Date).required(),
        ],
    )
}

/// Credentials presented at login. Only presence is checked; length rules apply at registration.
pub fn login_record_type() -> RecordType {
    RecordType::new(
        "login",
        vec![
            FieldDescriptor::new(ACCOUNT_FIELD, FieldKind::String).required(),
            FieldDescriptor::new("password", FieldKind::String).required(),
        ],
    )
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub account: String,
    /// Password digest. Never serialized.
    #[serde(skip_serializing)]
    pub password: String,
    pub nick_name: Option<String>,
    pub associated_uid: Option<i64>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a new row from validated create fields (camelCase keys).
    pub fn from_fields(id: i64, fields: &Map<String, Value>, now: DateTime<Utc>) -> Result<Self, serde_json::Error> {
        let mut user = User {
            id,
            account: String::new(),
            password: String::new(),
            nick_name: None,
            associated_uid: None,
            avatar: None,
            created_at: now,
            updated_at: now,
        };
        user.apply_fields(fields)?;
        Ok(user)
    }

    /// Overwrite the fields present in `fields`. Unknown and server-assigned keys are ignored.
    pub fn apply_fields(&mut self, fields: &Map<String, Value>) -> Result<(), serde_json::Error> {
        for (k, v) in fields {
            match k.as_str() {
                "account" => self.account = serde_json::from_value(v.clone())?,
                "password" => self.password = serde_json::from_value(v.clone())?,
                "nickName" => self.nick_name = serde_json::from_value(v.clone())?,
                "associatedUid" => self.associated_uid = serde_json::from_value(v.clone())?,
                "avatar" => self.avatar = serde_json::from_value(v.clone())?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Value of one API field, for exact-match lookups.
    pub fn field_value(&self, field: &str) -> Option<Value> {
        Some(match field {
            "id" => Value::from(self.id),
            "account" => Value::from(self.account.clone()),
            "password" => Value::from(self.password.clone()),
            "nickName" => self.nick_name.clone().map(Value::from).unwrap_or(Value::Null),
            "associatedUid" => self.associated_uid.map(Value::from).unwrap_or(Value::Null),
            "avatar" => self.avatar.clone().map(Value::from).unwrap_or(Value::Null),
            "createdAt" => Value::from(self.created_at.to_rfc3339()),
            "updatedAt" => Value::from(self.updated_at.to_rfc3339()),
            _ => return None,
        })
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::derive_schema;
    use serde_json::json;

    #[test]
    fn user_record_type_derives() {
        let schema = derive_schema(&user_record_type()).unwrap();
        let create = schema.omit(&SERVER_ASSIGNED);
        assert!(!create.contains("id"));
        assert!(create.contains("password"));
        assert!(derive_schema(&login_record_type()).is_ok());
    }

    #[test]
    fn password_is_never_serialized() {
        let fields = json!({ "account": "alice", "password": "$argon2id$digest", "nickName": "Al" });
        let user = User::from_fields(1, fields.as_object().unwrap(), Utc::now()).unwrap();
        let v = user.to_json();
        assert_eq!(v["account"], "alice");
        assert_eq!(v["nickName"], "Al");
        assert!(v.get("password").is_none());
    }

    #[test]
    fn apply_fields_clears_nullable_values() {
        let fields = json!({ "account": "alice", "password": "x", "avatar": "a.png" });
        let mut user = User::from_fields(1, fields.as_object().unwrap(), Utc::now()).unwrap();
        user.apply_fields(json!({ "avatar": null }).as_object().unwrap()).unwrap();
        assert_eq!(user.avatar, None);
        assert_eq!(user.field_value("avatar"), Some(Value::Null));
    }
}
