//! Builds parameterized INSERT, SELECT, UPDATE, DELETE for a record-type table.

use crate::case::to_snake_case;
use crate::config::{FieldDescriptor, FieldKind, RecordType};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from record types).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

/// PostgreSQL type for a descriptor. Length bounds are enforced on input, so strings are TEXT.
pub fn column_pg_type(d: &FieldDescriptor) -> &'static str {
    match d.kind {
        FieldKind::Integer => "bigint",
        FieldKind::Float => "double precision",
        FieldKind::Boolean => "boolean",
        FieldKind::Date => "timestamptz",
        FieldKind::Json | FieldKind::Other => "jsonb",
        FieldKind::Uuid => "uuid",
        FieldKind::String | FieldKind::Text | FieldKind::Enum => "text",
    }
}

#[derive(Clone, Debug)]
pub struct ColumnRef {
    /// API field name (camelCase).
    pub field: String,
    /// Column name (snake_case).
    pub name: String,
    pub pg_type: &'static str,
    /// Filled by the database when omitted (serial key, timestamps).
    pub has_default: bool,
}

/// A record type bound to a concrete table.
#[derive(Clone, Debug)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
    pub pk: String,
    pub columns: Vec<ColumnRef>,
}

impl TableRef {
    pub fn from_record(schema: &str, record: &RecordType) -> Self {
        let columns: Vec<ColumnRef> = record
            .fields
            .iter()
            .map(|d| ColumnRef {
                field: d.name.clone(),
                name: to_snake_case(&d.name),
                pg_type: column_pg_type(d),
                has_default: d.primary_key || is_timestamp_column(d),
            })
            .collect();
        let pk = record
            .primary_key()
            .map(|d| to_snake_case(&d.name))
            .unwrap_or_else(|| "id".to_string());
        TableRef {
            schema: schema.to_string(),
            name: record.name.clone(),
            pk,
            columns,
        }
    }

    pub fn qualified(&self) -> String {
        qualified_table(&self.schema, &self.name)
    }

    pub fn column_for_field(&self, field: &str) -> Option<&ColumnRef> {
        self.columns.iter().find(|c| c.field == field)
    }
}

/// `createdAt` / `updatedAt` style columns maintained by the database.
pub fn is_timestamp_column(d: &FieldDescriptor) -> bool {
    d.kind == FieldKind::Date && matches!(to_snake_case(&d.name).as_str(), "created_at" | "updated_at")
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }

    /// Placeholder with a cast so text and JSON values bind to typed columns.
    fn placeholder(&mut self, c: &ColumnRef, v: Value) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, c.pg_type)
    }
}

fn select_column_list(table: &TableRef) -> String {
    table
        .columns
        .iter()
        .map(|c| quoted(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key. Caller binds the id as sole param.
pub fn select_by_id(table: &TableRef, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(Value::from(id));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_column_list(table),
        table.qualified(),
        quoted(&table.pk)
    );
    q
}

/// SELECT first row where one field matches exactly. Returns None for fields not in the table.
pub fn select_one(table: &TableRef, field: &str, value: &Value) -> Option<QueryBuf> {
    let col = table.column_for_field(field)?;
    let mut q = QueryBuf::new();
    let ph = q.placeholder(col, value.clone());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} ORDER BY {} LIMIT 1",
        select_column_list(table),
        table.qualified(),
        quoted(&col.name),
        ph,
        quoted(&table.pk)
    );
    Some(q)
}

/// SELECT every row ordered by primary key.
pub fn select_all(table: &TableRef) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        select_column_list(table),
        table.qualified(),
        quoted(&table.pk)
    );
    q
}

/// INSERT: one column per table field; keys of `body` are API field names.
/// Columns with a database default are omitted when the body does not provide them.
pub fn insert(table: &TableRef, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in &table.columns {
        let val = body.get(&c.field).cloned();
        if val.is_none() && c.has_default {
            continue;
        }
        let ph = q.placeholder(c, val.unwrap_or(Value::Null));
        cols.push(quoted(&c.name));
        placeholders.push(ph);
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table.qualified(),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(table)
    );
    q
}

/// UPDATE by id: SET only fields present in body (and in the table). Bumps `updated_at` when the table has it.
pub fn update(table: &TableRef, id: i64, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in &table.columns {
        if c.name == table.pk || (c.has_default && c.pg_type == "timestamptz") {
            continue;
        }
        let Some(v) = body.get(&c.field) else { continue };
        let ph = q.placeholder(c, v.clone());
        sets.push(format!("{} = {}", quoted(&c.name), ph));
    }
    if table.columns.iter().any(|c| c.name == "updated_at") {
        sets.push(format!("{} = NOW()", quoted("updated_at")));
    }
    if sets.is_empty() {
        q.sql = format!(
            "SELECT 1 FROM {} WHERE {} = $1",
            table.qualified(),
            quoted(&table.pk)
        );
        q.params.push(Value::from(id));
        return q;
    }
    let id_param = q.push_param(Value::from(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        table.qualified(),
        sets.join(", "),
        quoted(&table.pk),
        id_param
    );
    q
}

/// DELETE by id.
pub fn delete(table: &TableRef, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(Value::from(id));
    q.sql = format!("DELETE FROM {} WHERE {} = $1", table.qualified(), quoted(&table.pk));
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> TableRef {
        let record = RecordType::new(
            "users",
            vec![
                FieldDescriptor::new("id", FieldKind::Integer).primary_key(),
                FieldDescriptor::new("account", FieldKind::String).required(),
                FieldDescriptor::new("nickName", FieldKind::String),
                FieldDescriptor::new("createdAt", FieldKind::Date).required(),
                FieldDescriptor::new("updatedAt", FieldKind::Date).required(),
            ],
        );
        TableRef::from_record("public", &record)
    }

    #[test]
    fn insert_skips_defaulted_columns() {
        let body = json!({ "account": "alice", "nickName": "Al" });
        let q = insert(&table(), body.as_object().unwrap());
        assert_eq!(
            q.sql,
            "INSERT INTO \"public\".\"users\" (\"account\", \"nick_name\") VALUES ($1::text, $2::text) \
             RETURNING \"id\", \"account\", \"nick_name\", \"created_at\", \"updated_at\""
        );
        assert_eq!(q.params, vec![json!("alice"), json!("Al")]);
    }

    #[test]
    fn update_sets_only_present_fields_and_touches_updated_at() {
        let body = json!({ "nickName": null });
        let q = update(&table(), 7, body.as_object().unwrap());
        assert_eq!(
            q.sql,
            "UPDATE \"public\".\"users\" SET \"nick_name\" = $1::text, \"updated_at\" = NOW() WHERE \"id\" = $2"
        );
        assert_eq!(q.params, vec![Value::Null, json!(7)]);
    }

    #[test]
    fn select_one_rejects_unknown_fields() {
        assert!(select_one(&table(), "password", &json!("x")).is_none());
        let q = select_one(&table(), "account", &json!("alice")).unwrap();
        assert!(q.sql.contains("WHERE \"account\" = $1::text"));
    }
}
