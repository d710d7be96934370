//! SQL `where` clauses combining an object-id list with a free-form filter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field the id list is matched against when none is named
pub const DEFAULT_ID_FIELD: &str = "OBJECTID";

/// One object id; numbers are written bare and text is quoted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectId {
    Number(serde_json::Number),
    Text(String),
}

impl From<i64> for ObjectId {
    fn from(id: i64) -> Self {
        ObjectId::Number(id.into())
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        ObjectId::Text(id.to_string())
    }
}

/// Object ids as a comma-separated string or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectIds {
    Text(String),
    List(Vec<ObjectId>),
}

impl ObjectIds {
    fn is_empty_text(&self) -> bool {
        matches!(self, ObjectIds::Text(text) if text.is_empty())
    }

    fn ids(&self) -> Vec<ObjectId> {
        match self {
            ObjectIds::Text(text) => text.split(',').map(ObjectId::from).collect(),
            ObjectIds::List(ids) => ids.clone(),
        }
    }
}

impl From<&str> for ObjectIds {
    fn from(ids: &str) -> Self {
        ObjectIds::Text(ids.to_string())
    }
}

impl<T: Into<ObjectId>> From<Vec<T>> for ObjectIds {
    fn from(ids: Vec<T>) -> Self {
        ObjectIds::List(ids.into_iter().map(Into::into).collect())
    }
}

/// Inputs to [`combine_object_ids_and_where`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhereClauseParams {
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_ids: Option<ObjectIds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
}

impl WhereClauseParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_where(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    pub fn with_object_ids(mut self, ids: impl Into<ObjectIds>) -> Self {
        self.object_ids = Some(ids.into());
        self
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }
}

// Anything a JavaScript `Number()` would read as a number, blank included
fn is_numeric(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return true;
    }
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return true;
    }
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).is_ok();
    }
    text.parse::<f64>().is_ok_and(f64::is_finite)
}

struct SqlValue<'a>(&'a ObjectId);

impl fmt::Display for SqlValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ObjectId::Number(number) => write!(f, "{}", number),
            ObjectId::Text(text) if is_numeric(text) => f.write_str(text),
            ObjectId::Text(text) => write!(f, "'{}'", text.replace('\'', "''")),
        }
    }
}

/// Join an id list and a `where` clause into one SQL predicate.
///
/// Ids become `(<idField> IN (...))` and the clause is wrapped in
/// parentheses; both present are joined with `AND`. An empty clause and an
/// empty id string contribute nothing.
pub fn combine_object_ids_and_where(params: &WhereClauseParams) -> String {
    let where_clause = params.where_clause.as_deref().filter(|clause| !clause.is_empty());
    let id_field = params.id_field.as_deref().unwrap_or(DEFAULT_ID_FIELD);
    let mut components = Vec::new();

    if let Some(object_ids) = params.object_ids.as_ref().filter(|ids| !ids.is_empty_text()) {
        if !id_field.is_empty() {
            let values: Vec<String> =
                object_ids.ids().iter().map(|id| SqlValue(id).to_string()).collect();
            components.push(format!("({} IN ({}))", id_field, values.join(",")));
        }
    }

    if let Some(clause) = where_clause {
        components.push(format!("({})", clause));
    }

    components.join(" AND ")
}
