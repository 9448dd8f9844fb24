use crate::domain_port::LiveQuery;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

pub type Document = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("decode error: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(field.to_owned(), value.into())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Eq(field, value) => doc.get(field) == Some(value),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            direction: Direction::Desc,
        }
    }

    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ord = compare_values(
            a.get(&self.field).unwrap_or(&Value::Null),
            b.get(&self.field).unwrap_or(&Value::Null),
        );
        match self.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }
}

/// Partial update of one field. Array variants have set semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Set(Value),
    ArrayUnion(Vec<Value>),
    ArrayRemove(Vec<Value>),
}

impl FieldChange {
    pub fn apply(&self, current: Option<Value>) -> Value {
        match self {
            FieldChange::Set(value) => value.clone(),
            FieldChange::ArrayUnion(values) => {
                let mut items = match current {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                for value in values {
                    if !items.contains(value) {
                        items.push(value.clone());
                    }
                }
                Value::Array(items)
            }
            FieldChange::ArrayRemove(values) => {
                let mut items = match current {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                items.retain(|item| !values.contains(item));
                Value::Array(items)
            }
        }
    }
}

pub type FieldChanges = Vec<(String, FieldChange)>;

/// Vendor-neutral document database. Every call is an independent remote
/// write or read; there are no cross-document transactions.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store-assigned time, strictly increasing per store.
    fn server_timestamp(&self) -> DateTime<Utc>;

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, StoreError>;

    /// Full overwrite or create.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError>;

    /// Fails with `NotFound` if the document is absent.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        changes: FieldChanges,
    ) -> Result<(), StoreError>;

    /// Absent is not an error.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn query_documents(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError>;

    async fn subscribe(&self, collection: &str, query: Query) -> Result<LiveQuery, StoreError>;

    async fn array_field_add(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.update_document(
            collection,
            id,
            vec![(field.to_owned(), FieldChange::ArrayUnion(vec![value]))],
        )
        .await
    }

    async fn array_field_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.update_document(
            collection,
            id,
            vec![(field.to_owned(), FieldChange::ArrayRemove(vec![value]))],
        )
        .await
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: null < bool < number < string < array < object.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .partial_cmp(&y.as_f64().unwrap_or(f64::NAN))
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = compare_values(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
