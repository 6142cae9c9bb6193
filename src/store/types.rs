use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::TransportError;

/// Field map of a stored document
pub type Fields = serde_json::Map<String, Value>;

/// A document read back from a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decodes the document into a model, exposing the document id as `id_field`
    /// when the stored fields don't carry it.
    pub fn into_model<T: DeserializeOwned>(self, id_field: &str) -> Result<T, TransportError> {
        let Document { id, mut fields } = self;
        let missing = fields
            .get(id_field)
            .and_then(Value::as_str)
            .map_or(true, str::is_empty);
        if missing {
            fields.insert(id_field.to_string(), Value::String(id));
        }
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Serializes a model into document fields, leaving out `id_field`
pub fn to_fields<T: Serialize>(model: &T, id_field: Option<&str>) -> Result<Fields, TransportError> {
    match serde_json::to_value(model)? {
        Value::Object(mut fields) => {
            if let Some(id_field) = id_field {
                fields.remove(id_field);
            }
            Ok(fields)
        }
        other => Err(TransportError::Decode(format!(
            "expected an object, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Equality filter on a single field
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Collection scan with optional equality filters and one ordering
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }
}

/// A single staged mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Create or replace a document. With `merge`, only the given fields are touched.
    Set {
        collection: String,
        id: String,
        fields: Fields,
        merge: bool,
    },
    /// Overwrite the given fields of an existing document
    Update {
        collection: String,
        id: String,
        fields: Fields,
    },
    /// Append values missing from an array field of an existing document
    ArrayUnion {
        collection: String,
        id: String,
        field: String,
        values: Vec<Value>,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// Writes applied together by [`DocumentStore::commit`](super::DocumentStore::commit),
/// all or nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, collection: &str, id: &str, fields: Fields) -> &mut Self {
        self.writes.push(Write::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
            merge: false,
        });
        self
    }

    pub fn set_merge(&mut self, collection: &str, id: &str, fields: Fields) -> &mut Self {
        self.writes.push(Write::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
            merge: true,
        });
        self
    }

    pub fn update(&mut self, collection: &str, id: &str, fields: Fields) -> &mut Self {
        self.writes.push(Write::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        });
        self
    }

    pub fn array_union(
        &mut self,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<Value>,
    ) -> &mut Self {
        self.writes.push(Write::ArrayUnion {
            collection: collection.to_string(),
            id: id.to_string(),
            field: field.to_string(),
            values,
        });
        self
    }

    pub fn delete(&mut self, collection: &str, id: &str) -> &mut Self {
        self.writes.push(Write::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }
}
