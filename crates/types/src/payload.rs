//! Request and response payloads for the six table operations

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::TransactionId;

/// Name used in log output for the primary key "index"
pub const PRIMARY_KEY_LABEL: &str = ":id";

/// A contiguous range of keys. Missing bounds are unbounded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<Value>,
    #[serde(default)]
    pub lower_open: bool,
    #[serde(default)]
    pub upper_open: bool,
}

impl KeyRange {
    /// Every key
    pub fn all() -> Self {
        Self::default()
    }

    /// Exactly one key
    pub fn only(key: Value) -> Self {
        Self {
            lower: Some(key.clone()),
            upper: Some(key),
            lower_open: false,
            upper_open: false,
        }
    }

    /// `lower <= key < upper`
    pub fn between(lower: Value, upper: Value) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
            lower_open: false,
            upper_open: true,
        }
    }

    pub fn contains(&self, key: &Value) -> bool {
        let above_lower = match &self.lower {
            None => true,
            Some(lower) => match compare_keys(key, lower) {
                Ordering::Greater => true,
                Ordering::Equal => !self.lower_open,
                Ordering::Less => false,
            },
        };
        let below_upper = match &self.upper {
            None => true,
            Some(upper) => match compare_keys(key, upper) {
                Ordering::Less => true,
                Ordering::Equal => !self.upper_open,
                Ordering::Greater => false,
            },
        };
        above_lower && below_upper
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.lower, &self.upper) {
            (None, None) => f.write_str("*"),
            (Some(lower), Some(upper)) if lower == upper && !self.lower_open && !self.upper_open => {
                write!(f, "={}", lower)
            }
            (lower, upper) => {
                f.write_str(if self.lower_open { "(" } else { "[" })?;
                match lower {
                    Some(lower) => write!(f, "{}", lower)?,
                    None => f.write_str("-inf")?,
                }
                f.write_str(", ")?;
                match upper {
                    Some(upper) => write!(f, "{}", upper)?,
                    None => f.write_str("+inf")?,
                }
                f.write_str(if self.upper_open { ")" } else { "]" })
            }
        }
    }
}

/// Total order over JSON keys: numbers, then strings, then everything else
/// compared by its serialized text.
pub fn compare_keys(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Number(_) => 0,
            Value::String(_) => 1,
            _ => 2,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a)
            .cmp(&rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

/// Index plus key range. An empty index name addresses the primary key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DbCoreQuery {
    #[serde(default)]
    pub index: String,
    #[serde(default)]
    pub range: KeyRange,
}

impl DbCoreQuery {
    pub fn primary(range: KeyRange) -> Self {
        Self {
            index: String::new(),
            range,
        }
    }

    pub fn on_index(index: impl Into<String>, range: KeyRange) -> Self {
        Self {
            index: index.into(),
            range,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index_label(&self) -> &str {
        if self.is_primary() {
            PRIMARY_KEY_LABEL
        } else {
            &self.index
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    Add {
        values: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        keys: Option<Vec<Value>>,
    },
    Put {
        values: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        keys: Option<Vec<Value>>,
    },
    Delete {
        keys: Vec<Value>,
    },
    DeleteRange {
        range: KeyRange,
    },
}

impl Mutation {
    pub fn type_name(&self) -> &'static str {
        match self {
            Mutation::Add { .. } => "add",
            Mutation::Put { .. } => "put",
            Mutation::Delete { .. } => "delete",
            Mutation::DeleteRange { .. } => "deleteRange",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trans: Option<TransactionId>,
    #[serde(flatten)]
    pub mutation: Mutation,
}

impl MutateRequest {
    pub fn new(mutation: Mutation) -> Self {
        Self {
            trans: None,
            mutation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutateResponse {
    pub num_failures: usize,
    /// Failure message per position in the mutation batch
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub failures: BTreeMap<usize, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_result: Option<Value>,
    /// Primary keys of written rows
    #[serde(default)]
    pub results: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trans: Option<TransactionId>,
    pub key: Value,
}

impl GetRequest {
    pub fn new(key: Value) -> Self {
        Self { trans: None, key }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetManyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trans: Option<TransactionId>,
    pub keys: Vec<Value>,
}

impl GetManyRequest {
    pub fn new(keys: Vec<Value>) -> Self {
        Self { trans: None, keys }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trans: Option<TransactionId>,
    pub query: DbCoreQuery,
    /// Return values rather than primary keys
    #[serde(default)]
    pub values: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl QueryRequest {
    pub fn new(query: DbCoreQuery) -> Self {
        Self {
            trans: None,
            query,
            values: true,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn keys_only(mut self) -> Self {
        self.values = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    pub result: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenCursorRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trans: Option<TransactionId>,
    pub query: DbCoreQuery,
    #[serde(default)]
    pub values: bool,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<String>,
}

impl OpenCursorRequest {
    pub fn new(query: DbCoreQuery) -> Self {
        Self {
            trans: None,
            query,
            values: true,
            reverse: false,
            unique: None,
        }
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// Snapshot of a cursor positioned on its first row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub key: Value,
    pub primary_key: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trans: Option<TransactionId>,
    pub query: DbCoreQuery,
}

impl CountRequest {
    pub fn new(query: DbCoreQuery) -> Self {
        Self { trans: None, query }
    }
}

macro_rules! impl_in_transaction {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $ty {
                /// Attach the request to a transaction
                pub fn in_transaction(mut self, trans: TransactionId) -> Self {
                    self.trans = Some(trans);
                    self
                }
            }
        )*
    };
}

impl_in_transaction!(
    MutateRequest,
    GetRequest,
    GetManyRequest,
    QueryRequest,
    OpenCursorRequest,
    CountRequest,
);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_key_range_contains() {
        let range = KeyRange::between(json!(2), json!(5));
        assert!(!range.contains(&json!(1)));
        assert!(range.contains(&json!(2)));
        assert!(range.contains(&json!(4.5)));
        assert!(!range.contains(&json!(5)));

        assert!(KeyRange::only(json!("a")).contains(&json!("a")));
        assert!(!KeyRange::only(json!("a")).contains(&json!("b")));
        assert!(KeyRange::all().contains(&json!({"nested": true})));
    }

    #[test]
    fn test_compare_keys_orders_numbers_before_strings() {
        assert_eq!(compare_keys(&json!(10), &json!("1")), Ordering::Less);
        assert_eq!(compare_keys(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_keys(&json!(3), &json!(3.0)), Ordering::Equal);
    }

    #[test]
    fn test_key_range_display() {
        assert_eq!(KeyRange::all().to_string(), "*");
        assert_eq!(KeyRange::only(json!(7)).to_string(), "=7");
        assert_eq!(KeyRange::between(json!(1), json!(9)).to_string(), "[1, 9)");
    }

    #[test]
    fn test_mutate_request_serialization() {
        let req = MutateRequest::new(Mutation::Delete {
            keys: vec![json!("a")],
        });
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"type": "delete", "keys": ["a"]})
        );

        let parsed: MutateRequest =
            serde_json::from_value(json!({"type": "put", "values": [{"id": 1}]})).unwrap();
        assert_eq!(parsed.mutation.type_name(), "put");
        assert_eq!(parsed.trans, None);
    }
}
