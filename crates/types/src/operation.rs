//! Operation kinds and the borrowed request/response envelopes passed to
//! logging callbacks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::payload::*;
use crate::TransactionId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown operation kind: {0}")]
pub struct UnknownOperation(pub String);

/// The six interceptable table operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Mutate,
    Get,
    GetMany,
    Query,
    OpenCursor,
    Count,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Mutate,
        OperationKind::Get,
        OperationKind::GetMany,
        OperationKind::Query,
        OperationKind::OpenCursor,
        OperationKind::Count,
    ];

    /// Wire name, as used in configuration lists
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Mutate => "mutate",
            OperationKind::Get => "get",
            OperationKind::GetMany => "getMany",
            OperationKind::Query => "query",
            OperationKind::OpenCursor => "openCursor",
            OperationKind::Count => "count",
        }
    }

    /// Human readable label for log output
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Mutate => "Mutate",
            OperationKind::Get => "Get",
            OperationKind::GetMany => "Get Many",
            OperationKind::Query => "Query",
            OperationKind::OpenCursor => "Open Cursor",
            OperationKind::Count => "Count",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// A borrowed view of an operation request, one variant per [`OperationKind`]
#[derive(Debug, Clone, Copy)]
pub enum Request<'a> {
    Mutate(&'a MutateRequest),
    Get(&'a GetRequest),
    GetMany(&'a GetManyRequest),
    Query(&'a QueryRequest),
    OpenCursor(&'a OpenCursorRequest),
    Count(&'a CountRequest),
}

impl<'a> Request<'a> {
    pub fn kind(&self) -> OperationKind {
        match self {
            Request::Mutate(_) => OperationKind::Mutate,
            Request::Get(_) => OperationKind::Get,
            Request::GetMany(_) => OperationKind::GetMany,
            Request::Query(_) => OperationKind::Query,
            Request::OpenCursor(_) => OperationKind::OpenCursor,
            Request::Count(_) => OperationKind::Count,
        }
    }

    /// The transaction this request runs in, if the caller supplied one
    pub fn transaction(&self) -> Option<&'a TransactionId> {
        match *self {
            Request::Mutate(req) => req.trans.as_ref(),
            Request::Get(req) => req.trans.as_ref(),
            Request::GetMany(req) => req.trans.as_ref(),
            Request::Query(req) => req.trans.as_ref(),
            Request::OpenCursor(req) => req.trans.as_ref(),
            Request::Count(req) => req.trans.as_ref(),
        }
    }

    /// Short token identifying what the request touches.
    ///
    /// Mutations report their type and the number of affected rows, point
    /// reads report the key, range operations report the index they scan.
    pub fn summary(&self) -> String {
        match self {
            Request::Mutate(req) => match &req.mutation {
                Mutation::Add { values, .. } => format!("add({})", values.len()),
                Mutation::Put { values, .. } => format!("put({})", values.len()),
                Mutation::Delete { keys } => format!("delete({})", keys.len()),
                Mutation::DeleteRange { range } => format!("deleteRange({})", range),
            },
            Request::Get(req) => req.key.to_string(),
            Request::GetMany(req) => format!("{} keys", req.keys.len()),
            Request::Query(req) => req.query.index_label().to_string(),
            Request::OpenCursor(req) => req.query.index_label().to_string(),
            Request::Count(req) => req.query.index_label().to_string(),
        }
    }

    /// Serialize the underlying request payload
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Request::Mutate(req) => serde_json::to_value(req),
            Request::Get(req) => serde_json::to_value(req),
            Request::GetMany(req) => serde_json::to_value(req),
            Request::Query(req) => serde_json::to_value(req),
            Request::OpenCursor(req) => serde_json::to_value(req),
            Request::Count(req) => serde_json::to_value(req),
        }
    }
}

/// A borrowed view of a successful operation result
#[derive(Debug, Clone, Copy)]
pub enum Response<'a> {
    Mutate(&'a MutateResponse),
    Get(&'a Option<serde_json::Value>),
    GetMany(&'a [Option<serde_json::Value>]),
    Query(&'a QueryResponse),
    OpenCursor(&'a Option<Cursor>),
    Count(u64),
}

impl<'a> Response<'a> {
    pub fn kind(&self) -> OperationKind {
        match self {
            Response::Mutate(_) => OperationKind::Mutate,
            Response::Get(_) => OperationKind::Get,
            Response::GetMany(_) => OperationKind::GetMany,
            Response::Query(_) => OperationKind::Query,
            Response::OpenCursor(_) => OperationKind::OpenCursor,
            Response::Count(_) => OperationKind::Count,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Response::Mutate(res) => serde_json::to_value(res),
            Response::Get(res) => serde_json::to_value(res),
            Response::GetMany(res) => serde_json::to_value(res),
            Response::Query(res) => serde_json::to_value(res),
            Response::OpenCursor(res) => serde_json::to_value(res),
            Response::Count(res) => serde_json::to_value(res),
        }
    }
}
