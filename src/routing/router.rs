//! Operation lookup.
//!
//! # Responsibilities
//! - Store the operation → endpoint table
//! - Resolve an operation identifier to its backend endpoint
//! - Return explicit not-found rather than a silent default
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact, case-sensitive lookup via HashMap
//! - Fail closed: identifiers not listed are never forwarded

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::OperationConfig;
use crate::routing::catalog::BUILTIN_OPERATIONS;

/// HTTP method used for the backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Whether the payload travels in the request body rather than the query.
    pub fn has_body(self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.pad(name)
    }
}

/// A resolved backend endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub method: Method,
}

impl Endpoint {
    pub fn new(path: impl Into<String>, method: Method) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

/// Static mapping from operation identifier to backend endpoint.
#[derive(Debug, Clone, Default)]
pub struct ResolutionTable {
    operations: HashMap<String, Endpoint>,
}

impl ResolutionTable {
    /// Build a table from `(identifier, endpoint)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Endpoint)>,
        S: Into<String>,
    {
        Self {
            operations: entries
                .into_iter()
                .map(|(name, endpoint)| (name.into(), endpoint))
                .collect(),
        }
    }

    /// The built-in catalogue.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_OPERATIONS
                .iter()
                .map(|(name, path, method)| (*name, Endpoint::new(*path, *method))),
        )
    }

    /// Table from configuration; the built-in catalogue when none is configured.
    pub fn from_config<'a, I>(operations: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a OperationConfig)>,
    {
        let table = Self::new(operations.into_iter().map(|(name, op)| {
            (name.clone(), Endpoint::new(op.path(), op.method()))
        }));

        if table.is_empty() {
            Self::builtin()
        } else {
            table
        }
    }

    /// Look up an operation identifier (exact, case-sensitive).
    pub fn resolve(&self, operation: &str) -> Option<&Endpoint> {
        self.operations.get(operation)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Entries sorted by identifier, for listing.
    pub fn entries(&self) -> Vec<(&str, &Endpoint)> {
        let mut entries: Vec<_> = self
            .operations
            .iter()
            .map(|(name, endpoint)| (name.as_str(), endpoint))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
