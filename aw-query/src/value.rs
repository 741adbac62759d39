//! The typed values query functions accept and return.
//!
//! The original `aw_query/functions.py` leans on Python's dynamic
//! typing plus a runtime `_verify_variable_is_type` check; here the
//! same contract is expressed as a closed enum so a bad argument is a
//! [`crate::error::QueryError::TypeMismatch`] rather than a panic deep
//! inside a transform.

use aw_models::Event;

#[derive(Debug, Clone)]
pub enum QueryValue {
    Events(Vec<Event>),
    String(String),
    StringList(Vec<String>),
    Number(f64),
    Integer(i64),
    Bool(bool),
    /// Escape hatch for arguments with no natural closed-enum shape in
    /// this registry, namely `categorize`/`tag`'s classifier trees.
    Json(serde_json::Value),
}

impl QueryValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            QueryValue::Events(_) => "events",
            QueryValue::String(_) => "string",
            QueryValue::StringList(_) => "string list",
            QueryValue::Number(_) => "number",
            QueryValue::Integer(_) => "integer",
            QueryValue::Bool(_) => "bool",
            QueryValue::Json(_) => "json",
        }
    }

    pub fn as_events(&self) -> Option<&[Event]> {
        match self {
            QueryValue::Events(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_events(self) -> Option<Vec<Event>> {
        match self {
            QueryValue::Events(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<Vec<&str>> {
        match self {
            QueryValue::StringList(v) => Some(v.iter().map(String::as_str).collect()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            QueryValue::Number(n) => Some(*n),
            QueryValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            QueryValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            QueryValue::Json(v) => Some(v),
            _ => None,
        }
    }
}
