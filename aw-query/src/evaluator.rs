//! Evaluates an already-parsed call tree against the function registry.
//! No parser lives in this crate: the dashboard layer is responsible
//! for turning a query string into a [`QueryExpr`] tree, mirroring how
//! `aw_query/query2.py` separates its grammar from `functions.py`'s
//! function bodies.

use crate::error::{QueryError, Result};
use crate::namespace::Namespace;
use crate::registry;
use crate::value::QueryValue;

#[derive(Debug, Clone)]
pub enum QueryExpr {
    Literal(QueryValue),
    Call(QueryCall),
}

#[derive(Debug, Clone)]
pub struct QueryCall {
    pub name: String,
    pub args: Vec<QueryExpr>,
}

impl QueryCall {
    pub fn new(name: impl Into<String>, args: Vec<QueryExpr>) -> Self {
        QueryCall { name: name.into(), args }
    }
}

/// Evaluates `expr`, recursing into call arguments depth-first before
/// dispatching the outer call, matching Python's left-to-right argument
/// evaluation order.
pub fn eval(ns: &Namespace, expr: &QueryExpr) -> Result<QueryValue> {
    match expr {
        QueryExpr::Literal(v) => Ok(v.clone()),
        QueryExpr::Call(call) => eval_call(ns, call),
    }
}

fn eval_call(ns: &Namespace, call: &QueryCall) -> Result<QueryValue> {
    let f = registry::lookup(&call.name).ok_or_else(|| QueryError::UnknownFunction(call.name.clone()))?;
    let args = call
        .args
        .iter()
        .map(|arg| eval(ns, arg))
        .collect::<Result<Vec<_>>>()?;
    f(ns, &args)
}

/// Evaluates a full program: a sequence of statements run for their
/// side effects against `ns`, with the last expression's value returned
/// — the shape `q2_query`'s `RETURN` convention takes.
pub fn eval_program(ns: &Namespace, statements: &[QueryExpr]) -> Result<Option<QueryValue>> {
    let mut last = None;
    for stmt in statements {
        last = Some(eval(ns, stmt)?);
    }
    Ok(last)
}
