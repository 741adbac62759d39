//! The function registry: a `once_cell::sync::Lazy<HashMap<...>>`, the
//! idiomatic-Rust analogue of the module-level `functions: Dict[str,
//! TQueryFunction] = {}` that `aw_query/functions.py`'s `@q2_function()`
//! decorator populates at import time.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::functions;
use crate::namespace::Namespace;
use crate::value::QueryValue;

pub type QueryFn = fn(&Namespace, &[QueryValue]) -> Result<QueryValue>;

pub static FUNCTIONS: Lazy<HashMap<&'static str, QueryFn>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, QueryFn> = HashMap::new();
    m.insert("find_bucket", functions::find_bucket);
    m.insert("query_bucket", functions::query_bucket);
    m.insert("query_bucket_eventcount", functions::query_bucket_eventcount);
    m.insert("filter_keyvals", functions::filter_keyvals);
    m.insert("exclude_keyvals", functions::exclude_keyvals);
    m.insert("filter_keyvals_regex", functions::filter_keyvals_regex);
    m.insert("filter_period_intersect", functions::filter_period_intersect);
    m.insert("period_union", functions::period_union);
    m.insert("union_no_overlap", functions::union_no_overlap);
    m.insert("limit_events", functions::limit_events);
    m.insert("merge_events_by_keys", functions::merge_events_by_keys);
    m.insert("chunk_events_by_key", functions::chunk_events_by_key);
    m.insert("sort_by_timestamp", functions::sort_by_timestamp);
    m.insert("sort_by_duration", functions::sort_by_duration);
    m.insert("sum_durations", functions::sum_durations);
    m.insert("concat", functions::concat);
    m.insert("split_url_events", functions::split_url_events);
    m.insert("simplify_string", functions::simplify_string);
    m.insert("flood", functions::flood);
    m.insert("heartbeat_reduce", functions::heartbeat_reduce);
    m.insert("categorize", functions::categorize);
    m.insert("tag", functions::tag);
    m
});

pub fn lookup(name: &str) -> Option<QueryFn> {
    FUNCTIONS.get(name).copied()
}
