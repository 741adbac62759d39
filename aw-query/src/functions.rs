//! The query function bodies. Each function here is grounded 1:1 on its
//! `q2_*` counterpart in `aw_query/functions.py`: argument shapes and
//! return types follow the original, with Python's runtime
//! `_verify_variable_is_type` replaced by the typed [`QueryValue`]
//! extractors below.

use aw_models::Event;
use aw_transform::{Category, Rule, Tag};

use crate::error::{QueryError, Result};
use crate::namespace::Namespace;
use crate::value::QueryValue;

fn events_arg(args: &[QueryValue], idx: usize, function: &'static str, param: &'static str) -> Result<Vec<Event>> {
    args.get(idx)
        .and_then(|v| v.as_events())
        .map(<[Event]>::to_vec)
        .ok_or_else(|| QueryError::TypeMismatch {
            function,
            param,
            expected: "events",
            actual: args.get(idx).map(QueryValue::type_name).unwrap_or("missing"),
        })
}

fn string_arg(args: &[QueryValue], idx: usize, function: &'static str, param: &'static str) -> Result<String> {
    args.get(idx)
        .and_then(QueryValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| QueryError::TypeMismatch {
            function,
            param,
            expected: "string",
            actual: args.get(idx).map(QueryValue::type_name).unwrap_or("missing"),
        })
}

fn string_list_arg(args: &[QueryValue], idx: usize, function: &'static str, param: &'static str) -> Result<Vec<String>> {
    args.get(idx)
        .and_then(QueryValue::as_string_list)
        .map(|v| v.into_iter().map(str::to_string).collect())
        .ok_or_else(|| QueryError::TypeMismatch {
            function,
            param,
            expected: "string list",
            actual: args.get(idx).map(QueryValue::type_name).unwrap_or("missing"),
        })
}

fn integer_arg(args: &[QueryValue], idx: usize, function: &'static str, param: &'static str) -> Result<i64> {
    args.get(idx)
        .and_then(QueryValue::as_integer)
        .ok_or_else(|| QueryError::TypeMismatch {
            function,
            param,
            expected: "integer",
            actual: args.get(idx).map(QueryValue::type_name).unwrap_or("missing"),
        })
}

fn number_arg(args: &[QueryValue], idx: usize, function: &'static str, param: &'static str) -> Result<f64> {
    args.get(idx)
        .and_then(QueryValue::as_number)
        .ok_or_else(|| QueryError::TypeMismatch {
            function,
            param,
            expected: "number",
            actual: args.get(idx).map(QueryValue::type_name).unwrap_or("missing"),
        })
}

fn json_arg<'a>(args: &'a [QueryValue], idx: usize, function: &'static str, param: &'static str) -> Result<&'a serde_json::Value> {
    args.get(idx)
        .and_then(QueryValue::as_json)
        .ok_or_else(|| QueryError::TypeMismatch {
            function,
            param,
            expected: "json",
            actual: args.get(idx).map(QueryValue::type_name).unwrap_or("missing"),
        })
}

fn arity(function: &'static str, args: &[QueryValue], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(QueryError::ArityMismatch { function, expected, actual: args.len() });
    }
    Ok(())
}

/// Parses a `[[category, ...], {regex, select_keys, ignore_case}]` pair
/// array, the wire shape `q2_categorize`'s `classes` argument takes.
fn parse_classify_rules(json: &serde_json::Value) -> Result<Vec<(Category, Rule)>> {
    let entries = json.as_array().ok_or_else(|| QueryError::TypeMismatch {
        function: "categorize",
        param: "classes",
        expected: "array",
        actual: "non-array json",
    })?;
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let pair = entry.as_array().filter(|p| p.len() == 2).ok_or_else(|| QueryError::TypeMismatch {
            function: "categorize",
            param: "classes",
            expected: "[category, rule] pair",
            actual: "malformed entry",
        })?;
        let category: Category = pair[0]
            .as_array()
            .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();
        out.push((category, parse_rule(&pair[1])?));
    }
    Ok(out)
}

fn parse_tag_rules(json: &serde_json::Value) -> Result<Vec<(Tag, Rule)>> {
    let entries = json.as_array().ok_or_else(|| QueryError::TypeMismatch {
        function: "tag",
        param: "classes",
        expected: "array",
        actual: "non-array json",
    })?;
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let pair = entry.as_array().filter(|p| p.len() == 2).ok_or_else(|| QueryError::TypeMismatch {
            function: "tag",
            param: "classes",
            expected: "[tag, rule] pair",
            actual: "malformed entry",
        })?;
        let tag = pair[0].as_str().unwrap_or_default().to_string();
        out.push((tag, parse_rule(&pair[1])?));
    }
    Ok(out)
}

fn parse_rule(json: &serde_json::Value) -> Result<Rule> {
    let regex = json.get("regex").and_then(|v| v.as_str());
    let select_keys = json
        .get("select_keys")
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    let ignore_case = json.get("ignore_case").and_then(|v| v.as_bool()).unwrap_or(false);
    Ok(Rule::new(regex, select_keys, ignore_case))
}

/// `q2_find_bucket`: the first bucket id whose id contains `filter`,
/// optionally also filtered by hostname.
pub fn find_bucket(ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    if args.is_empty() || args.len() > 2 {
        return Err(QueryError::ArityMismatch { function: "find_bucket", expected: 1, actual: args.len() });
    }
    let filter = string_arg(args, 0, "find_bucket", "filter")?;
    let hostname = if args.len() == 2 { Some(string_arg(args, 1, "find_bucket", "hostname")?) } else { None };
    let buckets = ns.datastore.buckets()?;
    let found = buckets
        .values()
        .find(|b| b.id.contains(&filter) && hostname.as_deref().map_or(true, |h| b.hostname == h))
        .map(|b| b.id.clone())
        .ok_or_else(|| QueryError::BucketMissing(filter.clone()))?;
    Ok(QueryValue::String(found))
}

/// `q2_query_bucket`: every event in `bucketname` within the bound
/// `STARTTIME`/`ENDTIME` window.
pub fn query_bucket(ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("query_bucket", args, 1)?;
    let bucketname = string_arg(args, 0, "query_bucket", "bucketname")?;
    let events = ns.datastore.get_events(&bucketname, None, Some(ns.starttime), Some(ns.endtime))?;
    Ok(QueryValue::Events(events))
}

/// `q2_query_bucket_eventcount`.
pub fn query_bucket_eventcount(ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("query_bucket_eventcount", args, 1)?;
    let bucketname = string_arg(args, 0, "query_bucket_eventcount", "bucketname")?;
    let count = ns.datastore.get_event_count(&bucketname, Some(ns.starttime), Some(ns.endtime))?;
    Ok(QueryValue::Integer(count))
}

pub fn filter_keyvals(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("filter_keyvals", args, 3)?;
    let events = events_arg(args, 0, "filter_keyvals", "events")?;
    let key = string_arg(args, 1, "filter_keyvals", "key")?;
    let vals = string_list_arg(args, 2, "filter_keyvals", "vals")?;
    let vals_ref: Vec<&str> = vals.iter().map(String::as_str).collect();
    Ok(QueryValue::Events(aw_transform::filter_keyvals(&events, &key, &vals_ref, false)))
}

pub fn exclude_keyvals(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("exclude_keyvals", args, 3)?;
    let events = events_arg(args, 0, "exclude_keyvals", "events")?;
    let key = string_arg(args, 1, "exclude_keyvals", "key")?;
    let vals = string_list_arg(args, 2, "exclude_keyvals", "vals")?;
    let vals_ref: Vec<&str> = vals.iter().map(String::as_str).collect();
    Ok(QueryValue::Events(aw_transform::filter_keyvals(&events, &key, &vals_ref, true)))
}

pub fn filter_keyvals_regex(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("filter_keyvals_regex", args, 3)?;
    let events = events_arg(args, 0, "filter_keyvals_regex", "events")?;
    let key = string_arg(args, 1, "filter_keyvals_regex", "key")?;
    let regex = string_arg(args, 2, "filter_keyvals_regex", "regex")?;
    Ok(QueryValue::Events(aw_transform::filter_keyvals_regex(&events, &key, &regex)?))
}

pub fn filter_period_intersect(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("filter_period_intersect", args, 2)?;
    let events = events_arg(args, 0, "filter_period_intersect", "events")?;
    let filterevents = events_arg(args, 1, "filter_period_intersect", "filterevents")?;
    Ok(QueryValue::Events(aw_transform::filter_period_intersect(&events, &filterevents)))
}

pub fn period_union(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("period_union", args, 2)?;
    let events1 = events_arg(args, 0, "period_union", "events1")?;
    let events2 = events_arg(args, 1, "period_union", "events2")?;
    Ok(QueryValue::Events(aw_transform::period_union(&events1, &events2)))
}

pub fn union_no_overlap(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("union_no_overlap", args, 2)?;
    let events1 = events_arg(args, 0, "union_no_overlap", "events1")?;
    let events2 = events_arg(args, 1, "union_no_overlap", "events2")?;
    Ok(QueryValue::Events(aw_transform::union_no_overlap(&events1, &events2)))
}

pub fn limit_events(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("limit_events", args, 2)?;
    let events = events_arg(args, 0, "limit_events", "events")?;
    let count = integer_arg(args, 1, "limit_events", "count")?;
    Ok(QueryValue::Events(aw_transform::limit_events(&events, count.max(0) as usize)))
}

pub fn merge_events_by_keys(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("merge_events_by_keys", args, 2)?;
    let events = events_arg(args, 0, "merge_events_by_keys", "events")?;
    let keys = string_list_arg(args, 1, "merge_events_by_keys", "keys")?;
    let keys_ref: Vec<&str> = keys.iter().map(String::as_str).collect();
    Ok(QueryValue::Events(aw_transform::merge_events_by_keys(&events, &keys_ref)))
}

pub fn chunk_events_by_key(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("chunk_events_by_key", args, 3)?;
    let events = events_arg(args, 0, "chunk_events_by_key", "events")?;
    let key = string_arg(args, 1, "chunk_events_by_key", "key")?;
    let pulsetime = number_arg(args, 2, "chunk_events_by_key", "pulsetime")?;
    Ok(QueryValue::Events(aw_transform::chunk_events_by_key(&events, &key, pulsetime)))
}

pub fn sort_by_timestamp(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("sort_by_timestamp", args, 1)?;
    let events = events_arg(args, 0, "sort_by_timestamp", "events")?;
    Ok(QueryValue::Events(aw_transform::sort_by_timestamp(events)))
}

pub fn sort_by_duration(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("sort_by_duration", args, 1)?;
    let events = events_arg(args, 0, "sort_by_duration", "events")?;
    Ok(QueryValue::Events(aw_transform::sort_by_duration(events)))
}

pub fn sum_durations(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("sum_durations", args, 1)?;
    let events = events_arg(args, 0, "sum_durations", "events")?;
    let total = aw_transform::sum_durations(&events);
    Ok(QueryValue::Number(total.num_milliseconds() as f64 / 1000.0))
}

pub fn concat(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("concat", args, 2)?;
    let events1 = events_arg(args, 0, "concat", "events1")?;
    let events2 = events_arg(args, 1, "concat", "events2")?;
    Ok(QueryValue::Events(aw_transform::concat(&events1, &events2)))
}

pub fn split_url_events(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("split_url_events", args, 1)?;
    let events = events_arg(args, 0, "split_url_events", "events")?;
    Ok(QueryValue::Events(aw_transform::split_url_events(&events)))
}

pub fn simplify_string(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("simplify_string", args, 2)?;
    let events = events_arg(args, 0, "simplify_string", "events")?;
    let key = string_arg(args, 1, "simplify_string", "key")?;
    Ok(QueryValue::Events(aw_transform::simplify_string(&events, &key)))
}

pub fn flood(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("flood", args, 2)?;
    let events = events_arg(args, 0, "flood", "events")?;
    let pulsetime = number_arg(args, 1, "flood", "pulsetime")?;
    Ok(QueryValue::Events(aw_transform::flood(&events, pulsetime)))
}

pub fn heartbeat_reduce(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("heartbeat_reduce", args, 2)?;
    let events = events_arg(args, 0, "heartbeat_reduce", "events")?;
    let pulsetime = number_arg(args, 1, "heartbeat_reduce", "pulsetime")?;
    Ok(QueryValue::Events(aw_transform::heartbeat_reduce(&events, pulsetime)))
}

pub fn categorize(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("categorize", args, 2)?;
    let events = events_arg(args, 0, "categorize", "events")?;
    let classes_json = json_arg(args, 1, "categorize", "classes")?;
    let classes = parse_classify_rules(classes_json)?;
    Ok(QueryValue::Events(aw_transform::categorize(&events, &classes)))
}

pub fn tag(_ns: &Namespace, args: &[QueryValue]) -> Result<QueryValue> {
    arity("tag", args, 2)?;
    let events = events_arg(args, 0, "tag", "events")?;
    let classes_json = json_arg(args, 1, "tag", "classes")?;
    let classes = parse_tag_rules(classes_json)?;
    Ok(QueryValue::Events(aw_transform::tag(&events, &classes)))
}
