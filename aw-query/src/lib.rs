//! The typed query function registry: a small set of composable
//! functions over bucket data, consumed by the dashboard layer to
//! answer questions like "what apps did I use most this week".
//!
//! Grounded on `aw_query/functions.py` — every function here is a
//! direct Rust port of a `q2_*` function there, registered the same
//! way (`find_bucket` ↔ `q2_find_bucket`, …). Unlike the original,
//! this crate does not parse query source: it evaluates an
//! already-built [`evaluator::QueryExpr`] tree, leaving text parsing to
//! whichever layer builds that tree.

mod error;
mod evaluator;
mod functions;
mod namespace;
mod registry;
mod value;

pub use error::{QueryError, Result};
pub use evaluator::{eval, eval_program, QueryCall, QueryExpr};
pub use namespace::Namespace;
pub use registry::{lookup, FUNCTIONS};
pub use value::QueryValue;

#[cfg(test)]
mod tests {
    use super::*;
    use aw_datastore::Datastore;
    use aw_models::{Bucket, Event};
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn ev(ts: &str, secs: i64, app: &str) -> Event {
        let serde_json::Value::Object(data) = json!({"app": app, "title": "t"}) else { unreachable!() };
        Event::new(ts.parse().unwrap(), Duration::seconds(secs), data).unwrap()
    }

    fn seeded_datastore() -> Datastore {
        let ds = Datastore::new_memory();
        ds.create_bucket(&Bucket::new("aw-watcher-window_host", "currentwindow", "aw-watcher-window", "host", Utc::now()))
            .unwrap();
        ds.insert_event("aw-watcher-window_host", &ev("2024-01-01T00:00:00Z", 60, "code")).unwrap();
        ds.insert_event("aw-watcher-window_host", &ev("2024-01-01T00:01:00Z", 60, "browser")).unwrap();
        ds
    }

    #[test]
    fn query_bucket_returns_events_in_window() {
        let ds = seeded_datastore();
        let ns = Namespace::new(&ds, "2024-01-01T00:00:00Z".parse().unwrap(), "2024-01-01T01:00:00Z".parse().unwrap());
        let call = QueryCall::new(
            "query_bucket",
            vec![QueryExpr::Literal(QueryValue::String("aw-watcher-window_host".to_string()))],
        );
        let result = eval(&ns, &QueryExpr::Call(call)).unwrap();
        assert_eq!(result.into_events().unwrap().len(), 2);
    }

    #[test]
    fn nested_call_feeds_filter_keyvals() {
        let ds = seeded_datastore();
        let ns = Namespace::new(&ds, "2024-01-01T00:00:00Z".parse().unwrap(), "2024-01-01T01:00:00Z".parse().unwrap());
        let query = QueryExpr::Call(QueryCall::new(
            "filter_keyvals",
            vec![
                QueryExpr::Call(QueryCall::new(
                    "query_bucket",
                    vec![QueryExpr::Literal(QueryValue::String("aw-watcher-window_host".to_string()))],
                )),
                QueryExpr::Literal(QueryValue::String("app".to_string())),
                QueryExpr::Literal(QueryValue::StringList(vec!["code".to_string()])),
            ],
        ));
        let result = eval(&ns, &query).unwrap();
        let events = result.into_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].app(), Some("code"));
    }

    #[test]
    fn unknown_function_is_an_error() {
        let ds = seeded_datastore();
        let ns = Namespace::new(&ds, Utc::now(), Utc::now());
        let call = QueryCall::new("does_not_exist", vec![]);
        let err = eval(&ns, &QueryExpr::Call(call)).unwrap_err();
        assert!(matches!(err, QueryError::UnknownFunction(_)));
    }

    #[test]
    fn wrong_arg_type_is_a_type_mismatch_not_a_panic() {
        let ds = seeded_datastore();
        let ns = Namespace::new(&ds, Utc::now(), Utc::now());
        let call = QueryCall::new("query_bucket", vec![QueryExpr::Literal(QueryValue::Integer(5))]);
        let err = eval(&ns, &QueryExpr::Call(call)).unwrap_err();
        assert!(matches!(err, QueryError::TypeMismatch { .. }));
    }

    #[test]
    fn find_bucket_missing_is_bucket_missing_error() {
        let ds = seeded_datastore();
        let ns = Namespace::new(&ds, Utc::now(), Utc::now());
        let call = QueryCall::new("find_bucket", vec![QueryExpr::Literal(QueryValue::String("nope".to_string()))]);
        let err = eval(&ns, &QueryExpr::Call(call)).unwrap_err();
        assert!(matches!(err, QueryError::BucketMissing(_)));
    }
}
