//! Rule-based categorisation and tagging of events.
//!
//! Grounded on `aw_transform/classify.py`.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use aw_models::Event;

pub type Tag = String;
pub type Category = Vec<String>;

/// A single classification rule: an optional regex matched against a
/// selected subset of an event's `data` values (or all values, if
/// `select_keys` is empty).
#[derive(Debug, Clone)]
pub struct Rule {
    regex: Option<Regex>,
    select_keys: Vec<String>,
}

impl Rule {
    /// `regex` of `None`/empty never matches anything, matching the
    /// original's guard against an empty pattern matching everything.
    pub fn new(regex: Option<&str>, select_keys: Vec<String>, ignore_case: bool) -> Self {
        let regex = regex.filter(|r| !r.is_empty()).map(|r| {
            RegexBuilder::new(r)
                .case_insensitive(ignore_case)
                .build()
                .expect("categorisation rule regex must be valid")
        });
        Rule { regex, select_keys }
    }

    pub fn matches(&self, event: &Event) -> bool {
        let Some(re) = &self.regex else { return false };
        let values: Vec<&Value> = if self.select_keys.is_empty() {
            event.data.values().collect()
        } else {
            self.select_keys.iter().filter_map(|k| event.data.get(k)).collect()
        };
        values
            .into_iter()
            .filter_map(Value::as_str)
            .any(|v| re.is_match(v))
    }
}

fn pick_deepest(acc: Category, candidate: Category) -> Category {
    if candidate.len() >= acc.len() {
        candidate
    } else {
        acc
    }
}

fn pick_category(matching: impl Iterator<Item = Category>) -> Category {
    matching.fold(vec!["Uncategorized".to_string()], pick_deepest)
}

/// Assigns the deepest matching category to each event's `$category`
/// field, defaulting to `["Uncategorized"]`.
pub fn categorize(events: &[Event], classes: &[(Category, Rule)]) -> Vec<Event> {
    let mut events = events.to_vec();
    for e in &mut events {
        let category = pick_category(
            classes
                .iter()
                .filter(|(_, rule)| rule.matches(e))
                .map(|(cat, _)| cat.clone()),
        );
        e.data.insert(
            "$category".to_string(),
            Value::Array(category.into_iter().map(Value::String).collect()),
        );
    }
    events
}

/// Assigns the list of all matching tag names to each event's `$tags`
/// field.
pub fn tag(events: &[Event], classes: &[(Tag, Rule)]) -> Vec<Event> {
    let mut events = events.to_vec();
    for e in &mut events {
        let tags: Vec<Value> = classes
            .iter()
            .filter(|(_, rule)| rule.matches(e))
            .map(|(t, _)| Value::String(t.clone()))
            .collect();
        e.data.insert("$tags".to_string(), Value::Array(tags));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn ev(app: &str) -> Event {
        let Value::Object(data) = json!({"app": app}) else { unreachable!() };
        Event::new("2024-01-01T00:00:00Z".parse().unwrap(), Duration::seconds(1), data).unwrap()
    }

    #[test]
    fn categorize_picks_deepest_matching_category() {
        let classes = vec![
            (vec!["Work".to_string()], Rule::new(Some("code"), vec![], false)),
            (
                vec!["Work".to_string(), "Editor".to_string()],
                Rule::new(Some("code"), vec![], false),
            ),
        ];
        let events = categorize(&[ev("code")], &classes);
        let category = events[0].data.get("$category").unwrap();
        assert_eq!(category, &json!(["Work", "Editor"]));
    }

    #[test]
    fn uncategorized_by_default() {
        let classes: Vec<(Category, Rule)> = vec![(vec!["Work".to_string()], Rule::new(Some("zzz"), vec![], false))];
        let events = categorize(&[ev("code")], &classes);
        assert_eq!(events[0].data.get("$category").unwrap(), &json!(["Uncategorized"]));
    }

    #[test]
    fn empty_regex_never_matches() {
        let rule = Rule::new(Some(""), vec![], false);
        assert!(!rule.matches(&ev("code")));
    }
}
