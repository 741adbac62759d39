//! Stripping decorative prefixes/suffixes window managers add to
//! titles, so otherwise-identical windows group together.
//!
//! Grounded on `aw_transform/simplify.py`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use aw_models::Event;

static RE_LEADING_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\x{25cf}|\*)\s*").unwrap());
static RE_PARENS_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\([0-9]+\)\s*").unwrap());
static RE_FPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"FPS:\s+[0-9.]+").unwrap());

/// Simplify `event.data[key]` (default `"title"`) by removing numeric
/// `(n)` unread-count prefixes, and — for window events that also carry
/// an `app` field — FPS counters and the VSCode/gedit "unsaved" glyph
/// prefix.
pub fn simplify_string(events: &[Event], key: &str) -> Vec<Event> {
    let mut events = events.to_vec();
    for e in &mut events {
        let Some(Value::String(s)) = e.data.get(key).cloned() else {
            continue;
        };
        let mut s = RE_PARENS_PREFIX.replace(&s, "").into_owned();
        if key == "title" && e.data.contains_key("app") {
            s = RE_FPS.replace(&s, "FPS: ...").into_owned();
            s = RE_LEADING_DOT.replace(&s, "").into_owned();
        }
        e.data.insert(key.to_string(), Value::String(s));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn ev(title: &str) -> Event {
        let Value::Object(data) = json!({"app": "cemu", "title": title}) else { unreachable!() };
        Event::new("2024-01-01T00:00:00Z".parse().unwrap(), Duration::seconds(1), data).unwrap()
    }

    #[test]
    fn strips_unread_count_prefix() {
        let events = vec![ev("(2) Inbox")];
        let simplified = simplify_string(&events, "title");
        assert_eq!(simplified[0].title(), Some("Inbox"));
    }

    #[test]
    fn collapses_fps_counter() {
        let events = vec![ev("Cemu - FPS: 59.2 - BOTW")];
        let simplified = simplify_string(&events, "title");
        assert_eq!(simplified[0].title(), Some("Cemu - FPS: ... - BOTW"));
    }
}
