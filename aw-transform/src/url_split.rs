//! Decomposing a browser tab event's `url` field into protocol/domain/
//! path components for easier grouping in the UI.
//!
//! Grounded on `aw_transform/split_url_events.py`.

use serde_json::Value;
use url::Url;

use aw_models::Event;

pub fn split_url_events(events: &[Event]) -> Vec<Event> {
    let mut events = events.to_vec();
    for event in &mut events {
        let Some(Value::String(raw)) = event.data.get("url").cloned() else {
            continue;
        };
        let Ok(parsed) = Url::parse(&raw) else {
            continue;
        };
        let domain = parsed.host_str().unwrap_or_default();
        let domain = domain.strip_prefix("www.").unwrap_or(domain);

        event.data.insert("$protocol".into(), Value::String(parsed.scheme().to_string()));
        event.data.insert("$domain".into(), Value::String(domain.to_string()));
        event.data.insert("$path".into(), Value::String(parsed.path().to_string()));
        event.data.insert("$options".into(), Value::String(parsed.query().unwrap_or("").to_string()));
        event.data.insert("$identifier".into(), Value::String(parsed.fragment().unwrap_or("").to_string()));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn ev(url: &str) -> Event {
        let Value::Object(data) = json!({"url": url}) else { unreachable!() };
        Event::new("2024-01-01T00:00:00Z".parse().unwrap(), Duration::seconds(1), data).unwrap()
    }

    #[test]
    fn splits_domain_without_www_prefix() {
        let events = vec![ev("https://www.example.com/a/b?x=1#frag")];
        let split = split_url_events(&events);
        assert_eq!(split[0].data.get("$domain").unwrap(), "example.com");
        assert_eq!(split[0].data.get("$path").unwrap(), "/a/b");
        assert_eq!(split[0].data.get("$options").unwrap(), "x=1");
        assert_eq!(split[0].data.get("$identifier").unwrap(), "frag");
        assert_eq!(split[0].data.get("$protocol").unwrap(), "https");
    }
}
