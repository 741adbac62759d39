//! Bucket metadata: the container events are stored under.
//!
//! Grounded on `aw_core/models.py::Bucket`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: String,
    /// Renamed from Rust's `type` keyword; serialised as `"type"` on the
    /// wire to match the rest of the ecosystem.
    #[serde(rename = "type")]
    pub _type: String,
    pub client: String,
    pub hostname: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl Bucket {
    pub fn new(
        id: impl Into<String>,
        _type: impl Into<String>,
        client: impl Into<String>,
        hostname: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Bucket {
            id: id.into(),
            _type: _type.into(),
            client: client.into(),
            hostname: hostname.into(),
            created,
            name: None,
            data: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_field_serialises_as_type() {
        let b = Bucket::new("aw-watcher-window_host", "currentwindow", "aw-watcher-window", "host", Utc::now());
        let json = serde_json::to_value(&b).unwrap();
        assert!(json.get("type").is_some());
        assert!(json.get("_type").is_none());
    }
}
