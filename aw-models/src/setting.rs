//! Client-configurable key/value settings stored alongside buckets.
//!
//! Grounded on `aw_core/models.py`'s settings table and the well-known
//! `weekdays_schedule` setting consumed by the categorisation watchers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub code: String,
    pub value: serde_json::Value,
}

impl Setting {
    pub fn new(code: impl Into<String>, value: serde_json::Value) -> Self {
        Setting { code: code.into(), value }
    }
}

/// The `weekdays_schedule` well-known setting (§6): which days count as
/// scheduled work days, plus a single daily start/end time shared across
/// all enabled days. Field names and the "9:30 AM"-style time strings
/// match the wire shape consumed by the dashboard exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdaysSchedule {
    #[serde(rename = "Monday")]
    pub monday: bool,
    #[serde(rename = "Tuesday")]
    pub tuesday: bool,
    #[serde(rename = "Wednesday")]
    pub wednesday: bool,
    #[serde(rename = "Thursday")]
    pub thursday: bool,
    #[serde(rename = "Friday")]
    pub friday: bool,
    #[serde(rename = "Saturday")]
    pub saturday: bool,
    #[serde(rename = "Sunday")]
    pub sunday: bool,
    pub starttime: String,
    pub endtime: String,
}

impl Default for WeekdaysSchedule {
    /// Mon-Fri 9:30 AM - 6:30 PM, mirroring the default seeded by
    /// `init_db` when no `weekdays_schedule` setting exists yet.
    fn default() -> Self {
        WeekdaysSchedule {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
            sunday: false,
            starttime: "9:30 AM".to_string(),
            endtime: "6:30 PM".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_serialises_with_capitalised_day_names() {
        let json = serde_json::to_value(WeekdaysSchedule::default()).unwrap();
        assert_eq!(json.get("Monday"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(json.get("starttime").unwrap(), "9:30 AM");
    }
}
