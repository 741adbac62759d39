//! Application identity: the `name`/`url` key pair used to recognise an
//! "app" across heartbeats and across the window/web watcher boundary.
//!
//! Grounded on `aw_datastore/storages/peewee.py::ApplicationModel` and
//! `aw_core/models.py::Application`'s `upsert_key` helper, used by the
//! datastore's application-registry table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Distinguishes a desktop application from a browser tab/web application.
/// Desktop apps are keyed by `name`; web applications are keyed by `url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    Application,
    WebApplication,
}

impl ApplicationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationType::Application => "application",
            ApplicationType::WebApplication => "web application",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "application" => Some(ApplicationType::Application),
            "web application" => Some(ApplicationType::WebApplication),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub app_type: ApplicationType,
    pub name: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub is_ignore_idle_time: bool,
    #[serde(default)]
    pub color: Option<String>,
    /// Opaque, watcher-supplied matching criteria. Never interpreted here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<serde_json::Value>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Application {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        app_type: ApplicationType,
        name: Option<String>,
        url: Option<String>,
        alias: Option<String>,
        is_blocked: bool,
        is_ignore_idle_time: bool,
        color: Option<String>,
        criteria: Option<serde_json::Value>,
    ) -> Result<Self> {
        let now = Utc::now();
        let app = Application {
            id: None,
            app_type,
            name,
            url,
            alias,
            is_blocked,
            is_ignore_idle_time,
            color,
            criteria,
            created_at: now,
            updated_at: now,
        };
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<()> {
        let has_name = self.name.as_deref().is_some_and(|s| !s.is_empty());
        let has_url = self.url.as_deref().is_some_and(|s| !s.is_empty());
        let ok = match self.app_type {
            ApplicationType::Application => has_name && !has_url,
            ApplicationType::WebApplication => has_url && !has_name,
        };
        if ok {
            Ok(())
        } else {
            Err(ModelError::ApplicationKeyInvalid(self.app_type))
        }
    }

    /// The value used to upsert this application into the registry: the
    /// url for web applications, the name otherwise.
    pub fn upsert_key(&self) -> &str {
        match self.app_type {
            ApplicationType::WebApplication => self.url.as_deref().unwrap_or_default(),
            ApplicationType::Application => self.name.as_deref().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(
        app_type: ApplicationType,
        name: Option<&str>,
        url: Option<&str>,
    ) -> Result<Application> {
        Application::new(
            app_type,
            name.map(str::to_string),
            url.map(str::to_string),
            None,
            false,
            false,
            None,
            None,
        )
    }

    #[test]
    fn desktop_app_requires_name() {
        assert!(app(ApplicationType::Application, None, None).is_err());
        assert!(app(ApplicationType::Application, Some("firefox"), None).is_ok());
    }

    #[test]
    fn web_app_requires_url() {
        assert!(app(ApplicationType::WebApplication, None, None).is_err());
        let a = app(ApplicationType::WebApplication, None, Some("https://example.com")).unwrap();
        assert_eq!(a.upsert_key(), "https://example.com");
    }

    #[test]
    fn exactly_one_of_name_url_per_type() {
        assert!(app(ApplicationType::Application, Some("firefox"), Some("https://x")).is_err());
        assert!(app(ApplicationType::WebApplication, Some("firefox"), Some("https://x")).is_err());
    }
}
