//! Per-request context captured by the mediator before any decision is made.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{RESOURCE_SEGMENT_INDEX, roles};

/// HTTP verb of the inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Other(String),
}

impl Method {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// GET is the only read verb the gateway filters.
    #[must_use]
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Get)
    }
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Method {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Method> for String {
    fn from(value: Method) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client applications that identify themselves through the `app` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum App {
    #[serde(rename = "Autographa")]
    Autographa,
    #[serde(rename = "Vachan-online or vachan-app")]
    VachanOnline,
    #[serde(rename = "VachanAdmin")]
    VachanAdmin,
    #[serde(rename = "API-user")]
    ApiUser,
}

impl App {
    pub const ALL: [App; 4] = [
        App::Autographa,
        App::VachanOnline,
        App::VachanAdmin,
        App::ApiUser,
    ];

    /// Header value the client sends.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Autographa => "Autographa",
            Self::VachanOnline => "Vachan-online or vachan-app",
            Self::VachanAdmin => "VachanAdmin",
            Self::ApiUser => "API-user",
        }
    }

    /// Role granted to a user registering through this app.
    #[must_use]
    pub fn registration_role(self) -> &'static str {
        match self {
            Self::Autographa => roles::AG_USER,
            Self::VachanOnline => roles::VACHAN_USER,
            Self::VachanAdmin => roles::VACHAN_ADMIN,
            Self::ApiUser => roles::API_USER,
        }
    }

    /// App label reported back for a registered role; unknown roles are API users.
    #[must_use]
    pub fn for_role(role: &str) -> App {
        match role {
            roles::AG_USER => Self::Autographa,
            roles::VACHAN_USER => Self::VachanOnline,
            roles::VACHAN_ADMIN => Self::VachanAdmin,
            _ => Self::ApiUser,
        }
    }
}

impl FromStr for App {
    type Err = ();

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|app| app.as_str() == value)
            .ok_or(())
    }
}

/// Immutable description of the request being authorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub method: Method,
    pub endpoint: String,
    /// Raw value of the `app` header, if the client sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub path_params: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new(method: impl Into<Method>, endpoint: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            endpoint: endpoint.into(),
            app: None,
            path_params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Requesting application, if the header names a known one.
    #[must_use]
    pub fn requesting_app(&self) -> Option<App> {
        self.app.as_deref().and_then(|raw| raw.parse().ok())
    }

    /// Endpoint without its trailing slash.
    #[must_use]
    pub fn path(&self) -> &str {
        trim_endpoint(&self.endpoint)
    }

    /// Role a registration through this request grants; clients without a
    /// known `app` header register as API users.
    #[must_use]
    pub fn registration_role(&self) -> &'static str {
        self.requesting_app().map_or(roles::API_USER, App::registration_role)
    }

    /// The `<resource>` in `/v2/<resource>/...`.
    #[must_use]
    pub fn resource_segment(&self) -> Option<&str> {
        self.endpoint.split('/').nth(RESOURCE_SEGMENT_INDEX)
    }

    #[must_use]
    pub fn last_segment(&self) -> &str {
        self.path().rsplit('/').next().unwrap_or_default()
    }
}

/// `/v2/sources/` and `/v2/sources` name the same endpoint.
#[must_use]
pub fn trim_endpoint(endpoint: &str) -> &str {
    endpoint.trim_end_matches('/')
}
