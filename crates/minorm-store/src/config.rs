//! Externally supplied storage connection parameters.

use minorm_core::{Error, Result};

/// Connection parameters for a store backend.
///
/// Built by the caller from its own configuration source; nothing in the
/// kernel hardcodes an address, credential or schema.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    url: String,
    user: Option<String>,
    password: Option<String>,
    schema: Option<String>,
    application_name: Option<String>,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: None,
            password: None,
            schema: None,
            application_name: None,
        }
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Default schema for unqualified table names.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn user_ref(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password_ref(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn application_name_ref(&self) -> Option<&str> {
        self.application_name.as_deref()
    }

    pub fn schema_ref(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// The scheme portion of the url, used by backends to check they were
    /// handed a config they understand.
    pub fn scheme(&self) -> Result<&str> {
        self.url
            .split_once(':')
            .map(|(scheme, _)| scheme)
            .ok_or_else(|| Error::config(format!("store url '{}' has no scheme", self.url)))
    }
}
