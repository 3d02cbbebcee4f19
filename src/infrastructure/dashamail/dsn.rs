use std::{collections::HashMap, str::FromStr};

use url::Url;

use crate::domain::errors::ConfigurationError;

/// Parsed `scheme://[user[:password]@]host[:port][?option=value&...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    scheme: String,
    host: String,
    user: Option<String>,
    password: Option<String>,
    port: Option<u16>,
    options: HashMap<String, String>,
}

impl Dsn {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            user: None,
            password: None,
            port: None,
            options: HashMap::new(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// `1`, `true`, `on` and `yes` (any case) are true, everything else is false.
    pub fn bool_option(&self, key: &str) -> bool {
        self.option(key).is_some_and(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            )
        })
    }
}

impl FromStr for Dsn {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(value).map_err(ConfigurationError::InvalidDsn)?;

        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or(ConfigurationError::InvalidDsn(url::ParseError::EmptyHost))?;

        let user = Some(url.username())
            .filter(|user| !user.is_empty())
            .map(decode);
        let password = url.password().map(decode);

        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            user,
            password,
            port: url.port(),
            options: url.query_pairs().into_owned().collect(),
        })
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
