use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl Address {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: String::new(),
        }
    }

    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }

    pub fn domain(&self) -> Option<&str> {
        self.email
            .rsplit_once('@')
            .map(|(_, domain)| domain)
            .filter(|domain| !domain.is_empty())
    }

    /// The address with an internationalized domain converted to punycode.
    pub fn encoded(&self) -> Cow<'_, str> {
        match self.email.rsplit_once('@') {
            Some((local, domain)) if !domain.is_ascii() => match url::Host::parse(domain) {
                Ok(url::Host::Domain(ascii)) => Cow::Owned(format!("{local}@{ascii}")),
                _ => Cow::Borrowed(&self.email),
            },
            _ => Cow::Borrowed(&self.email),
        }
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Address::new(value)
    }
}

/// Renders `"Name" <email>` when a display name is set, the bare address otherwise.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            return f.write_str(&self.encoded());
        }

        let quoted = self.name.replace('"', "\\\"");
        write!(f, "\"{}\" <{}>", quoted, self.encoded())
    }
}

pub fn join_addresses<'a>(addresses: impl IntoIterator<Item = &'a Address>) -> String {
    addresses
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
