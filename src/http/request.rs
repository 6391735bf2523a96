use std::collections::{BTreeSet, HashMap};

use super::{Method, Version};

/// A parsed request. Built once per connection and never mutated.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub version: Version,
    pub headers: HashMap<String, String>,
    /// Value of the `Host` header, or empty.
    pub host: String,
    /// Host and request target combined, for logging.
    pub url: String,
    /// Percent-decoded path component.
    pub path: String,
    pub query: HashMap<String, BTreeSet<String>>,
    pub body: Vec<u8>,
}

impl Request {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query_param(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.query.get(key)
    }
}
