//! Case-insensitive request header list.

/// Name of the authorization header.
pub const AUTHORIZATION: &str = "Authorization";

/// Ordered header list with case-insensitive lookup.
///
/// HTTP header names are case-insensitive, so a caller-supplied
/// `authorization` header counts as "already set" when the gateway
/// decides whether to attach its own bearer token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the value of a header, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sets a header, replacing any existing value with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Removes a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self
            .entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(index).1)
    }

    /// Sets `Authorization: Bearer <token>`.
    pub fn set_bearer(&mut self, token: &str) {
        self.set(AUTHORIZATION, bearer_value(token));
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of headers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no headers are set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (k, v) in iter {
            headers.set(k, v);
        }
        headers
    }
}

/// Formats a bearer credential.
#[must_use]
pub fn bearer_value(token: &str) -> String {
    format!("Bearer {token}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("authorization", "Bearer x");
        assert!(headers.contains(AUTHORIZATION));
        assert_eq!(headers.get("AUTHORIZATION"), Some("Bearer x"));
    }

    #[test]
    fn test_set_replaces_existing() {
        let mut headers = Headers::new();
        headers.set("Authorization", "Bearer old");
        headers.set_bearer("new");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(AUTHORIZATION), Some("Bearer new"));
    }

    #[test]
    fn test_remove() {
        let mut headers: Headers = [("X-Trace", "1"), ("Accept", "application/json")]
            .into_iter()
            .collect();
        assert_eq!(headers.remove("x-trace"), Some("1".to_string()));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.remove("x-trace"), None);
    }
}
