use std::collections::{BTreeMap, HashMap};

use crate::errors::ApiError;

/// Decoded query string: parameter name to its values in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    values: BTreeMap<String, Vec<String>>,
}

impl ParameterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `a=1&b=x%20y&a=2`. A leading `?` is ignored, `+` is a space,
    /// a key without `=` gets the empty value and pairs with an empty key are dropped.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut out = Self::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(k);
            if key.is_empty() {
                continue;
            }
            out.push(key, decode_component(v));
        }
        out
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut out = Self::new();
        for (k, v) in pairs {
            out.push(k.into(), v.into());
        }
        out
    }

    pub fn push(&mut self, key: String, value: String) {
        self.values.entry(key).or_default().push(value);
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// First value for `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    /// Every value for `name`, in order. Empty when absent.
    #[must_use]
    pub fn all(&self, name: &str) -> &[String] {
        self.values.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(s) => s.into_owned(),
        // invalid UTF-8 after decoding; keep the bytes we can
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes()))
            .into_owned(),
    }
}

/// Named path segments captured by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    /// Drops empty and wildcard (`*`) keys.
    ///
    /// # Errors
    /// Returns `ApiError::MissingRouteParams` when no named parameter remains.
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, ApiError>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| !k.is_empty() && k != "*")
            .collect();
        if map.is_empty() {
            return Err(ApiError::MissingRouteParams);
        }
        Ok(Self(map))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_repeated_keys_in_order() {
        let p = ParameterSet::parse("?tag=b&tag=a&name=x");
        assert_eq!(p.all("tag"), ["b".to_string(), "a".to_string()]);
        assert_eq!(p.first("tag"), Some("b"));
        assert_eq!(p.first("name"), Some("x"));
        assert!(p.all("missing").is_empty());
    }

    #[test]
    fn parse_percent_and_plus_decoding() {
        let p = ParameterSet::parse("q=hello+world&r=a%26b%3Dc&s=caf%C3%A9");
        assert_eq!(p.first("q"), Some("hello world"));
        assert_eq!(p.first("r"), Some("a&b=c"));
        assert_eq!(p.first("s"), Some("café"));
    }

    #[test]
    fn parse_edge_pairs() {
        let p = ParameterSet::parse("flag&=orphan&&x=");
        assert!(p.has("flag"));
        assert_eq!(p.first("flag"), Some(""));
        assert_eq!(p.first("x"), Some(""));
        assert_eq!(p.keys().count(), 2);
    }

    #[test]
    fn route_params_drop_wildcards() {
        let r = RouteParams::from_pairs([("id", "42"), ("*", "rest"), ("", "x")]).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r.get("id"), Some("42"));
        let err = RouteParams::from_pairs([("*", "rest")]).unwrap_err();
        assert!(matches!(err, ApiError::MissingRouteParams));
        assert_eq!(err.to_string(), "param is nil");
    }
}
