//! Request parameters and the stateless helpers every endpoint shares.

use serde_json::{Map, Value};

/// Ordered flat parameter set sent as the query string of a request.
///
/// Setting a key that is already present replaces its value in place, so
/// the first insertion fixes the key's position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `set`.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(idx).1)
    }

    /// Store `value` under `id_field` when it is numeric, otherwise under
    /// `name_field`. IDs are stored trimmed.
    pub fn route(&mut self, value: &str, id_field: &str, name_field: &str) {
        if is_numeric(value) {
            self.set(id_field, value.trim());
        } else {
            self.set(name_field, value);
        }
    }

    /// Move a caller-supplied `pack` entry to `pack_id` or `package`. An
    /// empty `pack` is sent as is.
    pub(crate) fn reroute_pack(&mut self) {
        if self.get("pack").is_some_and(|pack| !pack.is_empty()) {
            if let Some(pack) = self.remove("pack") {
                self.route(&pack, "pack_id", "package");
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

/// True when `s`, ignoring surrounding whitespace, is an optionally signed
/// run of ASCII digits. There is no width limit.
pub fn is_numeric(s: &str) -> bool {
    let s = s.trim();
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Render filters as `%name:value` segments with no separator.
///
/// With an allow-list, segments follow the allow-list order and names not
/// on it are dropped. Without one, every input filter is emitted in input
/// order. Unknown names are never an error.
pub fn format_filters(input: &Params, allowed: Option<&[&str]>) -> String {
    let mut out = String::new();
    let mut push = |name: &str, value: &str| {
        out.push('%');
        out.push_str(name);
        out.push(':');
        out.push_str(value);
    };
    match allowed {
        Some(allowed) => {
            for name in allowed {
                if let Some(value) = input.get(name) {
                    push(name, value);
                }
            }
        }
        None => {
            for (name, value) in input.iter() {
                push(name, value);
            }
        }
    }
    out
}

/// Copy of `map` without the keys that parse as integers.
///
/// The upstream returns rows with every column twice, once by index and
/// once by name; only the named copy is kept.
pub fn strip_numeric_keys(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !is_numeric(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_replaces_in_place() {
        let mut params = Params::new().with("a", 1).with("b", "two");
        params.set("a", 3);
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "two")]);
    }

    #[test]
    fn remove_returns_value() {
        let mut params = Params::new().with("pack", "gold");
        assert_eq!(params.remove("pack").as_deref(), Some("gold"));
        assert!(params.is_empty());
        assert!(params.remove("pack").is_none());
    }

    #[test]
    fn numeric_detection() {
        assert!(is_numeric("42"));
        assert!(is_numeric(" 7 "));
        assert!(is_numeric("-3"));
        assert!(!is_numeric("example.com"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("4.2"));
        assert!(!is_numeric("12abc"));
        assert!(!is_numeric("-"));
        assert!(!is_numeric("+-1"));
        assert!(is_numeric("+8"));
        assert!(is_numeric("12345678901234567890"));
    }

    #[test]
    fn route_trims_ids() {
        let mut params = Params::new();
        params.route(" 42 ", "domain_id", "domain");
        assert_eq!(params.get("domain_id"), Some("42"));
    }

    #[test]
    fn route_wide_integer_goes_to_id_field() {
        let mut params = Params::new();
        params.route("12345678901234567890", "domain_id", "domain");
        assert_eq!(params.get("domain_id"), Some("12345678901234567890"));
        assert!(params.get("domain").is_none());
    }

    #[test]
    fn route_numeric_goes_to_id_field() {
        let mut params = Params::new();
        params.route("42", "domain_id", "domain");
        assert_eq!(params.get("domain_id"), Some("42"));
        assert!(params.get("domain").is_none());
    }

    #[test]
    fn route_name_goes_to_name_field() {
        let mut params = Params::new();
        params.route("example.com", "domain_id", "domain");
        assert_eq!(params.get("domain"), Some("example.com"));
        assert!(params.get("domain_id").is_none());
    }

    #[test]
    fn reroute_pack_by_kind() {
        let mut params = Params::new().with("pack", "5");
        params.reroute_pack();
        assert_eq!(params.get("pack_id"), Some("5"));
        assert!(params.get("pack").is_none());

        let mut params = Params::new().with("pack", "Reseller Gold");
        params.reroute_pack();
        assert_eq!(params.get("package"), Some("Reseller Gold"));
    }

    #[test]
    fn reroute_pack_keeps_empty_pack() {
        let mut params = Params::new().with("pack", "");
        params.reroute_pack();
        assert_eq!(params.get("pack"), Some(""));
        assert!(params.get("package").is_none());
        assert!(params.get("pack_id").is_none());
    }

    #[test]
    fn filters_follow_allow_list_order() {
        let input = Params::new()
            .with("status", "active")
            .with("bogus", "x")
            .with("search", "foo");
        let out = format_filters(&input, Some(&["search", "status", "pack_id"]));
        assert_eq!(out, "%search:foo%status:active");
    }

    #[test]
    fn filters_without_allow_list_keep_input_order() {
        let input = Params::new().with("b", 2).with("a", 1);
        assert_eq!(format_filters(&input, None), "%b:2%a:1");
    }

    #[test]
    fn filters_empty_input() {
        assert_eq!(format_filters(&Params::new(), Some(&["search"])), "");
    }

    #[test]
    fn strip_numeric_keys_keeps_named_copy() {
        let row = json!({"0": "example.com", "domain": "example.com", "1": 5, "pack_id": 5});
        let stripped = strip_numeric_keys(row.as_object().unwrap());
        assert_eq!(Value::Object(stripped), json!({"domain": "example.com", "pack_id": 5}));
    }

    #[test]
    fn strip_numeric_keys_handles_wide_keys() {
        let row = json!({"12345678901234567890": 1, "-3": 2, "name": 3});
        let stripped = strip_numeric_keys(row.as_object().unwrap());
        assert_eq!(Value::Object(stripped), json!({"name": 3}));
    }
}
