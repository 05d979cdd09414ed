//! Query string parsing and lookups used by the action classifier.

use percent_encoding::percent_decode_str;

/// Ordered, percent-decoded query parameters of a request.
///
/// Bare keys such as `?acl` are kept with an empty value, so presence checks
/// work the same for `?acl` and `?acl=`.
///
/// # Examples
///
/// ```
/// use s3gate_core::query::QueryParams;
///
/// let q = QueryParams::parse("list-type=2&prefix=a%2Fb&acl");
/// assert!(q.has("acl"));
/// assert_eq!(q.get("prefix"), Some("a/b"));
/// assert_eq!(q.get_uint_or_zero("list-type"), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a raw query string (without the leading `?`).
    #[must_use]
    pub fn parse(query: &str) -> Self {
        if query.is_empty() {
            return Self::default();
        }

        let params = query
            .split('&')
            .filter(|s| !s.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (decode_component(key), decode_component(value)),
                None => (decode_component(pair), String::new()),
            })
            .collect();

        Self { params }
    }

    /// Whether a parameter with this exact (case-sensitive) name is present.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }

    /// The value of the first parameter with this name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The parameter parsed as an unsigned decimal integer, or `0` when it is
    /// absent or not a valid unsigned integer.
    #[must_use]
    pub fn get_uint_or_zero(&self, key: &str) -> u64 {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over `(key, value)` pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn decode_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
