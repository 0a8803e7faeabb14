//! URL query string encoding.
//!
//! Parameters keep their insertion order. Array values use repeated keys
//! (`id=1&id=2`), and keys and values are escaped independently with the
//! same character set as `encodeURIComponent`.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped in query and form components. Unreserved marks stay
/// literal.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A single query value before stringification.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryScalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for QueryScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryScalar::Str(s) => f.write_str(s),
            QueryScalar::Int(n) => write!(f, "{n}"),
            QueryScalar::Float(n) => f.write_str(&format_float(*n)),
            QueryScalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl QueryScalar {
    /// Integers stay `Int`; everything else becomes `Float`.
    pub fn from_number(n: &serde_json::Number) -> Self {
        match n.as_i64() {
            Some(i) => QueryScalar::Int(i),
            None => QueryScalar::Float(n.as_f64().unwrap_or(f64::NAN)),
        }
    }
}

/// Formats a float the way `String(number)` does in JavaScript: integral
/// values drop the fraction, magnitudes from 1e21 up and below 1e-6 use
/// exponent notation with an explicit sign, and non-finite values spell out
/// `NaN` / `Infinity`.
fn format_float(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return n.to_string();
    }
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => exp,
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident($conv:expr)),* $(,)?) => {
        $(
            impl From<$ty> for QueryScalar {
                fn from(value: $ty) -> Self {
                    QueryScalar::$variant($conv(value))
                }
            }

            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    QueryValue::One(QueryScalar::from(value))
                }
            }
        )*
    };
}

scalar_from! {
    &str => Str(str::to_string),
    String => Str(std::convert::identity),
    &String => Str(String::clone),
    i64 => Int(std::convert::identity),
    i32 => Int(i64::from),
    u32 => Int(i64::from),
    f64 => Float(std::convert::identity),
    bool => Bool(std::convert::identity),
}

/// A query parameter value: one scalar, or a list encoded as repeated keys.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    One(QueryScalar),
    Many(Vec<QueryScalar>),
}

impl From<QueryScalar> for QueryValue {
    fn from(value: QueryScalar) -> Self {
        QueryValue::One(value)
    }
}

impl<T: Into<QueryScalar>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::Many(values.into_iter().map(Into::into).collect())
    }
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an existing value in place so the original
    /// position is kept.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style `insert`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flattens into `(key, value)` string pairs, expanding lists.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.entries {
            match value {
                QueryValue::One(scalar) => pairs.push((key.clone(), scalar.to_string())),
                QueryValue::Many(items) => {
                    pairs.extend(items.iter().map(|item| (key.clone(), item.to_string())));
                }
            }
        }
        pairs
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Percent-encodes one key or value.
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// Joins already-stringified pairs as `k=v&k=v`, escaping each side.
pub fn encode_pairs<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k.as_ref()), encode_component(v.as_ref())))
        .collect::<Vec<_>>()
        .join("&")
}

/// Encodes query parameters. Returns an empty string for an empty mapping.
pub fn encode_query(params: &QueryParams) -> String {
    encode_pairs(&params.pairs())
}
