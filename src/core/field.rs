//! Field values, formats and dotted-path access into JSON documents

use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// A typed scalar parsed from a query-string value
///
/// Query strings only carry text, so values are coerced in a fixed order:
/// boolean, integer, float, then string. Numbers keep the text they were
/// written as, so `02118` still equals the stored string `"02118"`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Boolean(bool),
    Integer { value: i64, raw: String },
    Float { value: f64, raw: String },
    String(String),
}

impl FieldValue {
    /// Coerce a raw query-string value
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => return FieldValue::Boolean(true),
            "false" => return FieldValue::Boolean(false),
            _ => {}
        }
        if let Ok(value) = raw.parse::<i64>() {
            return FieldValue::Integer {
                value,
                raw: raw.to_string(),
            };
        }
        if let Ok(value) = raw.parse::<f64>()
            && value.is_finite()
        {
            return FieldValue::Float {
                value,
                raw: raw.to_string(),
            };
        }
        FieldValue::String(raw.to_string())
    }

    pub fn integer(value: i64) -> Self {
        FieldValue::Integer {
            value,
            raw: value.to_string(),
        }
    }

    pub fn float(value: f64) -> Self {
        FieldValue::Float {
            value,
            raw: value.to_string(),
        }
    }

    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view, including numeric strings
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer { value, .. } => Some(*value as f64),
            FieldValue::Float { value, .. } => Some(*value),
            FieldValue::String(s) => s.parse().ok(),
            FieldValue::Boolean(_) => None,
        }
    }

    /// The text this value was parsed from
    pub fn raw(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Boolean(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            FieldValue::Integer { raw, .. } | FieldValue::Float { raw, .. } => Cow::Borrowed(raw),
            FieldValue::String(s) => Cow::Borrowed(s),
        }
    }

    /// Compare a stored document value against this value.
    ///
    /// Returns the ordering of `stored` relative to `self`, or `None` when
    /// the two are not comparable. Stored numbers compare numerically.
    /// Stored strings compare as text, except that a numeric string against
    /// a number orders numerically first; it is only equal when the text
    /// matches too.
    pub fn compare_stored(&self, stored: &Value) -> Option<Ordering> {
        match (stored, self) {
            (Value::Bool(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (Value::Bool(a), _) => Some(a.to_string().as_str().cmp(&self.raw())),
            (Value::Number(_), FieldValue::Boolean(_)) => None,
            (Value::Number(a), _) => {
                let b = self.as_f64()?;
                a.as_f64()?.partial_cmp(&b)
            }
            (Value::String(a), FieldValue::Integer { value, raw }) => {
                compare_numeric_text(a, *value as f64, raw)
            }
            (Value::String(a), FieldValue::Float { value, raw }) => compare_numeric_text(a, *value, raw),
            (Value::String(a), _) => Some(compare_strings(a, &self.raw())),
            _ => None,
        }
    }

    /// Whether a stored value equals this one; arrays match on any element
    pub fn matches_stored(&self, stored: &Value) -> bool {
        match stored {
            Value::Array(items) => items.iter().any(|item| self.matches_stored(item)),
            other => self.compare_stored(other) == Some(Ordering::Equal),
        }
    }
}

fn compare_numeric_text(stored: &str, value: f64, raw: &str) -> Option<Ordering> {
    let numeric = stored.parse::<f64>().ok()?.partial_cmp(&value)?;
    Some(numeric.then_with(|| stored.cmp(raw)))
}

/// Plain text ordering of stored strings
///
/// Timestamps are stored in one fixed-width UTC form, so text order is
/// also time order.
pub fn compare_strings(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Total order over stored JSON values, used for sorting.
///
/// Type ranks follow the document-store convention: missing and null sort
/// first, then numbers, strings, objects, arrays, booleans.
pub fn compare_json(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(Value::Object(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Bool(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => compare_strings(x, y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Array(x)), Some(Value::Array(y))) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = compare_json(Some(l), Some(r));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Look up a dotted path (`location.city`) in a document
pub fn get_path<'a>(doc: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Set a dotted path, creating intermediate objects as needed
pub fn set_path(doc: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            doc.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = doc
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(inner) = entry {
                set_path(inner, rest, value);
            }
        }
    }
}

/// Remove a dotted path, returning the removed value
pub fn remove_path(doc: &mut Map<String, Value>, path: &str) -> Option<Value> {
    match path.split_once('.') {
        None => doc.remove(path),
        Some((head, rest)) => match doc.get_mut(head)? {
            Value::Object(inner) => remove_path(inner, rest),
            _ => None,
        },
    }
}

/// Field format validators
#[derive(Debug, Clone)]
pub enum FieldFormat {
    Email,
    Url,
}

impl FieldFormat {
    /// Validate a string against this format
    pub fn validate(&self, value: &str) -> bool {
        match self {
            FieldFormat::Email => Self::is_valid_email(value),
            FieldFormat::Url => Self::is_valid_url(value),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            FieldFormat::Email => "email",
            FieldFormat::Url => "URL with HTTP or HTTPS",
        }
    }

    fn is_valid_email(email: &str) -> bool {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
        });
        regex.is_match(email)
    }

    fn is_valid_url(url: &str) -> bool {
        static URL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = URL_REGEX.get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());
        regex.is_match(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_coercion_order() {
        assert_eq!(FieldValue::parse("true"), FieldValue::Boolean(true));
        assert_eq!(FieldValue::parse("42"), FieldValue::integer(42));
        assert_eq!(FieldValue::parse("4.5"), FieldValue::float(4.5));
        assert_eq!(FieldValue::parse("Boston"), FieldValue::String("Boston".into()));
        assert_eq!(FieldValue::parse("NaN"), FieldValue::String("NaN".into()));
        assert_eq!(FieldValue::parse(""), FieldValue::String("".into()));
    }

    #[test]
    fn test_raw_string_round_trip() {
        for raw in ["true", "17", "2.5", "gt", "in", "02118", "1.50", "007", "1e3"] {
            assert_eq!(FieldValue::parse(raw).raw(), raw);
        }
    }

    #[test]
    fn test_written_form_decides_string_equality() {
        let zipcode = FieldValue::parse("02118");
        assert!(zipcode.matches_stored(&json!("02118")));
        assert!(!zipcode.matches_stored(&json!("2118")));
        assert!(zipcode.matches_stored(&json!(2118)));

        let price = FieldValue::parse("1.50");
        assert!(price.matches_stored(&json!("1.50")));
        assert!(!price.matches_stored(&json!("1.5")));
        assert!(price.matches_stored(&json!(1.5)));

        assert!(!FieldValue::parse("007").matches_stored(&json!("7")));
    }

    #[test]
    fn test_numeric_strings_order_numerically() {
        let eight = FieldValue::parse("8");
        assert_eq!(eight.compare_stored(&json!("12")), Some(Ordering::Greater));
        assert_eq!(eight.compare_stored(&json!("4")), Some(Ordering::Less));
        // same number, different text: ordered, never equal
        assert_eq!(FieldValue::parse("02118").compare_stored(&json!("2118")), Some(Ordering::Greater));
    }

    #[test]
    fn test_numeric_strings_compare_numerically() {
        let eight = FieldValue::integer(8);
        assert_eq!(eight.compare_stored(&json!("8")), Some(Ordering::Equal));
        assert_eq!(eight.compare_stored(&json!(10)), Some(Ordering::Greater));
        assert_eq!(eight.compare_stored(&json!("twelve")), None);
    }

    #[test]
    fn test_matches_any_array_element() {
        let career = FieldValue::String("Business".into());
        assert!(career.matches_stored(&json!(["Web Development", "Business"])));
        assert!(!career.matches_stored(&json!(["UI/UX"])));
    }

    #[test]
    fn test_string_order_is_total() {
        // mixed offsets and timestamp-like text used to form a cycle
        let mut values = [
            "2020-01-01T10:00:00+09:00",
            "2020-01-01T05:00:00Z",
            "2020-01-01T07",
            "Boston",
        ];
        values.sort_by(|a, b| compare_strings(a, b));
        assert_eq!(
            values,
            ["2020-01-01T05:00:00Z", "2020-01-01T07", "2020-01-01T10:00:00+09:00", "Boston"]
        );
        for a in values {
            for b in values {
                assert_eq!(compare_strings(a, b), compare_strings(b, a).reverse());
            }
        }

        let earlier = "2024-01-01T00:00:00.000Z";
        let later = "2024-01-01T00:00:00.500Z";
        assert_eq!(compare_json(Some(&json!(later)), Some(&json!(earlier))), Ordering::Greater);
    }

    #[test]
    fn test_compare_json_missing_sorts_first() {
        assert_eq!(compare_json(None, Some(&json!(1))), Ordering::Less);
        assert_eq!(compare_json(Some(&json!("a")), Some(&json!(1))), Ordering::Greater);
        assert_eq!(compare_json(Some(&json!(2)), Some(&json!(10))), Ordering::Less);
    }

    #[test]
    fn test_paths() {
        let mut doc = json!({"location": {"city": "Boston"}})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(get_path(&doc, "location.city"), Some(&json!("Boston")));
        assert_eq!(get_path(&doc, "location.zip"), None);

        set_path(&mut doc, "location.state", json!("MA"));
        set_path(&mut doc, "meta.source", json!("seed"));
        assert_eq!(get_path(&doc, "location.state"), Some(&json!("MA")));
        assert_eq!(get_path(&doc, "meta.source"), Some(&json!("seed")));

        assert_eq!(remove_path(&mut doc, "location.city"), Some(json!("Boston")));
        assert_eq!(get_path(&doc, "location.city"), None);
    }

    #[test]
    fn test_email_validation() {
        let format = FieldFormat::Email;
        assert!(format.validate("test@example.com"));
        assert!(format.validate("user.name+tag@example.co.uk"));
        assert!(!format.validate("invalid-email"));
        assert!(!format.validate("@example.com"));
    }

    #[test]
    fn test_url_validation() {
        let format = FieldFormat::Url;
        assert!(format.validate("https://devworks.com"));
        assert!(format.validate("http://test.com/path?query=1"));
        assert!(!format.validate("not a url"));
        assert!(!format.validate("ftp://files.example.com"));
    }
}
