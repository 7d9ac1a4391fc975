//! Typed filter predicates parsed from query parameters
//!
//! Every non-reserved query key becomes one [`Condition`]. A trailing
//! bracket group naming an operator selects the comparison; any other
//! bracket group is a nested path segment:
//!
//! ```text
//! averageCost[gte]=5000      -> averageCost >= 5000
//! careers[in]=Business,Other -> careers in ["Business", "Other"]
//! location[state]=MA         -> location.state == "MA"
//! housing=true               -> housing == true
//! ```
//!
//! Field names and values are never rewritten, so a field called `in` or
//! a value `gt` stays literal.

use crate::core::error::ValidationError;
use crate::core::field::{FieldValue, get_path};
use crate::core::query::QueryParams;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Earth radius in miles, used to turn distances into radians
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Comparison operators accepted as bracket suffixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Operator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            "in" => Some(Operator::In),
            _ => None,
        }
    }
}

/// Operator together with its operand
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(FieldValue),
    Gt(FieldValue),
    Gte(FieldValue),
    Lt(FieldValue),
    Lte(FieldValue),
    In(Vec<FieldValue>),
}

impl Predicate {
    pub fn operator(&self) -> Operator {
        match self {
            Predicate::Eq(_) => Operator::Eq,
            Predicate::Gt(_) => Operator::Gt,
            Predicate::Gte(_) => Operator::Gte,
            Predicate::Lt(_) => Operator::Lt,
            Predicate::Lte(_) => Operator::Lte,
            Predicate::In(_) => Operator::In,
        }
    }

    /// Test one stored value; arrays match when any element matches
    pub fn matches(&self, stored: &Value) -> bool {
        if let Value::Array(items) = stored
            && !matches!(self, Predicate::Eq(_) | Predicate::In(_))
        {
            return items.iter().any(|item| self.matches(item));
        }

        let ordered = |target: &FieldValue, accept: fn(Ordering) -> bool| {
            target.compare_stored(stored).is_some_and(accept)
        };

        match self {
            Predicate::Eq(target) => target.matches_stored(stored),
            Predicate::Gt(target) => ordered(target, Ordering::is_gt),
            Predicate::Gte(target) => ordered(target, Ordering::is_ge),
            Predicate::Lt(target) => ordered(target, Ordering::is_lt),
            Predicate::Lte(target) => ordered(target, Ordering::is_le),
            Predicate::In(targets) => targets.iter().any(|t| t.matches_stored(stored)),
        }
    }
}

/// One field test
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Dotted document path
    pub field: String,
    pub predicate: Predicate,
}

impl Condition {
    pub fn new(field: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            field: field.into(),
            predicate,
        }
    }

    /// Missing fields never match
    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        match get_path(doc, &self.field) {
            Some(Value::Null) | None => false,
            Some(stored) => self.predicate.matches(stored),
        }
    }
}

/// Points within a spherical cap around a centre
#[derive(Debug, Clone, PartialEq)]
pub struct GeoWithin {
    /// Path to a GeoJSON point (`{ "coordinates": [lng, lat] }`)
    pub field: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Angular radius in radians
    pub radius: f64,
}

impl GeoWithin {
    /// Circle of `miles` around a point
    pub fn miles(field: impl Into<String>, longitude: f64, latitude: f64, miles: f64) -> Self {
        Self {
            field: field.into(),
            longitude,
            latitude,
            radius: miles / EARTH_RADIUS_MILES,
        }
    }

    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        let Some(coordinates) = get_path(doc, &self.field)
            .and_then(|point| point.get("coordinates"))
            .and_then(Value::as_array)
        else {
            return false;
        };
        let (Some(lng), Some(lat)) = (
            coordinates.first().and_then(Value::as_f64),
            coordinates.get(1).and_then(Value::as_f64),
        ) else {
            return false;
        };
        central_angle(self.longitude, self.latitude, lng, lat) <= self.radius
    }
}

/// Haversine angle between two points, in radians
pub fn central_angle(lng1: f64, lat1: f64, lng2: f64, lat2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * a.sqrt().min(1.0).asin()
}

/// Conjunction of conditions, optionally restricted to a geographic area
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<Condition>,
    pub geo: Option<GeoWithin>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for an equality filter
    pub fn eq(field: impl Into<String>, value: FieldValue) -> Self {
        Self::new().and(Condition::new(field, Predicate::Eq(value)))
    }

    /// Documents whose `field` is one of `values`
    pub fn any_of(field: impl Into<String>, values: Vec<FieldValue>) -> Self {
        Self::new().and(Condition::new(field, Predicate::In(values)))
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn within(mut self, geo: GeoWithin) -> Self {
        self.geo = Some(geo);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.geo.is_none()
    }

    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
            && self.geo.as_ref().is_none_or(|g| g.matches(doc))
    }

    /// Build the filter for a listing request, skipping reserved keys
    pub fn from_params(params: &QueryParams) -> Result<Self, ValidationError> {
        let mut filter = Filter::new();
        for (key, values) in params.filter_params() {
            let (field, operator) = parse_key(key)?;
            let predicate = build_predicate(key, operator, values)?;
            filter.conditions.push(Condition { field, predicate });
        }
        Ok(filter)
    }
}

fn malformed(key: &str, message: &str) -> ValidationError {
    ValidationError::MalformedFilter {
        key: key.to_string(),
        message: message.to_string(),
    }
}

/// Split `location[city]` or `averageCost[gt]` into a path and operator
fn parse_key(key: &str) -> Result<(String, Operator), ValidationError> {
    let (base, mut rest) = match key.find('[') {
        Some(pos) => key.split_at(pos),
        None => (key, ""),
    };
    if base.is_empty() || base.contains(']') {
        return Err(malformed(key, "expected a field name before any brackets"));
    }

    let mut segments: Vec<&str> = Vec::new();
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return Err(malformed(key, "unexpected text after ']'"));
        };
        let Some(close) = inner.find(']') else {
            return Err(malformed(key, "unbalanced brackets"));
        };
        let segment = &inner[..close];
        if segment.is_empty() || segment.contains('[') {
            return Err(malformed(key, "empty or nested bracket segment"));
        }
        segments.push(segment);
        rest = &inner[close + 1..];
    }

    let operator = segments
        .last()
        .and_then(|last| Operator::from_token(last));
    if operator.is_some() {
        segments.pop();
    }

    let mut path = base.to_string();
    for segment in segments {
        path.push('.');
        path.push_str(segment);
    }
    Ok((path, operator.unwrap_or(Operator::Eq)))
}

fn build_predicate(
    key: &str,
    operator: Operator,
    values: &[String],
) -> Result<Predicate, ValidationError> {
    match operator {
        Operator::In => Ok(Predicate::In(
            values
                .iter()
                .flat_map(|v| v.split(','))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(FieldValue::parse)
                .collect(),
        )),
        // A repeated plain key is a membership test, like `?careers=A&careers=B`.
        Operator::Eq if values.len() > 1 => Ok(Predicate::In(
            values.iter().map(|v| FieldValue::parse(v)).collect(),
        )),
        _ => {
            let [value] = values else {
                return Err(malformed(key, "conflicting values for the same comparison"));
            };
            let value = FieldValue::parse(value);
            Ok(match operator {
                Operator::Gt => Predicate::Gt(value),
                Operator::Gte => Predicate::Gte(value),
                Operator::Lt => Predicate::Lt(value),
                Operator::Lte => Predicate::Lte(value),
                Operator::Eq | Operator::In => Predicate::Eq(value),
            })
        }
    }
}
