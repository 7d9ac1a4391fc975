//! Query parameters, projection, sorting and pagination utilities
//!
//! Listing endpoints accept an open-ended query string. Four keys are
//! reserved and shape the response; every other key is a filter:
//!
//! ```text
//! GET /bootcamps?select=name,description&sort=-averageCost&page=2&limit=5
//! GET /bootcamps?averageCost[lte]=10000&careers[in]=Business,UI/UX
//! ```

use crate::core::error::ValidationError;
use crate::core::field::{get_path, remove_path, set_path};
use axum::extract::{FromRequestParts, Query};
use axum::http::Uri;
use axum::http::request::Parts;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Keys that never reach the filter predicate
pub const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Sort applied when the client does not ask for one
pub const DEFAULT_SORT: &str = "-createdAt";

/// Identity field, always part of an inclusion projection
pub const ID_FIELD: &str = "id";

/// Raw query parameters in arrival order
///
/// Repeated keys keep every value (`careers=A&careers=B`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    params: IndexMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded key/value pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut params: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, value) in pairs {
            params.entry(key.into()).or_default().push(value.into());
        }
        Self { params }
    }

    /// Decode the query string of a request URI
    pub fn from_uri(uri: &Uri) -> Result<Self, ValidationError> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).map_err(|e| {
            ValidationError::InvalidQuery {
                param: "query".to_string(),
                message: e.body_text(),
            }
        })?;
        Ok(Self::from_pairs(pairs))
    }

    /// First value of a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.params.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// The parameters that describe the filter
    pub fn filter_params(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.iter().filter(|(key, _)| !RESERVED_KEYS.contains(key))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Projection requested through `select`
    pub fn projection(&self) -> Result<Option<Projection>, ValidationError> {
        match self.get("select") {
            Some(select) => Projection::parse(select),
            None => Ok(None),
        }
    }

    /// Sort keys requested through `sort`, or the default
    pub fn sort(&self) -> Vec<SortKey> {
        self.get("sort")
            .map(SortKey::parse_list)
            .filter(|keys| !keys.is_empty())
            .unwrap_or_else(|| SortKey::parse_list(DEFAULT_SORT))
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(
            positive_or(self.get("page"), DEFAULT_PAGE),
            positive_or(self.get("limit"), DEFAULT_LIMIT),
        )
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = crate::core::error::ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_uri(&parts.uri)?)
    }
}

fn positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination state for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    /// Non-positive values fall back to the defaults
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    pub fn start_index(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn end_index(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }

    /// Neighbouring pages, given the number of matching documents
    pub fn links(&self, total: u64) -> PaginationLinks {
        PaginationLinks {
            next: (self.end_index() < total).then(|| PageRef {
                page: self.page + 1,
                limit: self.limit,
            }),
            prev: (self.start_index() > 0).then(|| PageRef {
                page: self.page - 1,
                limit: self.limit,
            }),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PageRef {
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PaginationLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

// =============================================================================
// Sorting
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parse `name,-createdAt`; empty segments are skipped
    pub fn parse_list(raw: &str) -> Vec<SortKey> {
        raw.split(',')
            .map(str::trim)
            .filter_map(|segment| match segment.strip_prefix('-') {
                Some("") => None,
                Some(field) => Some(SortKey::desc(field)),
                None if segment.is_empty() => None,
                None => Some(SortKey::asc(segment)),
            })
            .collect()
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Fields returned per document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Only these fields, plus `id`
    Include(Vec<String>),
    /// Everything but these fields
    Exclude(Vec<String>),
}

impl Projection {
    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Include(fields.into_iter().map(Into::into).collect())
    }

    /// Parse a `select` value.
    ///
    /// `name,email` includes, `-photo,-website` excludes; mixing the two is
    /// rejected. An empty list yields no projection.
    pub fn parse(raw: &str) -> Result<Option<Self>, ValidationError> {
        let fields: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty() && *f != "-")
            .collect();
        if fields.is_empty() {
            return Ok(None);
        }

        let excluded = fields.iter().filter(|f| f.starts_with('-')).count();
        if excluded == 0 {
            Ok(Some(Projection::include(fields)))
        } else if excluded == fields.len() {
            Ok(Some(Projection::Exclude(
                fields
                    .iter()
                    .map(|f| f.trim_start_matches('-').to_string())
                    .collect(),
            )))
        } else {
            Err(ValidationError::InvalidQuery {
                param: "select".to_string(),
                message: "cannot mix included and excluded fields".to_string(),
            })
        }
    }

    /// Whether a top-level path survives this projection
    pub fn keeps(&self, path: &str) -> bool {
        match self {
            Projection::Include(fields) => {
                path == ID_FIELD
                    || fields
                        .iter()
                        .any(|f| f == path || f.starts_with(&format!("{}.", path)))
            }
            Projection::Exclude(fields) => !fields.iter().any(|f| f == path),
        }
    }

    /// The same projection, widened so that `path` is fetched whole
    pub fn retaining(&self, path: &str) -> Self {
        let nested = format!("{}.", path);
        match self {
            Projection::Include(fields) => {
                let mut fields: Vec<String> = fields
                    .iter()
                    .filter(|f| *f != path && !f.starts_with(&nested))
                    .cloned()
                    .collect();
                if path != ID_FIELD {
                    fields.push(path.to_string());
                }
                Projection::Include(fields)
            }
            Projection::Exclude(fields) => {
                Projection::Exclude(fields.iter().filter(|f| *f != path).cloned().collect())
            }
        }
    }

    /// The part of this projection below `path` (`courses.title` gives
    /// `title` for `courses`); `None` when `path` is kept whole
    pub fn nested(&self, path: &str) -> Option<Self> {
        let prefix = format!("{}.", path);
        let below = |fields: &[String]| -> Vec<String> {
            fields
                .iter()
                .filter_map(|f| f.strip_prefix(&prefix))
                .map(str::to_string)
                .collect()
        };
        match self {
            Projection::Include(fields) if fields.iter().any(|f| f == path) => None,
            Projection::Include(fields) => {
                Some(Projection::Include(below(fields.as_slice()))).filter(|p| !p.is_empty())
            }
            Projection::Exclude(fields) => {
                Some(Projection::Exclude(below(fields.as_slice()))).filter(|p| !p.is_empty())
            }
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Projection::Include(fields) | Projection::Exclude(fields) => fields.is_empty(),
        }
    }

    pub fn apply(&self, mut doc: Map<String, Value>) -> Map<String, Value> {
        match self {
            Projection::Include(fields) => {
                let mut projected = Map::new();
                if let Some(id) = doc.get(ID_FIELD) {
                    projected.insert(ID_FIELD.to_string(), id.clone());
                }
                for field in fields {
                    if let Some(value) = get_path(&doc, field) {
                        set_path(&mut projected, field, value.clone());
                    }
                }
                projected
            }
            Projection::Exclude(fields) => {
                for field in fields {
                    remove_path(&mut doc, field);
                }
                doc
            }
        }
    }
}

// =============================================================================
// Response envelopes
// =============================================================================

/// Result of a listing: the page plus its neighbours
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResultEnvelope {
    pub success: bool,
    pub count: usize,
    pub pagination: PaginationLinks,
    pub data: Vec<Value>,
}

impl ResultEnvelope {
    pub fn new(data: Vec<Value>, pagination: PaginationLinks) -> Self {
        Self {
            success: true,
            count: data.len(),
            pagination,
            data,
        }
    }
}

/// Plain success envelope for non-listing endpoints
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            count: None,
            data,
        }
    }
}

impl<T> DataResponse<Vec<T>> {
    pub fn counted(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(data.len()),
            data,
        }
    }
}
