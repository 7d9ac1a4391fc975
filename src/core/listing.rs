//! Generic listing middleware ("advanced results")
//!
//! Turns an arbitrary query string into a filtered, sorted, paginated and
//! optionally relation-expanded page of one collection. The middleware runs
//! before the route's handler and leaves a [`ResultEnvelope`] in the
//! request extensions; the handler returns it as-is.
//!
//! ```rust,ignore
//! let listing = AdvancedResults::new(bootcamps.clone())
//!     .populate(RelationSpec::reverse("courses", courses, "bootcamp"));
//!
//! Router::new().route("/bootcamps", listing_route(listing).post(create_bootcamp));
//! ```

use crate::core::error::ApiResult;
use crate::core::filter::Filter;
use crate::core::query::{ID_FIELD, Projection, QueryParams, ResultEnvelope};
use crate::core::relation::RelationSpec;
use crate::core::store::{Collection, Document, FindOptions};
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{MethodRouter, get};
use axum::{Extension, Json};
use serde_json::Value;
use std::sync::Arc;

/// A collection plus the relations a route wants expanded
#[derive(Clone, Debug)]
pub struct AdvancedResults {
    collection: Arc<dyn Collection>,
    relations: Vec<RelationSpec>,
}

impl AdvancedResults {
    pub fn new(collection: Arc<dyn Collection>) -> Self {
        Self {
            collection,
            relations: Vec::new(),
        }
    }

    /// Expand a relation on every listed document
    pub fn populate(mut self, relation: RelationSpec) -> Self {
        self.relations.push(relation);
        self
    }

    pub async fn build(&self, params: &QueryParams) -> ApiResult<ResultEnvelope> {
        build(self.collection.as_ref(), params, &self.relations).await
    }
}

/// Run one listing: one count, one fetch, one query per relation.
///
/// The count uses the same filter as the fetch, so `pagination.next`
/// reflects the filtered total.
pub async fn build(
    collection: &dyn Collection,
    params: &QueryParams,
    relations: &[RelationSpec],
) -> ApiResult<ResultEnvelope> {
    let filter = Filter::from_params(params)?;
    let projection = params.projection()?;
    let sort = params.sort();
    let pagination = params.pagination();

    // Only expand paths the client can see.
    let relations: Vec<&RelationSpec> = relations
        .iter()
        .filter(|r| projection.as_ref().is_none_or(|p| p.keeps(r.field())))
        .collect();

    // Expansion needs `id` and the relation fields themselves; both are
    // narrowed again once the relations are in place.
    let fetched = projection.as_ref().map(|p| {
        relations
            .iter()
            .fold(p.retaining(ID_FIELD), |p, r| p.retaining(r.field()))
    });

    tracing::debug!(
        collection = collection.name(),
        conditions = filter.conditions.len(),
        relations = relations.len(),
        page = pagination.page,
        limit = pagination.limit,
        "building listing"
    );

    let total = collection.count(&filter).await?;

    let options = FindOptions::new(filter)
        .projection(fetched)
        .sort(sort)
        .skip(pagination.start_index())
        .limit(pagination.limit);
    let mut docs = collection.find(&options).await?;

    for relation in &relations {
        relation.expand(&mut docs).await?;
        if let Some(nested) = projection.as_ref().and_then(|p| p.nested(relation.field())) {
            for doc in docs.iter_mut() {
                project_expanded(doc, relation.field(), &nested);
            }
        }
    }

    if projection.as_ref().is_some_and(|p| !p.keeps(ID_FIELD)) {
        for doc in docs.iter_mut() {
            doc.remove(ID_FIELD);
        }
    }

    Ok(ResultEnvelope::new(
        docs.into_iter().map(Value::Object).collect(),
        pagination.links(total),
    ))
}

/// Narrow an expanded document, or each document of an expanded array
fn project_expanded(doc: &mut Document, field: &str, projection: &Projection) {
    let narrow = |value: &mut Value| {
        if let Value::Object(inner) = value {
            *inner = projection.apply(std::mem::take(inner));
        }
    };
    match doc.get_mut(field) {
        Some(Value::Array(items)) => items.iter_mut().for_each(narrow),
        Some(value) => narrow(value),
        None => {}
    }
}

/// Middleware: build the envelope and hand it to the next stage
pub async fn advanced_results(
    State(listing): State<AdvancedResults>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let params = QueryParams::from_uri(request.uri())?;
    let envelope = listing.build(&params).await?;
    request.extensions_mut().insert(envelope);
    Ok(next.run(request).await)
}

/// Terminal handler for listing routes
pub async fn listed_results(Extension(results): Extension<ResultEnvelope>) -> Json<ResultEnvelope> {
    Json(results)
}

/// `GET` route that answers with the listing of `listing`
pub fn listing_route<S>(listing: AdvancedResults) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    get(listed_results).layer(middleware::from_fn_with_state(listing, advanced_results))
}
