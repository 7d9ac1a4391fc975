//! Relation expansion: inlining related documents into a result page
//!
//! Two shapes are supported:
//!
//! - a forward reference, where a document field holds another document's
//!   id (`course.bootcamp`) and is replaced by that document;
//! - a reverse reference, where documents of another collection point back
//!   (`courses` whose `bootcamp` is this bootcamp) and are attached as an
//!   array under a new field.
//!
//! Each relation costs one extra query per page, never one per document.

use crate::core::error::StorageError;
use crate::core::field::{FieldValue, get_path, set_path};
use crate::core::filter::Filter;
use crate::core::query::Projection;
use crate::core::store::{Collection, Document, FindOptions};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub enum RelationSpec {
    /// Replace `field` (an id) with the referenced document
    Reference {
        field: String,
        target: Arc<dyn Collection>,
        select: Option<Projection>,
    },
    /// Attach documents of `target` whose `foreign_field` is this document's id
    Reverse {
        field: String,
        target: Arc<dyn Collection>,
        foreign_field: String,
        select: Option<Projection>,
    },
}

impl std::fmt::Debug for RelationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationSpec")
            .field("field", &self.field())
            .field("target", &self.target().name())
            .finish()
    }
}

impl RelationSpec {
    pub fn reference(field: impl Into<String>, target: Arc<dyn Collection>) -> Self {
        RelationSpec::Reference {
            field: field.into(),
            target,
            select: None,
        }
    }

    pub fn reverse(
        field: impl Into<String>,
        target: Arc<dyn Collection>,
        foreign_field: impl Into<String>,
    ) -> Self {
        RelationSpec::Reverse {
            field: field.into(),
            target,
            foreign_field: foreign_field.into(),
            select: None,
        }
    }

    /// Restrict the fields of the related documents
    pub fn select(mut self, projection: Projection) -> Self {
        match &mut self {
            RelationSpec::Reference { select, .. } | RelationSpec::Reverse { select, .. } => {
                *select = Some(projection);
            }
        }
        self
    }

    /// The field this relation writes into
    pub fn field(&self) -> &str {
        match self {
            RelationSpec::Reference { field, .. } | RelationSpec::Reverse { field, .. } => field,
        }
    }

    fn target(&self) -> &Arc<dyn Collection> {
        match self {
            RelationSpec::Reference { target, .. } | RelationSpec::Reverse { target, .. } => target,
        }
    }

    /// Expand this relation across a page of documents
    pub async fn expand(&self, docs: &mut [Document]) -> Result<(), StorageError> {
        if docs.is_empty() {
            return Ok(());
        }
        match self {
            RelationSpec::Reference {
                field,
                target,
                select,
            } => expand_reference(docs, field, target.as_ref(), select).await,
            RelationSpec::Reverse {
                field,
                target,
                foreign_field,
                select,
            } => expand_reverse(docs, field, target.as_ref(), foreign_field, select).await,
        }
    }
}

fn string_ids<'a>(values: impl Iterator<Item = Option<&'a Value>>) -> Vec<FieldValue> {
    let mut ids: Vec<FieldValue> = Vec::new();
    for id in values.flatten().filter_map(Value::as_str) {
        let id = FieldValue::String(id.to_string());
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

async fn expand_reference(
    docs: &mut [Document],
    field: &str,
    target: &dyn Collection,
    select: &Option<Projection>,
) -> Result<(), StorageError> {
    let ids = string_ids(docs.iter().map(|d| get_path(d, field)));
    if ids.is_empty() {
        return Ok(());
    }

    let options = FindOptions::new(Filter::any_of("id", ids)).projection(select.clone());
    let related: HashMap<String, Document> = target
        .find(&options)
        .await?
        .into_iter()
        .filter_map(|d| {
            let id = d.get("id")?.as_str()?.to_string();
            Some((id, d))
        })
        .collect();

    for doc in docs.iter_mut() {
        let Some(id) = get_path(doc, field).and_then(Value::as_str).map(str::to_string) else {
            continue;
        };
        // A dangling reference expands to null.
        let value = related
            .get(&id)
            .cloned()
            .map(Value::Object)
            .unwrap_or(Value::Null);
        set_path(doc, field, value);
    }
    Ok(())
}

async fn expand_reverse(
    docs: &mut [Document],
    field: &str,
    target: &dyn Collection,
    foreign_field: &str,
    select: &Option<Projection>,
) -> Result<(), StorageError> {
    let ids = string_ids(docs.iter().map(|d| d.get("id")));
    if ids.is_empty() {
        return Ok(());
    }

    // The back-reference must survive the projection for grouping.
    let projection = match select {
        Some(Projection::Include(fields)) if !fields.iter().any(|f| f == foreign_field) => {
            let mut fields = fields.clone();
            fields.push(foreign_field.to_string());
            Some(Projection::Include(fields))
        }
        other => other.clone(),
    };
    let options = FindOptions::new(Filter::any_of(foreign_field, ids)).projection(projection);

    let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();
    for related in target.find(&options).await? {
        if let Some(owner) = get_path(&related, foreign_field).and_then(Value::as_str) {
            grouped
                .entry(owner.to_string())
                .or_default()
                .push(Value::Object(related));
        }
    }

    for doc in docs.iter_mut() {
        let children = doc
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| grouped.remove(id))
            .unwrap_or_default();
        doc.insert(field.to_string(), Value::Array(children));
    }
    Ok(())
}
