//! Bulk import and wipe of the bootcamp data set
//!
//! Imported records go through the same validation and geocoding as
//! `POST /bootcamps`, without an owning user.

use crate::core::error::{ApiResult, ValidationError};
use crate::core::geo::locate;
use crate::core::validation::{Operation, ValidatableEntity};
use crate::entities::Bootcamp;
use crate::server::host::ServerHost;
use anyhow::Context;
use serde_json::Value;
use std::path::Path;

/// Import bootcamps from a JSON array of create payloads
///
/// Stops at the first invalid record; records before it stay imported.
pub async fn import_bootcamps(host: &ServerHost, records: Vec<Value>) -> ApiResult<usize> {
    let config = Bootcamp::validation_config(Operation::Create);
    let mut imported = 0;

    for record in records {
        let payload = config
            .validate_and_filter(record)
            .map_err(ValidationError::FieldErrors)?;
        let mut bootcamp = Bootcamp::from_payload(payload, None)?;
        bootcamp.location = locate(host.geocoder.as_ref(), &bootcamp.address).await;
        host.bootcamps.create(&bootcamp).await?;
        imported += 1;
    }

    tracing::info!(count = imported, "bootcamps imported");
    Ok(imported)
}

/// Read a JSON file and import its bootcamps
pub async fn import_bootcamps_file(host: &ServerHost, path: &Path) -> anyhow::Result<usize> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let records: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array", path.display()))?;
    let count = import_bootcamps(host, records)
        .await
        .with_context(|| format!("importing {}", path.display()))?;
    Ok(count)
}

/// Delete every bootcamp, course and user
pub async fn destroy(host: &ServerHost) -> ApiResult<u64> {
    let removed = host.courses.delete_all().await?
        + host.bootcamps.delete_all().await?
        + host.users.delete_all().await?;
    tracing::info!(documents = removed, "data destroyed");
    Ok(removed)
}
