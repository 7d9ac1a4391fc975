//! Bootcamp HTTP handlers

use super::model::Bootcamp;
use crate::core::auth::AuthPolicy;
use crate::core::entity::parse_id;
use crate::core::error::{ApiError, ApiResult, RequestError};
use crate::core::field::FieldValue;
use crate::core::filter::{Filter, GeoWithin};
use crate::core::geo::locate;
use crate::core::query::DataResponse;
use crate::core::validation::Validated;
use crate::entities::user::CurrentUser;
use crate::server::host::AppState;
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

/// `GET /bootcamps/{id}`
pub async fn get_bootcamp(
    State(host): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Bootcamp>>> {
    let id = parse_id(&id)?;
    let bootcamp = host.bootcamps.get_or_not_found(&id).await?;
    Ok(Json(DataResponse::new(bootcamp)))
}

/// `POST /bootcamps`
pub async fn create_bootcamp(
    State(host): State<AppState>,
    user: CurrentUser,
    Validated(payload, _): Validated<Bootcamp>,
) -> ApiResult<(StatusCode, Json<DataResponse<Bootcamp>>)> {
    user.authorize(&AuthPolicy::publishers())?;

    let mut bootcamp = Bootcamp::from_payload(payload, Some(user.id()))?;
    bootcamp.location = locate(host.geocoder.as_ref(), &bootcamp.address).await;
    let bootcamp = host.bootcamps.create(&bootcamp).await?;

    tracing::info!(bootcamp_id = %bootcamp.id, name = %bootcamp.name, "bootcamp created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(bootcamp))))
}

/// `PUT /bootcamps/{id}`
pub async fn update_bootcamp(
    State(host): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Validated(payload, _): Validated<Bootcamp>,
) -> ApiResult<Json<DataResponse<Bootcamp>>> {
    user.authorize(&AuthPolicy::publishers())?;
    let id = parse_id(&id)?;

    let existing = host.bootcamps.get_or_not_found(&id).await?;
    let mut bootcamp = existing.with_changes(payload)?;
    if bootcamp.address != existing.address {
        bootcamp.location = locate(host.geocoder.as_ref(), &bootcamp.address).await;
    }
    let bootcamp = host.bootcamps.update(&bootcamp).await?;
    Ok(Json(DataResponse::new(bootcamp)))
}

/// `DELETE /bootcamps/{id}`
///
/// The bootcamp's courses go with it.
pub async fn delete_bootcamp(
    State(host): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Value>>> {
    user.authorize(&AuthPolicy::publishers())?;
    let id = parse_id(&id)?;

    let bootcamp = host.bootcamps.get_or_not_found(&id).await?;
    let courses = host
        .courses
        .find(Filter::eq("bootcamp", FieldValue::String(id.to_string())))
        .await?;
    for course in &courses {
        host.courses.delete(&course.id).await?;
    }
    host.bootcamps.delete(&bootcamp.id).await?;

    tracing::info!(bootcamp_id = %id, courses = courses.len(), "bootcamp deleted");
    Ok(Json(DataResponse::new(json!({}))))
}

/// `GET /bootcamps/radius/{zipcode}/{distance}`
///
/// `distance` is in miles.
pub async fn bootcamps_in_radius(
    State(host): State<AppState>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> ApiResult<Json<DataResponse<Vec<Bootcamp>>>> {
    let distance = distance
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ApiError::bad_request("Please provide a valid distance"))?;

    let center = host
        .geocoder
        .geocode(&zipcode)
        .await?
        .ok_or_else(|| RequestError::NotFound {
            message: format!("No location found for zipcode {}", zipcode),
        })?;

    let filter = Filter::new().within(GeoWithin::miles(
        "location",
        center.longitude(),
        center.latitude(),
        distance,
    ));
    let bootcamps = host.bootcamps.find(filter).await?;
    Ok(Json(DataResponse::counted(bootcamps)))
}

/// `PUT /bootcamps/{id}/photo`
///
/// Expects one image in the multipart field `file`.
pub async fn upload_photo(
    State(host): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<DataResponse<String>>> {
    user.authorize(&AuthPolicy::publishers())?;
    let id = parse_id(&id)?;
    let mut bootcamp = host.bootcamps.get_or_not_found(&id).await?;

    let max_size = host.config.uploads.max_file_size;
    let too_large = || ApiError::bad_request(format!("Please upload an image less than {} bytes", max_size));
    let upload_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            too_large()
        } else {
            ApiError::bad_request(e.body_text())
        }
    };

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let extension = field
            .file_name()
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        let bytes = field.bytes().await.map_err(upload_error)?;
        upload = Some((content_type, extension, bytes));
        break;
    }

    let (content_type, extension, bytes) = upload
        .filter(|(_, _, bytes)| !bytes.is_empty())
        .ok_or_else(|| ApiError::bad_request("Please upload a file"))?;
    if !content_type.starts_with("image/") {
        return Err(ApiError::bad_request("Please upload an image file"));
    }
    if bytes.len() as u64 > max_size {
        return Err(too_large());
    }

    let file_name = format!("photo_{}{}", bootcamp.id, extension);
    let dir = host.config.uploads.path.as_path();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ApiError::Internal(format!("creating upload directory: {}", e)))?;
    tokio::fs::write(dir.join(&file_name), &bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("writing {}: {}", file_name, e)))?;

    bootcamp.photo = file_name.clone();
    host.bootcamps.update(&bootcamp).await?;

    tracing::info!(bootcamp_id = %bootcamp.id, file = %file_name, size = bytes.len(), "photo uploaded");
    Ok(Json(DataResponse::new(file_name)))
}
