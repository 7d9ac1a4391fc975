//! Course HTTP handlers

use super::model::Course;
use crate::core::auth::AuthPolicy;
use crate::core::entity::parse_id;
use crate::core::error::ApiResult;
use crate::core::field::FieldValue;
use crate::core::filter::Filter;
use crate::core::query::DataResponse;
use crate::core::validation::Validated;
use crate::entities::user::CurrentUser;
use crate::server::host::{AppState, ServerHost};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

fn of_bootcamp(bootcamp_id: &Uuid) -> Filter {
    Filter::eq("bootcamp", FieldValue::String(bootcamp_id.to_string()))
}

/// Recompute a bootcamp's `averageCost` from its courses.
///
/// Best effort: failures are logged and never fail the request.
pub async fn refresh_average_cost(host: &ServerHost, bootcamp_id: Uuid) {
    if let Err(e) = try_refresh_average_cost(host, bootcamp_id).await {
        tracing::error!(bootcamp_id = %bootcamp_id, error = %e, "failed to refresh average cost");
    }
}

async fn try_refresh_average_cost(host: &ServerHost, bootcamp_id: Uuid) -> ApiResult<()> {
    let courses = host.courses.find(of_bootcamp(&bootcamp_id)).await?;
    // The bootcamp may be gone already (cascade delete).
    let Some(mut bootcamp) = host.bootcamps.get(&bootcamp_id).await? else {
        return Ok(());
    };
    bootcamp.average_cost = Course::average_cost(&courses);
    host.bootcamps.update(&bootcamp).await?;
    tracing::debug!(bootcamp_id = %bootcamp_id, average_cost = ?bootcamp.average_cost, "average cost refreshed");
    Ok(())
}

/// `GET /bootcamps/{id}/courses`
pub async fn bootcamp_courses(
    State(host): State<AppState>,
    Path(bootcamp_id): Path<String>,
) -> ApiResult<Json<DataResponse<Vec<Course>>>> {
    let bootcamp_id = parse_id(&bootcamp_id)?;
    let courses = host.courses.find(of_bootcamp(&bootcamp_id)).await?;
    Ok(Json(DataResponse::counted(courses)))
}

/// `GET /courses/{id}`
pub async fn get_course(
    State(host): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Course>>> {
    let id = parse_id(&id)?;
    let course = host.courses.get_or_not_found(&id).await?;
    Ok(Json(DataResponse::new(course)))
}

/// `POST /bootcamps/{id}/courses`
pub async fn create_course(
    State(host): State<AppState>,
    user: CurrentUser,
    Path(bootcamp_id): Path<String>,
    Validated(payload, _): Validated<Course>,
) -> ApiResult<(StatusCode, Json<DataResponse<Course>>)> {
    user.authorize(&AuthPolicy::publishers())?;
    let bootcamp_id = parse_id(&bootcamp_id)?;
    let bootcamp = host.bootcamps.get_or_not_found(&bootcamp_id).await?;

    let course = Course::from_payload(payload, bootcamp.id, user.id())?;
    let course = host.courses.create(&course).await?;
    refresh_average_cost(&host, bootcamp.id).await;

    tracing::info!(course_id = %course.id, bootcamp_id = %bootcamp.id, "course created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(course))))
}

/// `PUT /courses/{id}`
pub async fn update_course(
    State(host): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Validated(payload, _): Validated<Course>,
) -> ApiResult<Json<DataResponse<Course>>> {
    user.authorize(&AuthPolicy::publishers())?;
    let id = parse_id(&id)?;

    let course = host.courses.get_or_not_found(&id).await?.with_changes(payload)?;
    let course = host.courses.update(&course).await?;
    refresh_average_cost(&host, course.bootcamp).await;
    Ok(Json(DataResponse::new(course)))
}

/// `DELETE /courses/{id}`
pub async fn delete_course(
    State(host): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Value>>> {
    user.authorize(&AuthPolicy::publishers())?;
    let id = parse_id(&id)?;

    let course = host.courses.get_or_not_found(&id).await?;
    host.courses.delete(&course.id).await?;
    refresh_average_cost(&host, course.bootcamp).await;

    tracing::info!(course_id = %id, "course deleted");
    Ok(Json(DataResponse::new(json!({}))))
}
