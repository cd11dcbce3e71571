use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use super::dto::{
    ComplaintEnvelope, CreateComplaintRequest, FeedbackRequest, ListComplaintsQuery,
    MyComplaintsQuery, UpdateStatusRequest,
};
use super::service::ComplaintService;
use crate::app_state::AppState;
use crate::db::OwnStatusFilter;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::AuthUser;

/// Ids that do not parse cannot name an existing complaint.
fn complaint_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Complaint not found".to_string()))
}

pub async fn categories(State(state): State<AppState>, _caller: AuthUser) -> impl IntoResponse {
    Json(ComplaintService::new(&state).categories())
}

pub async fn create_complaint(
    State(state): State<AppState>,
    caller: AuthUser,
    AppJson(request): AppJson<CreateComplaintRequest>,
) -> AppResult<impl IntoResponse> {
    let complaint = ComplaintService::new(&state).create(&caller, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ComplaintEnvelope {
            message: "Complaint submitted successfully",
            complaint,
        }),
    ))
}

pub async fn my_complaints(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<MyComplaintsQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = OwnStatusFilter::from_query(query.status.as_deref());
    let complaints = ComplaintService::new(&state)
        .list_own(&caller, filter)
        .await?;
    Ok(Json(complaints))
}

pub async fn all_complaints(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<ListComplaintsQuery>,
) -> AppResult<impl IntoResponse> {
    let page = ComplaintService::new(&state).list_all(&caller, query).await?;
    Ok(Json(page))
}

pub async fn update_status(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    // Role before id parsing, so a resident gets 403 even for a malformed id.
    caller.require_admin()?;
    let id = complaint_id(&id)?;
    let complaint = ComplaintService::new(&state)
        .update_status(&caller, id, request)
        .await?;
    Ok(Json(ComplaintEnvelope {
        message: "Complaint status updated successfully",
        complaint,
    }))
}

pub async fn add_feedback(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    AppJson(request): AppJson<FeedbackRequest>,
) -> AppResult<impl IntoResponse> {
    let id = complaint_id(&id)?;
    let complaint = ComplaintService::new(&state)
        .add_feedback(&caller, id, request)
        .await?;
    Ok(Json(ComplaintEnvelope {
        message: "Feedback submitted successfully",
        complaint,
    }))
}

pub async fn stats(State(state): State<AppState>, caller: AuthUser) -> AppResult<impl IntoResponse> {
    let stats = ComplaintService::new(&state).stats(&caller).await?;
    Ok(Json(stats))
}
