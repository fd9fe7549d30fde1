use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::extractors::JsonBody;
use crate::progress::types::{AssessmentLesson, LessonModel, OnboardingPreferences, SelectionContext};
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:user_id", get(get_progress))
        .route("/:user_id/details", get(get_progress_details))
        .route("/:user_id/lessons", post(complete_lesson))
        .route("/:user_id/assessments", post(complete_assessment))
        .route("/:user_id/topics/select", post(select_topics))
}

fn require_user_id(user_id: &str) -> Result<&str, AppError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request("INVALID_USER_ID", "user id must not be empty"));
    }
    Ok(trimmed)
}

fn progress_not_found(user_id: &str) -> AppError {
    AppError::not_found(
        "PROGRESS_NOT_FOUND",
        &format!("No learning progress recorded for user {user_id}"),
    )
}

async fn get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&user_id)?;
    let progress = state
        .engine()
        .get_progress(user_id)
        .await
        .ok_or_else(|| progress_not_found(user_id))?;
    Ok(ok(progress))
}

async fn get_progress_details(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&user_id)?;
    let progress = state
        .engine()
        .get_progress_with_details(user_id)
        .await
        .ok_or_else(|| progress_not_found(user_id))?;
    Ok(ok(progress))
}

/// Progress bookkeeping never fails the completion; the refreshed record is
/// returned when it could be read back.
async fn complete_lesson(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonBody(lesson): JsonBody<LessonModel>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&user_id)?;
    state.engine().update_after_lesson(user_id, &lesson).await;
    Ok(ok(state.engine().get_progress(user_id).await))
}

async fn complete_assessment(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonBody(assessment): JsonBody<AssessmentLesson>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&user_id)?;
    state.engine().update_after_assessment(user_id, &assessment).await;
    Ok(ok(state.engine().get_progress(user_id).await))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectTopicsRequest {
    #[serde(default)]
    preferences: Option<OnboardingPreferences>,
    #[serde(default)]
    assessment_topics: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectTopicsResponse {
    topics: Vec<String>,
}

async fn select_topics(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonBody(req): JsonBody<SelectTopicsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&user_id)?;
    let context = SelectionContext {
        progress: None,
        preferences: req.preferences,
        assessment_topics: req.assessment_topics,
    };
    let topics = state.engine().select_topics(user_id, context).await;
    Ok(ok(SelectTopicsResponse { topics }))
}
