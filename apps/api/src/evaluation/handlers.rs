use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::rater::{rate_cv, AutomatedRating, ParserBackend};
use crate::evaluation::record::EvaluationRecord;
use crate::extract;
use crate::scoring::categories::{consultant_category, MODEL_CATEGORIES};
use crate::scoring::compose;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UnlockRequest {
    pub password: String,
}

#[derive(Serialize)]
pub struct UnlockResponse {
    pub session_id: Uuid,
}

/// POST /api/v1/session/unlock
///
/// Shared-secret gate: one password, no accounts. A correct match opens a
/// fresh scoring session.
pub async fn handle_unlock(
    State(state): State<AppState>,
    Json(req): Json<UnlockRequest>,
) -> Result<Json<UnlockResponse>, AppError> {
    if req.password != state.config.access_password {
        return Err(AppError::Unauthorized);
    }
    let session_id = state.sessions.create();
    info!("session {session_id} unlocked");
    Ok(Json(UnlockResponse { session_id }))
}

#[derive(Serialize)]
pub struct DocumentResponse {
    pub extracted_chars: usize,
    pub warnings: Vec<String>,
}

/// POST /api/v1/session/:id/document
///
/// Multipart CV upload. Extraction failures degrade to zero extracted
/// characters plus warnings; the session only blocks at rating time.
pub async fn handle_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<DocumentResponse>, AppError> {
    // reject unknown sessions before consuming the body
    state.sessions.get(&id)?;

    let mut document = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        document = Some(extract::extract_text(
            filename.as_deref(),
            content_type.as_deref(),
            &data,
        ));
        break;
    }

    let document =
        document.ok_or_else(|| AppError::Validation("Multipart field 'file' is required".to_string()))?;
    let extracted_chars = document.text.chars().count();
    let warnings = document.warnings.clone();

    state.sessions.update(&id, |session| {
        session.cv_text = Some(document.text);
        session.extraction_warnings = document.warnings;
        // a new document invalidates any rating produced for the old one
        session.pending = None;
    })?;

    info!("session {id}: document stored ({extracted_chars} chars)");
    Ok(Json(DocumentResponse {
        extracted_chars,
        warnings,
    }))
}

#[derive(Serialize)]
pub struct SessionStatus {
    pub has_document: bool,
    pub extracted_chars: usize,
    pub extraction_warnings: Vec<String>,
    pub rating_pending: bool,
}

/// GET /api/v1/session/:id
///
/// Lets the UI re-render session state after a reload without re-uploading.
pub async fn handle_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionStatus>, AppError> {
    let session = state.sessions.get(&id)?;
    Ok(Json(SessionStatus {
        has_document: session.cv_text.is_some(),
        extracted_chars: session
            .cv_text
            .as_deref()
            .map(|t| t.chars().count())
            .unwrap_or(0),
        extraction_warnings: session.extraction_warnings,
        rating_pending: session.pending.is_some(),
    }))
}

#[derive(Deserialize)]
pub struct RateRequest {
    pub role: String,
}

#[derive(Serialize)]
pub struct RatedLine {
    pub category: &'static str,
    pub rating: String,
}

#[derive(Serialize)]
pub struct RateResponse {
    pub narrative: String,
    /// Per-category raw ratings in fixed column order.
    pub ratings: Vec<RatedLine>,
    pub backend: ParserBackend,
    pub flags: Vec<String>,
    pub reported_total: Option<i64>,
}

/// POST /api/v1/session/:id/rate
///
/// Runs the automated rating pass and caches the result in the session
/// pending human confirmation. An LLM failure leaves the session unchanged.
pub async fn handle_rate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RateRequest>,
) -> Result<Json<RateResponse>, AppError> {
    let session = state.sessions.get(&id)?;
    let cv_text = session.cv_text.unwrap_or_default();

    let rating = rate_cv(&state.llm, &state.rubric, &cv_text, &req.role).await?;
    state
        .sessions
        .update(&id, |session| session.pending = Some(rating.clone()))?;

    Ok(Json(rate_response(rating)))
}

fn rate_response(rating: AutomatedRating) -> RateResponse {
    let ratings = MODEL_CATEGORIES
        .iter()
        .map(|c| RatedLine {
            category: c.name,
            rating: rating
                .ratings
                .get(c.name)
                .cloned()
                .unwrap_or_else(|| crate::scoring::parser::UNRATED.to_string()),
        })
        .collect();
    RateResponse {
        narrative: rating.narrative,
        ratings,
        backend: rating.backend,
        flags: rating.flags,
        reported_total: rating.reported_total,
    }
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub reviewer: String,
    pub candidate: String,
    pub role: String,
    pub company: String,
    /// Consultant category name → rating word, as selected in the form.
    pub consultant_ratings: HashMap<String, String>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub breakdown: crate::scoring::ScoreBreakdown,
    pub saved: bool,
}

/// POST /api/v1/session/:id/submit
///
/// Composes both rating streams, persists the row, and only then closes the
/// session. A failed append leaves the session open for retry; the session
/// is never marked complete before the append is confirmed.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    if req.reviewer.trim().is_empty() || req.candidate.trim().is_empty() {
        return Err(AppError::Validation(
            "Reviewer and candidate names are required.".to_string(),
        ));
    }
    for name in req.consultant_ratings.keys() {
        if consultant_category(name).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown consultant category: {name}"
            )));
        }
    }

    let session = state.sessions.get(&id)?;
    let pending = session.pending.ok_or_else(|| {
        AppError::Precondition(
            "No automated rating pending — run scoring before submitting.".to_string(),
        )
    })?;

    let breakdown = compose(
        &pending.ratings,
        &req.consultant_ratings,
        pending.reported_total,
        state.config.total_policy,
    );
    let record = EvaluationRecord::from_breakdown(
        Utc::now(),
        &req.reviewer,
        &req.candidate,
        &req.role,
        &req.company,
        &breakdown,
    );

    state.sheet.append_row(&record.to_row()).await?;
    state.sessions.remove(&id)?;

    info!(
        "session {id}: evaluation persisted (total {} vs benchmark {})",
        breakdown.total_score, breakdown.benchmark
    );
    Ok(Json(SubmitResponse {
        breakdown,
        saved: true,
    }))
}

/// DELETE /api/v1/session/:id
///
/// Navigation-away discard: drops the session and everything cached in it.
pub async fn handle_discard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(&id)?;
    info!("session {id} discarded");
    Ok(StatusCode::NO_CONTENT)
}
