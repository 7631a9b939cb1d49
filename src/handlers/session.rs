// src/handlers/session.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    ai::StudyAssistant,
    config::Config,
    engine::{Session, SessionKind, SubmissionMeta},
    error::AppError,
    sessions::{LiveSession, SessionRegistry, SessionView, SharedSession, spawn_roast},
    store::Store,
    utils::jwt::Claims,
};

/// Registers a freshly started session and answers 201 with its view.
pub(crate) fn open_session(
    registry: &SessionRegistry,
    owner: i64,
    session: Session,
    category_filter: String,
) -> (StatusCode, Json<SessionView>) {
    let live = LiveSession::new(owner, session, category_filter);
    let view = live.view();
    let (id, _) = registry.insert(live);
    tracing::info!("User {} started {} session {}", owner, view.kind.as_str(), id);
    (StatusCode::CREATED, Json(view))
}

fn find_session(
    registry: &SessionRegistry,
    id: Uuid,
    claims: &Claims,
) -> Result<SharedSession, AppError> {
    registry
        .get(id, claims.user_id()?)
        .ok_or(AppError::NotFound("Session not found".to_string()))
}

/// Returns the current view of a live session.
pub async fn get_session(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let shared = find_session(&registry, id, &claims)?;
    let view = shared.lock().await.view();
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub option: usize,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub position: usize,
    pub option: usize,
    /// Only quizzes give immediate feedback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    pub session: SessionView,
}

/// Records an answer. A wrong quiz answer with roast enabled kicks off the
/// commentary fetch in the background.
pub async fn answer(
    State(registry): State<Arc<SessionRegistry>>,
    State(assistant): State<Arc<dyn StudyAssistant>>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path((id, position)): Path<(Uuid, usize)>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let shared = find_session(&registry, id, &claims)?;

    let mut live = shared.lock().await;
    let outcome = live.answer(position, payload.option)?;
    let is_quiz = live.session.kind() == SessionKind::Quiz;
    let view = live.view();
    drop(live);

    if let Some(request) = outcome.roast {
        spawn_roast(
            assistant,
            shared.clone(),
            request,
            outcome.position,
            outcome.option,
            config.roast_timeout,
        );
    }

    Ok(Json(AnswerResponse {
        position: outcome.position,
        option: outcome.option,
        is_correct: is_quiz.then_some(outcome.is_correct),
        session: view,
    }))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavAction {
    Next,
    Prev,
    Goto,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub action: NavAction,
    pub position: Option<usize>,
}

/// Moves the cursor. Works during the attempt and for review afterwards.
pub async fn navigate(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NavigateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let shared = find_session(&registry, id, &claims)?;
    let mut live = shared.lock().await;

    match payload.action {
        NavAction::Next => {
            live.session.next();
        }
        NavAction::Prev => {
            live.session.prev();
        }
        NavAction::Goto => {
            let position = payload
                .position
                .ok_or(AppError::BadRequest("goto requires a position".to_string()))?;
            live.session.go_to(position)?;
        }
    }
    live.clear_commentary();

    Ok(Json(live.view()))
}

/// Scores the session and stores the result.
///
/// The session lock is held across the write, so no answer can slip in
/// between scoring and persisting. A failed write leaves the session open.
pub async fn submit(
    State(registry): State<Arc<SessionRegistry>>,
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let shared = find_session(&registry, id, &claims)?;
    let mut live = shared.lock().await;

    let meta = SubmissionMeta {
        user_id: live.owner,
        category_filter: live.category_filter.clone(),
    };
    let record = live.session.submit(store.as_ref(), meta).await?;
    live.clear_commentary();

    tracing::info!(
        "User {} submitted session {}: {}/{}",
        record.user_id,
        live.id,
        record.score,
        record.total
    );

    Ok(Json(json!({
        "record": record,
        "session": live.view(),
    })))
}

/// Abandons a live session without storing anything.
pub async fn abandon(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !registry.remove(id, claims.user_id()?) {
        return Err(AppError::NotFound("Session not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
