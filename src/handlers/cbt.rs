// src/handlers/cbt.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::session::open_session;
use crate::{
    engine::{CategoryFilter, Session, SessionKind, bank::cbt_bank, select_questions},
    error::AppError,
    models::result::ResultSummary,
    sessions::SessionRegistry,
    store::Store,
    utils::jwt::Claims,
};

const DEFAULT_CBT_COUNT: usize = 5;

fn default_count() -> usize {
    DEFAULT_CBT_COUNT
}

#[derive(Debug, Deserialize, Validate)]
pub struct StartCbtRequest {
    #[serde(default)]
    pub section: CategoryFilter,
    #[serde(default = "default_count")]
    #[validate(range(min = 1, max = 100, message = "Count must be between 1 and 100"))]
    pub count: usize,
}

/// Draws a fixed-form test from the bundled bank and starts it.
pub async fn start_cbt(
    State(registry): State<Arc<SessionRegistry>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StartCbtRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let questions = {
        let mut rng = rand::rng();
        select_questions(&cbt_bank(), payload.section, payload.count, &mut rng)
    };

    let mut session = Session::new(SessionKind::Cbt);
    session.start(questions)?;

    Ok(open_session(
        &registry,
        user_id,
        session,
        payload.section.label(),
    ))
}

/// The caller's stored CBT results, newest first, with summary figures.
pub async fn list_my_results(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let results: Vec<_> = store
        .list_results_for_user(claims.user_id()?)
        .await?
        .into_iter()
        .filter(|r| r.kind == SessionKind::Cbt.as_str())
        .collect();

    let summary = ResultSummary::from_records(&results);

    Ok(Json(json!({
        "results": results,
        "summary": summary,
    })))
}
