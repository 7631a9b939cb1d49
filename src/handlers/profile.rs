use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError, models::result::ResultSummary, store::Store, utils::jwt::Claims,
};

const RECENT_RESULTS: usize = 10;

/// Current user plus attempt statistics across quizzes and tests.
pub async fn get_profile(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let user = store
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let results = store.list_results_for_user(user_id).await?;
    let summary = ResultSummary::from_records(&results);
    let recent: Vec<_> = results.into_iter().take(RECENT_RESULTS).collect();

    Ok(Json(json!({
        "user": user,
        "summary": summary,
        "recent_results": recent,
    })))
}
