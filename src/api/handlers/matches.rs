use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::AppState;
use crate::api::models::ErrorResponse;

pub async fn get_snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.leaderboard.data().await;
    Json(snapshot.as_ref().clone())
}

pub async fn get_match(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<String>,
) -> impl IntoResponse {
    match state.leaderboard.match_data(&match_id).await {
        Some(view) => Json(view).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Match", &match_id)),
        )
            .into_response(),
    }
}

pub async fn get_stage(
    State(state): State<Arc<AppState>>,
    Path((match_id, stage_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.leaderboard.stage_data(&match_id, &stage_id).await {
        Some(results) => Json(results).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found(
                "Stage",
                &format!("{}/{}", match_id, stage_id),
            )),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplaySettings;
    use crate::services::leaderboard::Leaderboard;

    async fn state() -> Arc<AppState> {
        let leaderboard = Arc::new(Leaderboard::new(DisplaySettings::default()));
        leaderboard
            .merge(
                &serde_json::from_str(
                    r#"{"match_id": "m1", "match_subtype": "sass",
                        "match_shooters": [{"sh_uid": "s1"}],
                        "match_stages": [{"stage_uuid": "st1"}]}"#,
                )
                .unwrap(),
                None,
            )
            .await;
        leaderboard.refresh().await;
        Arc::new(AppState { leaderboard })
    }

    #[tokio::test]
    async fn test_known_match_and_stage_are_ok() {
        let state = state().await;

        let snapshot = get_snapshot(State(state.clone())).await.into_response();
        let found = get_match(State(state.clone()), Path("m1".to_string()))
            .await
            .into_response();
        let stage = get_stage(State(state), Path(("m1".to_string(), "st1".to_string())))
            .await
            .into_response();

        assert_eq!(snapshot.status(), StatusCode::OK);
        assert_eq!(found.status(), StatusCode::OK);
        assert_eq!(stage.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let state = state().await;

        let missing_match = get_match(State(state.clone()), Path("nope".to_string()))
            .await
            .into_response();
        let missing_stage = get_stage(State(state), Path(("m1".to_string(), "nope".to_string())))
            .await
            .into_response();

        assert_eq!(missing_match.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing_stage.status(), StatusCode::NOT_FOUND);
    }
}
