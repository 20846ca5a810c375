//! Vote tally endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::error::WorkerError;
use crate::persistence::VoteStore;

/// `GET /api/votes` — current vote count per choice.
///
/// Every configured option is present, at zero if nobody picked it.
///
/// # Errors
///
/// Returns [`WorkerError::Store`] (HTTP 500) if the tally query fails.
pub async fn votes_handler<S>(
    State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, WorkerError>
where
    S: VoteStore + Clone + 'static,
{
    let counted = state
        .store
        .tally()
        .await
        .inspect_err(|err| tracing::error!(error = %err, "tally query failed"))?;
    Ok(Json(state.empty_tally().merged(counted)))
}

/// Routes mounted under `/api`.
pub fn routes<S>() -> Router<AppState<S>>
where
    S: VoteStore + Clone + 'static,
{
    Router::new().route("/votes", get(votes_handler::<S>))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::build_router;
    use crate::app_state::AppState;
    use crate::domain::VoteEvent;
    use crate::persistence::{MemoryStore, VoteStore};

    fn options() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    async fn get_votes(store: MemoryStore) -> (StatusCode, serde_json::Value) {
        let app = build_router().with_state(AppState::new(store, &options()));
        let Ok(request) = Request::builder().uri("/api/votes").body(Body::empty()) else {
            panic!("request build failed");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("router failed");
        };
        let status = response.status();
        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let Ok(json) = serde_json::from_slice(&bytes) else {
            panic!("body is not JSON");
        };
        (status, json)
    }

    #[tokio::test]
    async fn empty_store_reports_zero_for_each_option() {
        let (status, json) = get_votes(MemoryStore::new()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({"a": 0, "b": 0}));
    }

    #[tokio::test]
    async fn reports_current_counts_and_unknown_choices() {
        let store = MemoryStore::new();
        for (voter, choice) in [("1", "a"), ("2", "b"), ("3", "c")] {
            let Ok(event) = VoteEvent::new(voter, choice) else {
                panic!("valid vote rejected");
            };
            assert!(store.upsert(&event).await.is_ok());
        }

        let (_, json) = get_votes(store).await;
        assert_eq!(json, serde_json::json!({"a": 1, "b": 1, "c": 1}));
    }

    #[tokio::test]
    async fn store_failure_is_a_500_with_error_body() {
        let store = MemoryStore::new();
        store.set_unavailable(true).await;

        let (status, json) = get_votes(store).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], 3001);
    }
}
