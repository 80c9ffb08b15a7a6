//! HTTP surface
//!
//! Thin axum layer over the agent loop and the knowledge store. Core
//! failures surface as a 500 with an error-detail string; tool-level
//! failures never reach this layer because they are folded into the
//! agent-visible tool output.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tower_http::trace::TraceLayer;

use ragserve_agent::{AgentRunner, ResponsesModel};
use ragserve_core::VectorStore;
use ragserve_store::format_query_results;

use crate::seeding::seed_example_documents;

/// How many UI-originated turns may run at once, to avoid overloading the
/// agent backend
pub const TURN_CONCURRENCY_LIMIT: usize = 2;

/// Shared handler state
pub struct AppState<M: ResponsesModel, V: VectorStore> {
    pub runner: Arc<AgentRunner<M>>,
    pub store: Arc<V>,
    pub turn_permits: Arc<Semaphore>,
}

impl<M: ResponsesModel, V: VectorStore> Clone for AppState<M, V> {
    fn clone(&self) -> Self {
        Self {
            runner: self.runner.clone(),
            store: self.store.clone(),
            turn_permits: self.turn_permits.clone(),
        }
    }
}

impl<M: ResponsesModel, V: VectorStore> AppState<M, V> {
    pub fn new(runner: Arc<AgentRunner<M>>, store: Arc<V>) -> Self {
        Self {
            runner,
            store,
            turn_permits: Arc::new(Semaphore::new(TURN_CONCURRENCY_LIMIT)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub user_id: String,
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryPreviewRequest {
    pub query_text: String,
}

#[derive(Debug, Serialize)]
pub struct SeedResult {
    pub inserted: usize,
}

#[derive(Debug, Serialize)]
pub struct Detail {
    pub detail: String,
}

/// A core failure, rendered as a 500 with an error-detail string
pub struct ApiError(ragserve_core::Error);

impl From<ragserve_core::Error> for ApiError {
    fn from(error: ragserve_core::Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Detail {
                detail: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn create_router<M, V>(state: AppState<M, V>) -> Router
where
    M: ResponsesModel + 'static,
    V: VectorStore + 'static,
{
    Router::new()
        .route("/chat", post(chat))
        .route("/seed_example_users", post(seed_example_users))
        .route("/clear_conversation", post(clear_conversation))
        .route("/query_preview", post(query_preview))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn chat<M: ResponsesModel, V: VectorStore>(
    State(state): State<AppState<M, V>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let _permit = state
        .turn_permits
        .acquire()
        .await
        .map_err(|e| ragserve_core::Error::Agent(e.to_string()))?;

    let response = state
        .runner
        .run_turn(&request.user_id, &request.message)
        .await?;
    Ok(Json(ChatResponse {
        user_id: request.user_id,
        response,
    }))
}

async fn seed_example_users<M: ResponsesModel, V: VectorStore>(
    State(state): State<AppState<M, V>>,
) -> Result<Json<SeedResult>, ApiError> {
    let inserted = seed_example_documents(state.store.as_ref()).await?;
    Ok(Json(SeedResult { inserted }))
}

async fn clear_conversation<M: ResponsesModel, V: VectorStore>(
    State(state): State<AppState<M, V>>,
    Json(request): Json<ClearRequest>,
) -> Json<Detail> {
    Json(Detail {
        detail: state.runner.clear_conversation(&request.user_id),
    })
}

async fn query_preview<M: ResponsesModel, V: VectorStore>(
    State(state): State<AppState<M, V>>,
    Json(request): Json<QueryPreviewRequest>,
) -> Result<Json<Detail>, ApiError> {
    let query_text = request.query_text.trim();
    if query_text.is_empty() {
        return Ok(Json(Detail {
            detail: "Please enter a search query.".to_string(),
        }));
    }

    let results = state.store.query(query_text, 4).await?;
    Ok(Json(Detail {
        detail: format_query_results(results.as_deref(), state.store.metric()),
    }))
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, header};
    use ragserve_agent::{ConversationItem, ConversationStore, ToolRegistry, ToolSchema};
    use ragserve_store::MemoryStore;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    /// Model stub that always answers with the same text
    struct CannedModel(&'static str);

    #[async_trait]
    impl ResponsesModel for CannedModel {
        async fn respond(
            &self,
            _instructions: &str,
            _input: &[ConversationItem],
            _tools: &[ToolSchema],
        ) -> ragserve_core::Result<Vec<ConversationItem>> {
            Ok(vec![ConversationItem::Message {
                role: "assistant".to_string(),
                content: ragserve_agent::MessageContent::Text(self.0.to_string()),
            }])
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ResponsesModel for FailingModel {
        async fn respond(
            &self,
            _instructions: &str,
            _input: &[ConversationItem],
            _tools: &[ToolSchema],
        ) -> ragserve_core::Result<Vec<ConversationItem>> {
            Err(ragserve_core::Error::Agent("backend unavailable".to_string()))
        }
    }

    fn router_with<M: ResponsesModel + 'static>(model: M) -> Router {
        let store = Arc::new(MemoryStore::new());
        let runner = Arc::new(AgentRunner::new(
            model,
            ToolRegistry::new(),
            Arc::new(ConversationStore::new()),
        ));
        create_router(AppState::new(runner, store))
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_chat_returns_agent_answer() {
        let router = router_with(CannedModel("the answer"));
        let (status, body) = post_json(
            router,
            "/chat",
            json!({"user_id": "alice", "message": "hi"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"user_id": "alice", "response": "the answer"}));
    }

    #[tokio::test]
    async fn test_chat_failure_is_a_structured_500() {
        let router = router_with(FailingModel);
        let (status, body) = post_json(
            router,
            "/chat",
            json!({"user_id": "alice", "message": "hi"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .contains("backend unavailable")
        );
    }

    #[tokio::test]
    async fn test_seed_reports_inserted_count() {
        let router = router_with(CannedModel("unused"));
        let (status, body) = post_json(router, "/seed_example_users", json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"inserted": 5}));
    }

    #[tokio::test]
    async fn test_query_preview_on_empty_store() {
        let router = router_with(CannedModel("unused"));
        let (status, body) =
            post_json(router, "/query_preview", json!({"query_text": "anything"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["detail"], "The knowledge base is empty.");
    }

    #[tokio::test]
    async fn test_clear_conversation_endpoint() {
        let router = router_with(CannedModel("unused"));
        let (status, body) =
            post_json(router, "/clear_conversation", json!({"user_id": ""})).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["detail"].as_str().unwrap().contains("nothing to clear"));
    }
}
