//! HTTP request handlers

use super::types::{
    AgentRequest, AgentResponse, ContributionListQuery, ContributionListResponse,
    ContributionResponse, ErrorResponse, TemplateListResponse, TemplateSummary,
};
use super::AppState;
use crate::db::DbError;
use crate::runtime::OrchestratorError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Reply when an invocation exceeds its time budget
pub const TIMEOUT_REPLY: &str =
    "I'm sorry, that took longer than expected. Please try again in a moment.";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Agent invocation
        .route("/api/agent", post(invoke_agent))
        // Template catalog
        .route("/api/templates", get(list_templates))
        // Contribution review
        .route("/api/contributions", get(list_contributions))
        .route("/api/contributions/:id", get(get_contribution))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Agent Invocation
// ============================================================

async fn invoke_agent(
    State(state): State<AppState>,
    Json(req): Json<AgentRequest>,
) -> Result<Json<AgentResponse>, AppError> {
    if req.input.trim().is_empty() {
        return Err(AppError::BadRequest("input must not be empty".to_string()));
    }

    let invocation = state.orchestrator.invoke(req.input.clone(), req.history());
    match tokio::time::timeout(state.invocation_timeout, invocation).await {
        Ok(Ok(conversation)) => Ok(Json(AgentResponse::from_state(&conversation))),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Invocation failed");
            Err(AppError::from(e))
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = state.invocation_timeout.as_secs(),
                "Invocation timed out"
            );
            Ok(Json(AgentResponse::timed_out(&req, TIMEOUT_REPLY)))
        }
    }
}

// ============================================================
// Templates
// ============================================================

async fn list_templates(State(state): State<AppState>) -> Json<TemplateListResponse> {
    let templates = state
        .orchestrator
        .templates()
        .entries()
        .iter()
        .map(|entry| TemplateSummary {
            id: entry.id,
            name: entry.name.clone(),
        })
        .collect();
    Json(TemplateListResponse { templates })
}

// ============================================================
// Contributions
// ============================================================

async fn list_contributions(
    State(state): State<AppState>,
    Query(query): Query<ContributionListQuery>,
) -> Result<Json<ContributionListResponse>, AppError> {
    let contributions = state.db.list_contributions(query.limit)?;
    Ok(Json(ContributionListResponse { contributions }))
}

async fn get_contribution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContributionResponse>, AppError> {
    let contribution = state.db.get_contribution(&id)?;
    Ok(Json(ContributionResponse { contribution }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("contrakt ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::ContributionNotFound(_) => AppError::NotFound(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<OrchestratorError> for AppError {
    fn from(e: OrchestratorError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ContributionKind, ContributionRecord, Database, Priority};
    use crate::llm::LlmError;
    use crate::runtime::testing::{MockGenerator, MockRetriever};
    use crate::runtime::{
        ContributionSink, DatabaseContributionSink, GenerationPort, GenerationRequest, Orchestrator,
        RetrievalPort,
    };
    use crate::templates::TemplateIndex;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app_with(generator: Arc<dyn GenerationPort>, timeout: Duration) -> (Router, Database) {
        let db = Database::open_in_memory().unwrap();
        let retriever: Arc<dyn RetrievalPort> = Arc::new(MockRetriever::new());
        let sink: Arc<dyn ContributionSink> = Arc::new(DatabaseContributionSink::new(db.clone()));
        let orchestrator =
            Orchestrator::new(generator, retriever, sink, Arc::new(TemplateIndex::builtin()));
        let state = AppState::new(Arc::new(orchestrator), db.clone(), timeout);
        (create_router(state), db)
    }

    fn app(generator: Arc<MockGenerator>) -> (Router, Database) {
        app_with(generator, Duration::from_secs(5))
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_agent(body: &Value) -> Request<Body> {
        Request::post("/api/agent")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_agent_contract_response_shape() {
        let generator = Arc::new(MockGenerator::new());
        generator.queue_text("create");
        generator.queue_text("1");
        generator.queue_text("Your NDA:\n```contract\nMUTUAL NDA\n```");
        let (router, _) = app(generator);

        let (status, body) = send(
            router,
            post_agent(&json!({
                "input": "Draft an NDA",
                "chat_history": [["human", "Hi"], ["ai", "Hello!"]]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "Your NDA:");
        assert_eq!(body["operation"], "create");
        assert_eq!(body["contract_data"]["content"], "MUTUAL NDA");
        assert_eq!(body["contract_data"]["isEditable"], true);
        assert_eq!(body["contract_data"]["status"], "draft");
        assert_eq!(body["contract_data"]["metadata"]["version"], "1.0");
        assert!(body["contract_data"]["metadata"]["createdAt"].is_string());
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["chat_history"].as_array().unwrap().len(), 4);
        assert_eq!(body["chat_history"][3], json!(["ai", "Your NDA:"]));
    }

    #[tokio::test]
    async fn test_agent_rejects_empty_input() {
        let (router, _) = app(Arc::new(MockGenerator::new()));
        let (status, body) = send(router, post_agent(&json!({"input": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_agent_incomplete_run_has_null_result() {
        let generator = Arc::new(MockGenerator::new());
        generator.queue_text("");
        let (router, _) = app(generator);

        let (status, body) = send(router, post_agent(&json!({"input": "hello"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["result"].is_null());
        assert!(body["operation"].is_null());
    }

    #[tokio::test]
    async fn test_agent_template_out_of_range_is_500() {
        let generator = Arc::new(MockGenerator::new());
        generator.queue_text("create");
        generator.queue_text("42");
        let (router, _) = app(generator);

        let (status, _) = send(router, post_agent(&json!({"input": "contract"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    struct SlowGenerator;

    #[async_trait]
    impl GenerationPort for SlowGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("info".to_string())
        }
    }

    #[tokio::test]
    async fn test_agent_timeout_returns_fixed_reply() {
        let (router, _) = app_with(Arc::new(SlowGenerator), Duration::from_millis(20));

        let (status, body) = send(router, post_agent(&json!({"input": "hello"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], TIMEOUT_REPLY);
        assert!(body["contract_data"].is_null());
    }

    #[tokio::test]
    async fn test_list_templates() {
        let (router, _) = app(Arc::new(MockGenerator::new()));
        let (status, body) = send(
            router,
            Request::get("/api/templates").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let templates = body["templates"].as_array().unwrap();
        assert_eq!(templates.len(), TemplateIndex::builtin().len());
        assert_eq!(templates[0]["id"], 0);
    }

    #[tokio::test]
    async fn test_contribution_endpoints() {
        let (router, db) = app(Arc::new(MockGenerator::new()));
        let record = ContributionRecord {
            kind: ContributionKind::ErrorReport,
            description: "Broken link".to_string(),
            details: "Footer link 404s".to_string(),
            impact: "Minor".to_string(),
            priority: Priority::Low,
        };
        db.insert_contribution("contribution_1", &record, chrono::Utc::now())
            .unwrap();

        let (status, body) = send(
            router.clone(),
            Request::get("/api/contributions?limit=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contributions"][0]["id"], "contribution_1");
        assert_eq!(body["contributions"][0]["type"], "error_report");

        let (status, body) = send(
            router.clone(),
            Request::get("/api/contributions/contribution_1")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contribution"]["priority"], "low");

        let (status, _) = send(
            router,
            Request::get("/api/contributions/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
