use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::app::ScholarFlow;
use crate::result::PrioritizeResult;
use crate::task::{NewTask, Task, TaskFilter, TaskStats};

pub type FlowState = State<Arc<ScholarFlow>>;

#[derive(Debug, Deserialize, Default)]
pub struct TasksQuery {
    pub filter: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }

    fn task_not_found(id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, &format!("task not found: {}", id))
    }
}

/// Runs `op` against the flow on the blocking pool; store commits write the
/// persistence slot synchronously.
async fn blocking<T, F>(flow: Arc<ScholarFlow>, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&ScholarFlow) -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&flow))
        .await
        .map_err(|err| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, &format!("task failed: {}", err)))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

pub async fn handle_list(
    State(flow): FlowState,
    Query(query): Query<TasksQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filter = match query.filter.as_deref() {
        None => TaskFilter::All,
        Some(raw) => TaskFilter::parse(raw).ok_or_else(|| {
            ApiError::new(StatusCode::BAD_REQUEST, &format!("unknown filter: {}", raw))
        })?,
    };
    let tasks = blocking(flow, move |flow| flow.visible(filter)).await?;
    Ok(Json(json!({ "tasks": tasks })))
}

pub async fn handle_create(
    State(flow): FlowState,
    Json(req): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "title required"));
    }
    if matches!(req.estimated_hours, Some(hours) if hours.is_nan() || hours < 0.0) {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "estimatedHours must be non-negative",
        ));
    }
    let task = blocking(flow, move |flow| flow.add_task(req)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn handle_delete(
    State(flow): FlowState,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let lookup = id.clone();
    if blocking(flow, move |flow| flow.delete_task(&lookup)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::task_not_found(&id))
    }
}

pub async fn handle_toggle_status(
    State(flow): FlowState,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let lookup = id.clone();
    blocking(flow, move |flow| flow.toggle_status(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::task_not_found(&id))
}

pub async fn handle_toggle_timer(
    State(flow): FlowState,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let lookup = id.clone();
    blocking(flow, move |flow| flow.toggle_timer(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::task_not_found(&id))
}

pub async fn handle_reset_timer(
    State(flow): FlowState,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let lookup = id.clone();
    blocking(flow, move |flow| flow.reset_timer(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::task_not_found(&id))
}

pub async fn handle_prioritize(State(flow): FlowState) -> (StatusCode, Json<PrioritizeResult>) {
    let result = flow.run_ai_prioritize().await;
    let status = match &result {
        PrioritizeResult::Applied { .. } | PrioritizeResult::NothingToPrioritize => StatusCode::OK,
        PrioritizeResult::AlreadyRunning => StatusCode::CONFLICT,
        PrioritizeResult::Failed { .. } => StatusCode::BAD_GATEWAY,
    };
    (status, Json(result))
}

pub async fn handle_prioritize_status(State(flow): FlowState) -> Json<serde_json::Value> {
    Json(json!({ "processing": flow.is_ai_processing() }))
}

pub async fn handle_stats(State(flow): FlowState) -> Result<Json<TaskStats>, ApiError> {
    Ok(Json(blocking(flow, |flow| flow.stats()).await?))
}

#[cfg(test)]
mod tests {
    use crate::advisor::AdvisorGateway;
    use crate::api::server::router;
    use crate::app::ScholarFlow;
    use crate::config::FlowConfig;
    use crate::llm::{CompletionRequest, LLMResponse, ProviderAdapter, ProviderError};
    use crate::task::{FileSlot, Task, TaskStore};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Offline;

    #[async_trait]
    impl ProviderAdapter for Offline {
        async fn complete(&self, _request: CompletionRequest) -> Result<LLMResponse, ProviderError> {
            Err(ProviderError::new("network_error", "offline", true))
        }
    }

    fn flow() -> Arc<ScholarFlow> {
        Arc::new(ScholarFlow::with_parts(
            FlowConfig::default(),
            Arc::new(TaskStore::in_memory()),
            AdvisorGateway::new(Arc::new(Offline)),
        ))
    }

    async fn send(flow: &Arc<ScholarFlow>, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router(flow.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn create_then_list() {
        let flow = flow();
        let (status, created) = send(
            &flow,
            "POST",
            "/tasks",
            Some(json!({"title": "Essay", "subject": "History", "priority": "High"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "Todo");
        assert_eq!(created["timeSpentSeconds"], 0);

        let (status, listed) = send(&flow, "GET", "/tasks?filter=Todo", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["tasks"][0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let flow = flow();
        let (status, body) = send(&flow, "POST", "/tasks", Some(json!({"title": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "title required");
    }

    #[tokio::test]
    async fn unknown_filter_is_rejected() {
        let (status, _) = send(&flow(), "GET", "/tasks?filter=someday", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lifecycle_routes_return_updated_task() {
        let flow = flow();
        let id = flow.add_task(crate::task::NewTask::titled("lab", crate::task::Priority::Low)).id;

        let (status, body) = send(&flow, "POST", &format!("/tasks/{}/timer", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isTimerRunning"], true);

        let (_, body) = send(&flow, "POST", &format!("/tasks/{}/status", id), None).await;
        let task: Task = serde_json::from_value(body).unwrap();
        assert!(task.status.is_completed());
        assert!(!task.is_timer_running);

        let (_, body) = send(&flow, "POST", &format!("/tasks/{}/timer/reset", id), None).await;
        assert_eq!(body["timeSpentSeconds"], 0);

        let (status, _) = send(&flow, "DELETE", &format!("/tasks/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&flow, "DELETE", &format!("/tasks/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn file_backed_commits_land_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scholarflow_tasks.json");
        let flow = Arc::new(ScholarFlow::with_parts(
            FlowConfig::default(),
            Arc::new(TaskStore::load(Arc::new(FileSlot::new(path.clone())))),
            AdvisorGateway::new(Arc::new(Offline)),
        ));

        let (_, created) = send(&flow, "POST", "/tasks", Some(json!({"title": "Lab report"}))).await;
        let id = created["id"].as_str().unwrap().to_string();
        let (status, _) = send(&flow, "POST", &format!("/tasks/{}/timer", id), None).await;
        assert_eq!(status, StatusCode::OK);

        let on_disk = TaskStore::load(Arc::new(FileSlot::new(path)));
        assert_eq!(on_disk.snapshot(), flow.tasks());
        assert!(on_disk.get(&id).unwrap().is_timer_running);
    }

    #[tokio::test]
    async fn prioritize_reports_outcome() {
        let flow = flow();
        let (status, body) = send(&flow, "POST", "/prioritize", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "nothing_to_prioritize");

        flow.add_task(crate::task::NewTask::titled("lab", crate::task::Priority::Low));
        let (status, body) = send(&flow, "POST", "/prioritize", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["outcome"], "failed");

        let (_, body) = send(&flow, "GET", "/prioritize", None).await;
        assert_eq!(body["processing"], false);
    }

    #[tokio::test]
    async fn stats_route() {
        let flow = flow();
        flow.add_task(crate::task::NewTask::titled("lab", crate::task::Priority::Low));
        let (status, body) = send(&flow, "GET", "/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["totalTime"], "0h 0m");
    }
}
