use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use k8s_openapi::api::core::v1::Pod;
use serde::Deserialize;
use serde_json::{Value, json};

use kubedeck_logs::{LogFilter, LogLevel, LogOptions};
use kubedeck_types::{
    ClusterInfo, CreateNamespaceRequest, DeploymentInfo, MetricsSummary, NamespaceInfo, NodeInfo,
    PodInfo, ServiceInfo,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Namespace selector shared by the list endpoints
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    namespace: Option<String>,
}

impl ListQuery {
    fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or("default")
    }
}

/// Query parameters accepted by the log endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    pub(crate) container: Option<String>,
    pub(crate) tail_lines: Option<i64>,
    pub(crate) since_seconds: Option<i64>,
    #[serde(default)]
    pub(crate) previous: bool,
    pub(crate) grep: Option<String>,
    pub(crate) level: Option<String>,
}

impl LogsQuery {
    pub(crate) fn options(&self, default_tail: i64) -> LogOptions {
        LogOptions {
            container: self.container.clone(),
            tail_lines: Some(self.tail_lines.unwrap_or(default_tail)),
            since_seconds: self.since_seconds,
            previous: self.previous,
        }
    }

    pub(crate) fn filter(&self) -> Result<LogFilter, ApiError> {
        let min_level = match self.level.as_deref() {
            Some(level) => {
                let parsed = LogLevel::from_str(level);
                if parsed == LogLevel::Unknown {
                    return Err(ApiError::BadRequest(format!("Invalid log level '{level}'")));
                }
                Some(parsed)
            }
            None => None,
        };
        LogFilter::new(self.grep.as_deref(), min_level)
            .map_err(|e| ApiError::BadRequest(format!("Invalid grep pattern: {e}")))
    }
}

/// GET / when no frontend bundle is configured
pub async fn index() -> Json<Value> {
    Json(json!({
        "name": "kubedeck",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "clusterInfo": "/api/cluster/info",
            "namespaces": "/api/namespaces",
            "pods": "/api/pods",
            "deployments": "/api/deployments",
            "services": "/api/services",
            "nodes": "/api/nodes",
            "metrics": "/api/metrics/summary",
            "websocket": "/ws",
        },
    }))
}

/// GET /api/health, liveness only, no cluster round-trip
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now() }))
}

/// GET /api/cluster/info
pub async fn cluster_info(State(state): State<AppState>) -> Result<Json<ClusterInfo>, ApiError> {
    Ok(Json(state.kube()?.cluster_info().await?))
}

/// GET /api/namespaces
pub async fn list_namespaces(
    State(state): State<AppState>,
) -> Result<Json<Vec<NamespaceInfo>>, ApiError> {
    Ok(Json(state.kube()?.list_namespaces().await?))
}

/// POST /api/namespaces
pub async fn create_namespace(
    State(state): State<AppState>,
    Json(body): Json<CreateNamespaceRequest>,
) -> Result<Json<Value>, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Namespace name is required".to_string()));
    }
    let created = state.kube()?.create_namespace(&body).await?;
    Ok(Json(json!({
        "message": format!("Namespace {} created successfully", body.name),
        "namespace": created,
    })))
}

/// GET /api/pods?namespace=
pub async fn list_pods(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PodInfo>>, ApiError> {
    Ok(Json(state.kube()?.list_pods(query.namespace()).await?))
}

/// GET /api/pods/{namespace}/{name}
///
/// Returns the unprojected object so the detail view can show everything.
pub async fn get_pod(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<Pod>, ApiError> {
    Ok(Json(state.kube()?.get_pod(&namespace, &name).await?))
}

/// DELETE /api/pods/{namespace}/{name}
pub async fn delete_pod(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    state.kube()?.delete_pod(&namespace, &name).await?;
    Ok(Json(json!({
        "message": format!("Pod {} deleted successfully", name),
    })))
}

/// GET /api/pods/{namespace}/{name}/logs
pub async fn pod_logs(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = query.filter()?;
    let kube = state.kube()?;
    let options = query.options(state.settings().tail_lines);
    let logs = kubedeck_logs::fetch_logs(kube.inner(), &namespace, &name, &options).await?;
    let logs = filter.apply(&logs);
    Ok(Json(json!({ "logs": logs })))
}

/// GET /api/deployments?namespace=
pub async fn list_deployments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DeploymentInfo>>, ApiError> {
    Ok(Json(state.kube()?.list_deployments(query.namespace()).await?))
}

/// DELETE /api/deployments/{namespace}/{name}
pub async fn delete_deployment(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    state.kube()?.delete_deployment(&namespace, &name).await?;
    Ok(Json(json!({
        "message": format!("Deployment {} deleted successfully", name),
    })))
}

/// GET /api/services?namespace=
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ServiceInfo>>, ApiError> {
    Ok(Json(state.kube()?.list_services(query.namespace()).await?))
}

/// GET /api/nodes
pub async fn list_nodes(State(state): State<AppState>) -> Result<Json<Vec<NodeInfo>>, ApiError> {
    Ok(Json(state.kube()?.list_nodes().await?))
}

/// GET /api/metrics/summary
pub async fn metrics_summary(
    State(state): State<AppState>,
) -> Result<Json<MetricsSummary>, ApiError> {
    Ok(Json(state.kube()?.metrics_summary().await?))
}
