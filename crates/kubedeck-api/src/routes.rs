use anyhow::{Context, Result};
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{delete, get};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, websocket};

/// Assemble the application router with all layers applied
pub fn build_router(state: AppState) -> Result<Router> {
    let static_dir = state.settings().static_dir.clone();
    let cors = cors_layer(&state.settings().cors_origins)?;

    let mut app = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/cluster/info", get(handlers::cluster_info))
        .route(
            "/api/namespaces",
            get(handlers::list_namespaces).post(handlers::create_namespace),
        )
        .route("/api/pods", get(handlers::list_pods))
        .route(
            "/api/pods/{namespace}/{name}",
            get(handlers::get_pod).delete(handlers::delete_pod),
        )
        .route("/api/pods/{namespace}/{name}/logs", get(handlers::pod_logs))
        .route(
            "/api/pods/{namespace}/{name}/logs/stream",
            get(websocket::pod_log_stream),
        )
        .route("/api/deployments", get(handlers::list_deployments))
        .route(
            "/api/deployments/{namespace}/{name}",
            delete(handlers::delete_deployment),
        )
        .route("/api/services", get(handlers::list_services))
        .route("/api/nodes", get(handlers::list_nodes))
        .route("/api/metrics/summary", get(handlers::metrics_summary))
        .route("/ws", get(websocket::cluster_updates));

    app = match static_dir {
        // Serve the built frontend; unmatched paths fall through to
        // index.html so client-side routes survive a reload
        Some(dir) => {
            let index = dir.join("index.html");
            app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => app.route("/", get(handlers::index)),
    };

    Ok(app
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// CORS from the configured origin list; `*` or an empty list allows any origin
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::permissive());
    }
    let mut allowed = Vec::with_capacity(origins.len());
    for origin in origins {
        allowed.push(
            origin
                .parse::<HeaderValue>()
                .context(format!("Invalid CORS origin '{}'", origin))?,
        );
    }
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ApiSettings;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use kubedeck_k8s::KubeClient;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use tower_test::mock::{self, Handle};

    type ApiHandle = Handle<http::Request<kube::client::Body>, http::Response<kube::client::Body>>;

    fn offline_router() -> Router {
        build_router(AppState::new(None, ApiSettings::default())).unwrap()
    }

    fn mock_router() -> (Router, ApiHandle) {
        let (service, handle) =
            mock::pair::<http::Request<kube::client::Body>, http::Response<kube::client::Body>>();
        let client = kube::Client::new(service, "default");
        let state = AppState::new(
            Some(KubeClient::from_client(client)),
            ApiSettings::default(),
        );
        (build_router(state).unwrap(), handle)
    }

    fn list_response(kind: &str, items: Value) -> http::Response<kube::client::Body> {
        let body = json!({
            "kind": kind,
            "apiVersion": "v1",
            "metadata": {"resourceVersion": "1"},
            "items": items,
        });
        http::Response::builder()
            .body(kube::client::Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_index_advertises_api_paths() {
        let response = offline_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "kubedeck");
        assert_eq!(body["endpoints"]["health"], "/api/health");
        assert_eq!(body["endpoints"]["metrics"], "/api/metrics/summary");
        assert_eq!(body["endpoints"]["websocket"], "/ws");
    }

    #[tokio::test]
    async fn test_health_works_without_cluster() {
        let response = offline_router()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_cors_origin_fails_router_build() {
        let settings = ApiSettings {
            cors_origins: vec!["not a header\nvalue".to_string()],
            ..ApiSettings::default()
        };
        assert!(build_router(AppState::new(None, settings)).is_err());
    }

    #[tokio::test]
    async fn test_missing_client_maps_to_503() {
        let response = offline_router()
            .oneshot(
                Request::builder()
                    .uri("/api/pods")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("kubeconfig"));
    }

    #[tokio::test]
    async fn test_create_namespace_requires_name() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/namespaces")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&json!({"name": "  "})).unwrap(),
            ))
            .unwrap();
        let response = offline_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Namespace name is required");
    }

    #[tokio::test]
    async fn test_list_pods_defaults_to_default_namespace() {
        let (router, mut handle) = mock_router();
        let scenario = tokio::spawn(async move {
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.uri().path(), "/api/v1/namespaces/default/pods");
            send.send_response(list_response(
                "PodList",
                json!([{
                    "metadata": {"name": "web-1", "namespace": "default"},
                    "spec": {"containers": [{"name": "web", "image": "nginx:1.27"}]},
                    "status": {
                        "phase": "Running",
                        "containerStatuses": [{
                            "name": "web", "ready": true, "restartCount": 2,
                            "image": "nginx:1.27", "imageID": "",
                        }],
                    },
                }]),
            ));
        });

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/pods")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["name"], "web-1");
        assert_eq!(body[0]["status"], "Running");
        assert_eq!(body[0]["containers"][0]["restartCount"], 2);
        scenario.await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_pod_reports_success_message() {
        let (router, mut handle) = mock_router();
        let scenario = tokio::spawn(async move {
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), http::Method::DELETE);
            assert_eq!(request.uri().path(), "/api/v1/namespaces/default/pods/web-1");
            send.send_response(
                http::Response::builder()
                    .body(kube::client::Body::from(
                        serde_json::to_vec(&json!({
                            "kind": "Status",
                            "apiVersion": "v1",
                            "metadata": {},
                            "status": "Success",
                        }))
                        .unwrap(),
                    ))
                    .unwrap(),
            );
        });

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/pods/default/web-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Pod web-1 deleted successfully");
        scenario.await.unwrap();
    }

    #[tokio::test]
    async fn test_metrics_summary_shape() {
        let (router, mut handle) = mock_router();
        let scenario = tokio::spawn(async move {
            // Four concurrent all-namespace lists, dispatched by path
            for _ in 0..4 {
                let (request, send) = handle.next_request().await.expect("service not called");
                match request.uri().path() {
                    "/api/v1/pods" => send.send_response(list_response(
                        "PodList",
                        json!([{"metadata": {"name": "a"}, "status": {"phase": "Running"}}]),
                    )),
                    "/api/v1/nodes" => send.send_response(list_response(
                        "NodeList",
                        json!([{
                            "metadata": {"name": "n1"},
                            "status": {"conditions": [{"type": "Ready", "status": "True"}]},
                        }]),
                    )),
                    "/apis/apps/v1/deployments" => send.send_response(list_response(
                        "DeploymentList",
                        json!([{"metadata": {"name": "d1"}, "status": {"availableReplicas": 1}}]),
                    )),
                    "/api/v1/services" => send.send_response(list_response(
                        "ServiceList",
                        json!([{"metadata": {"name": "s1"}}]),
                    )),
                    other => panic!("unexpected request path {other}"),
                }
            }
        });

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/metrics/summary")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["pods"]["total"], 1);
        assert_eq!(body["pods"]["running"], 1);
        assert_eq!(body["nodes"]["ready"], 1);
        assert_eq!(body["deployments"]["available"], 1);
        assert_eq!(body["services"]["total"], 1);
        scenario.await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_log_level_is_rejected() {
        let (router, _handle) = mock_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/pods/default/web-1/logs?level=loud")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_grep_pattern_is_rejected() {
        let (router, _handle) = mock_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/pods/default/web-1/logs?grep=%28unclosed")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ws_route_is_registered() {
        let response = offline_router()
            .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_api_route_is_404() {
        let response = offline_router()
            .oneshot(
                Request::builder()
                    .uri("/api/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
