//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use badger_app::ports::{ApiClient, DatabaseRunner};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Serves the JSON API under `/api` next to a `/health` probe, with a
/// [`TraceLayer`] logging each request/response through `tracing`.
pub fn build<D, A>(state: AppState<D, A>) -> Router
where
    D: DatabaseRunner + Send + Sync + 'static,
    A: ApiClient + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use badger_app::engine::EventActionEngine;
    use badger_app::executor::Executor;
    use badger_domain::action::{ActionConfig, DbRequest};
    use badger_domain::error::BadgerError;
    use badger_domain::rule::EventAction;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    #[derive(Default)]
    struct StubDatabase {
        requests: Mutex<Vec<DbRequest>>,
    }

    impl DatabaseRunner for StubDatabase {
        async fn run_action(&self, request: DbRequest) -> Result<(), BadgerError> {
            self.requests.lock().unwrap().push(request);
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubApi {
        endpoints: Mutex<Vec<String>>,
    }

    impl ApiClient for StubApi {
        async fn raw_request(
            &self,
            _method: &str,
            endpoint: &str,
            _data: &BTreeMap<String, String>,
        ) -> Result<Vec<u8>, BadgerError> {
            if endpoint.contains("broken") {
                return Err(BadgerError::Api("unexpected status 500: boom".into()));
            }
            self.endpoints.lock().unwrap().push(endpoint.to_string());
            Ok(Vec::new())
        }
    }

    fn test_state() -> AppState<StubDatabase, StubApi> {
        let rules = vec![
            EventAction {
                name: "mark-synced".to_string(),
                event: "pull.complete".to_string(),
                source: None,
                run: vec![ActionConfig::from_shorthand("api:/accounts/$EVENT_PAYLOAD[id]/").unwrap()],
            },
            EventAction {
                name: "alert".to_string(),
                event: "pull.complete".to_string(),
                source: Some("routes".to_string()),
                run: vec![ActionConfig::from_shorthand("api:/broken/").unwrap()],
            },
        ];
        AppState::new(EventActionEngine::new(
            rules,
            Executor::new(StubDatabase::default(), StubApi::default()),
        ))
    }

    fn post(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let response = build(test_state()).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_dispatch_event_and_report_rules() {
        let state = test_state();
        let response = build(state.clone())
            .oneshot(post(
                "/api/events",
                &json!({"type": "pull.complete", "source": "accounts", "payload": {"id": 12}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["type"], "pull.complete");
        assert_eq!(body["success"], true);
        assert_eq!(body["rules"][0]["name"], "mark-synced");
        assert_eq!(body["rules"][0]["completed"], 1);
        assert!(body["rules"][0].get("error").is_none());

        let endpoints = state.engine.executor().api().endpoints.lock().unwrap().clone();
        assert_eq!(endpoints, ["/accounts/12/"]);
    }

    #[tokio::test]
    async fn should_report_step_failures_in_body() {
        let response = build(test_state())
            .oneshot(post(
                "/api/events",
                &json!({"type": "pull.complete", "source": "routes", "payload": {"id": 1}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        let failed = &body["rules"][1];
        assert_eq!(failed["name"], "alert");
        assert_eq!(failed["error"]["step"], 0);
        assert_eq!(failed["error"]["type"], "api");
        assert_eq!(failed["error"]["message"], "unexpected status 500: boom");
    }

    #[tokio::test]
    async fn should_reject_event_without_type() {
        let response = build(test_state())
            .oneshot(post("/api/events", &json!({"type": "  "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_run_single_action_with_event() {
        let state = test_state();
        let response = build(state.clone())
            .oneshot(post(
                "/api/actions/run",
                &json!({
                    "type": "db",
                    "args": {"command": "refresh", "args": ["$EVENT_SOURCE"]},
                    "event": {"type": "manual", "source": "cli"}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let requests = state.engine.executor().db().requests.lock().unwrap().clone();
        assert_eq!(requests[0].params(), [json!("cli")]);
    }

    #[tokio::test]
    async fn should_return_unprocessable_for_invalid_action() {
        let response = build(test_state())
            .oneshot(post("/api/actions/run", &json!({"type": "api", "args": {}})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"], "api action requires an 'endpoint'");
    }

    #[tokio::test]
    async fn should_validate_action_with_null_args() {
        let response = build(test_state())
            .oneshot(post("/api/actions/run", &json!({"type": "exec", "args": null})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"], "exec action requires a 'command'");
    }

    #[tokio::test]
    async fn should_trigger_shorthand_action() {
        let state = test_state();
        let response = build(state.clone())
            .oneshot(post("/api/actions/trigger", &json!({"action": "db:refresh"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let requests = state.engine.executor().db().requests.lock().unwrap().clone();
        assert_eq!(requests[0].str_arg("command"), Some("refresh"));
    }

    #[tokio::test]
    async fn should_reject_malformed_shorthand() {
        let response = build(test_state())
            .oneshot(post("/api/actions/trigger", &json!({"action": "refresh"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_map_remote_failures_to_bad_gateway() {
        let response = build(test_state())
            .oneshot(post("/api/actions/trigger", &json!({"action": "api:/broken/"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn should_list_configured_rules() {
        let response = build(test_state()).oneshot(get("/api/rules")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body[0]["name"], "mark-synced");
        assert_eq!(body[1]["source"], "routes");
        assert_eq!(body[1]["run"][0]["type"], "api");
    }

    #[tokio::test]
    async fn should_list_tokens_for_sample_payload() {
        let response = build(test_state())
            .oneshot(get("/api/tokens?sample=%7B%22id%22%3A1%7D"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let tokens: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|option| option["token"].as_str().unwrap().to_string())
            .collect();
        assert!(tokens.contains(&"$EVENT_TYPE".to_string()));
        assert!(tokens.contains(&"$EVENT_PAYLOAD[id]".to_string()));
    }

    #[tokio::test]
    async fn should_reject_invalid_sample_payload() {
        let response = build(test_state())
            .oneshot(get("/api/tokens?sample=%7Bnope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
