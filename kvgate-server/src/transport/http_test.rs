#[cfg(test)]
mod tests {
    use super::super::http::router;
    use crate::metrics::{Metrics, Operation};
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use kvgate::{AdmissionConfig, KvService, MemoryStore, ShardedStore};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(max_per_second: i64, enable_list: bool) -> (Router, Arc<Metrics>) {
        let service = Arc::new(KvService::new(
            AdmissionConfig::per_second(max_per_second),
            ShardedStore::builder().shard_count(4).build(),
        ));
        let metrics = Arc::new(Metrics::new());
        (router(service, Arc::clone(&metrics), enable_list), metrics)
    }

    async fn send_raw(app: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        };
        let (status, bytes) = send_raw(app, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_fourth_create_in_window_is_rejected() {
        let (app, metrics) = app(3, false);

        let mut statuses = Vec::new();
        for i in 0..4 {
            let (status, body) = send(
                &app,
                "POST",
                "/kv",
                Some(json!({"key": format!("k{i}"), "value": i})),
            )
            .await;
            statuses.push(status);
            if status == StatusCode::TOO_MANY_REQUESTS {
                assert_eq!(body, json!({"message": "Too Many Requests"}));
            }
        }

        assert_eq!(
            statuses,
            vec![
                StatusCode::CREATED,
                StatusCode::CREATED,
                StatusCode::CREATED,
                StatusCode::TOO_MANY_REQUESTS,
            ]
        );
        assert_eq!(metrics.operation_count(Operation::Create), 4);
    }

    #[tokio::test]
    async fn test_create_response_and_duplicate_conflict() {
        let (app, _) = app(0, false);

        let (status, body) = send(&app, "POST", "/kv", Some(json!({"key": "a", "value": {"x": 1}}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"message": "OK", "key": "a", "value": {"x": 1}}));

        let (status, body) = send(&app, "POST", "/kv", Some(json!({"key": "a", "value": 2}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({"message": "Conflict: 'key' must be unique"}));

        // The first value survives
        let (_, body) = send(&app, "GET", "/kv/a", None).await;
        assert_eq!(body, json!({"message": "OK", "value": {"x": 1}}));
    }

    #[tokio::test]
    async fn test_numeric_key_is_reachable_by_path() {
        let (app, _) = app(0, false);

        let (status, body) = send(&app, "POST", "/kv", Some(json!({"key": 42, "value": "n"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["key"], json!("42"));

        let (status, _) = send(&app, "GET", "/kv/42", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_fields_are_bad_requests() {
        let (app, _) = app(0, false);

        let (status, body) = send(&app, "POST", "/kv", Some(json!({"key": "a"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Bad Request: 'value' is expected"}));

        let (status, body) = send(&app, "POST", "/kv", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"message": "Bad Request: 'key' and 'value' are expected"})
        );

        let (status, body) = send(&app, "POST", "/kv", Some(json!({"key": [1], "value": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"message": "Bad Request: 'key' must be a string, number or boolean"})
        );

        send(&app, "POST", "/kv", Some(json!({"key": "a", "value": 1}))).await;
        let (status, body) = send(&app, "PUT", "/kv/a", Some(json!({"other": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Bad Request: 'value' is expected"}));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (app, _) = app(0, false);

        let (status, bytes) = send_raw(&app, "POST", "/kv", Body::from("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"message": "Bad Request: malformed JSON body"}));
    }

    #[tokio::test]
    async fn test_missing_content_type_has_its_own_reason() {
        let (app, _) = app(0, false);

        let request = Request::builder()
            .method("POST")
            .uri("/kv")
            .body(Body::from(json!({"key": "a", "value": 1}).to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({"message": "Bad Request: expected Content-Type: application/json"})
        );

        let (status, _) = send(&app, "GET", "/kv/a", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_undecodable_path_key_is_json_bad_request_and_counted() {
        let (app, metrics) = app(1, false);

        let (status, body) = send(&app, "GET", "/kv/%FF", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Bad Request: invalid key in path"}));

        let (status, body) = send(&app, "GET", "/kv/%FF", None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, json!({"message": "Too Many Requests"}));

        assert_eq!(metrics.operation_count(Operation::Get), 2);
    }

    #[tokio::test]
    async fn test_undecodable_path_key_on_update_and_delete() {
        let (app, _) = app(0, false);

        let (status, body) = send(&app, "PUT", "/kv/%FF", Some(json!({"value": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Bad Request: invalid key in path"}));

        let (status, body) = send(&app, "DELETE", "/kv/%FF", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Bad Request: invalid key in path"}));
    }

    #[tokio::test]
    async fn test_malformed_body_counts_against_window() {
        let (app, _) = app(1, false);

        let (status, _) = send_raw(&app, "POST", "/kv", Body::from("garbage")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "POST", "/kv", Some(json!({"key": "a", "value": 1}))).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_update_missing_key_is_not_found() {
        let (app, _) = app(0, false);

        let (status, body) = send(&app, "PUT", "/kv/missing", Some(json!({"value": 1}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Not Found"}));
    }

    #[tokio::test]
    async fn test_update_then_get() {
        let (app, _) = app(0, false);

        send(&app, "POST", "/kv", Some(json!({"key": "a", "value": 1}))).await;
        let (status, body) = send(&app, "PUT", "/kv/a", Some(json!({"value": [2, 3]}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "OK", "key": "a", "value": [2, 3]}));

        let (_, body) = send(&app, "GET", "/kv/a", None).await;
        assert_eq!(body["value"], json!([2, 3]));
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let (app, _) = app(0, false);

        send(&app, "POST", "/kv", Some(json!({"key": "a", "value": 1}))).await;

        let (status, body) = send(&app, "DELETE", "/kv/a", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "OK"}));

        let (status, _) = send(&app, "GET", "/kv/a", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "DELETE", "/kv/a", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_disabled_is_not_found() {
        let (app, _) = app(0, false);

        let (status, body) = send(&app, "GET", "/kv", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Not Found"}));
    }

    #[tokio::test]
    async fn test_list_sorted_by_key() {
        let (app, metrics) = app(0, true);

        for key in ["b", "c", "a"] {
            send(&app, "POST", "/kv", Some(json!({"key": key, "value": key}))).await;
        }

        let (status, body) = send(&app, "GET", "/kv", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "message": "OK",
                "data": [
                    {"key": "a", "value": "a"},
                    {"key": "b", "value": "b"},
                    {"key": "c", "value": "c"},
                ]
            })
        );
        assert_eq!(metrics.operation_count(Operation::List), 1);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let (app, _) = app(0, true);

        let (status, body) = send(&app, "GET", "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Not Found"}));
    }

    #[tokio::test]
    async fn test_health_and_metrics_bypass_admission() {
        let service = Arc::new(KvService::new(AdmissionConfig::per_second(1), MemoryStore::new()));
        let app = router(service, Arc::new(Metrics::new()), false);

        send(&app, "POST", "/kv", Some(json!({"key": "a", "value": 1}))).await;

        let (status, bytes) = send_raw(&app, "GET", "/health", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"OK");

        let (status, bytes) = send_raw(&app, "GET", "/metrics", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("kvgate_requests_total 1"));
        assert!(text.contains("kvgate_stored_keys 1"));
    }
}
