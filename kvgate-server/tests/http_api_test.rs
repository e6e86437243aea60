use anyhow::Result;
use futures::future::join_all;
use kvgate::{AdmissionConfig, KvService, ShardedStore};
use kvgate_server::metrics::Metrics;
use kvgate_server::transport::http::router;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;

/// Serve a fresh router on an ephemeral port
async fn spawn_server(max_per_second: i64, enable_list: bool) -> Result<SocketAddr> {
    let service = Arc::new(KvService::new(
        AdmissionConfig::per_second(max_per_second),
        ShardedStore::new(),
    ));
    let app = router(service, Arc::new(Metrics::new()), enable_list);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(addr)
}

#[tokio::test]
async fn test_record_lifecycle() -> Result<()> {
    let addr = spawn_server(0, true).await?;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}");

    let response = client
        .post(format!("{base}/kv"))
        .json(&json!({"key": "user:1", "value": {"name": "ada"}}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .put(format!("{base}/kv/user:1"))
        .json(&json!({"value": {"name": "grace"}}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = client.get(format!("{base}/kv/user:1")).send().await?.json().await?;
    assert_eq!(body, json!({"message": "OK", "value": {"name": "grace"}}));

    let body: Value = client.get(format!("{base}/kv")).send().await?.json().await?;
    assert_eq!(body["data"], json!([{"key": "user:1", "value": {"name": "grace"}}]));

    let response = client.delete(format!("{base}/kv/user:1")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get(format!("{base}/kv/user:1")).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_creates_have_one_winner() -> Result<()> {
    let addr = spawn_server(0, false).await?;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/kv");

    let requests = (0..16).map(|i| {
        let client = client.clone();
        let url = url.clone();
        async move {
            client
                .post(url)
                .json(&json!({"key": "contended", "value": i}))
                .send()
                .await
                .map(|response| response.status())
        }
    });

    let statuses = join_all(requests)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let conflicts = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
    assert_eq!(created, 1);
    assert_eq!(conflicts, 15);

    Ok(())
}

#[tokio::test]
async fn test_admission_limit_over_the_wire() -> Result<()> {
    let addr = spawn_server(3, false).await?;
    let client = reqwest::Client::new();

    let mut statuses = Vec::new();
    for i in 0..4 {
        let response = client
            .post(format!("http://{addr}/kv"))
            .json(&json!({"key": i, "value": i}))
            .send()
            .await?;
        statuses.push(response.status());
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

    // Health checks are never throttled
    let response = client.get(format!("http://{addr}/health")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");

    // A quiet window lets requests through again
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let response = client.get(format!("http://{addr}/kv/0")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
