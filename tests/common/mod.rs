#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use listing_query::app::{app, AppState};
use listing_query::database::models::Catalog;
use listing_query::database::MemoryExecutor;
use listing_query::filter::FilterOptions;

/// An in-process API bound to a free port, living as long as the test's runtime.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start(executor: MemoryExecutor, options: FilterOptions) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::new(Catalog::builtin(), Arc::new(executor), options);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state, false)).await;
        });

        let server = Self { port, base_url, client: reqwest::Client::new() };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// GET a path and decode the JSON body, whatever the status.
    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.get(format!("{}{}", self.base_url, path)).send().await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        Ok((status, body))
    }

    /// GET a listing that must succeed and return its `data` object.
    pub async fn list(&self, path: &str) -> Result<Value> {
        let (status, body) = self.get(path).await?;
        anyhow::ensure!(status == StatusCode::OK, "unexpected status {} for {}: {}", status, path, body);
        anyhow::ensure!(body["success"] == true, "success!=true for {}: {}", path, body);
        Ok(body["data"].clone())
    }
}

/// Five students aged 15, 18, 25, 30 and 40, created in the order listed.
pub fn students() -> Vec<Value> {
    vec![
        json!({ "name": "Anna", "city": "Madrid", "age": 18 }),
        json!({ "name": "Juan", "city": "Lima", "age": 25 }),
        json!({ "name": "Marco", "city": "Rome", "age": 15 }),
        json!({ "name": "Sofia", "city": "Madrid", "age": 30 }),
        json!({ "name": "Pedro", "city": "Porto", "age": 40 }),
    ]
}

pub fn students_executor() -> Result<MemoryExecutor> {
    Ok(MemoryExecutor::from_records([("students".to_string(), students())])?)
}

pub async fn students_server() -> Result<TestServer> {
    TestServer::start(students_executor()?, FilterOptions::default()).await
}

/// Field values of each record in the listing, in response order.
pub fn column(data: &Value, field: &str) -> Vec<Value> {
    data["data"]
        .as_array()
        .map(|records| records.iter().map(|r| r[field].clone()).collect())
        .unwrap_or_default()
}

pub fn names(data: &Value) -> Vec<String> {
    column(data, "name").iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
}

pub fn ages(data: &Value) -> Vec<i64> {
    column(data, "age").iter().filter_map(Value::as_i64).collect()
}
