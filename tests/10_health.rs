mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_reports_ok() -> Result<()> {
    let server = common::students_server().await?;

    let (status, body) = server.get("/health").await?;
    assert_eq!(status, StatusCode::OK, "unexpected status: {}", status);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");

    Ok(())
}

#[tokio::test]
async fn root_lists_collections() -> Result<()> {
    let server = common::students_server().await?;

    let (status, body) = server.get("/").await?;
    assert_eq!(status, StatusCode::OK);
    let collections = body["data"]["collections"].as_array().cloned().unwrap_or_default();
    assert_eq!(collections, vec!["students", "grades", "products"]);

    Ok(())
}

#[tokio::test]
async fn collections_describe_params_and_sorting() -> Result<()> {
    let server = common::students_server().await?;

    let (status, body) = server.get("/api/collections").await?;
    assert_eq!(status, StatusCode::OK);

    let students = body["data"]
        .as_array()
        .and_then(|all| all.iter().find(|c| c["name"] == "students"))
        .cloned()
        .expect("students collection listed");
    let params: Vec<&str> = students["params"]
        .as_array()
        .map(|ps| ps.iter().filter_map(|p| p["param"].as_str()).collect())
        .unwrap_or_default();
    assert!(params.contains(&"minAge"));
    assert!(params.contains(&"excludeCities"));
    assert_eq!(students["default_sort"]["field"], "created_at");
    assert_eq!(students["default_sort"]["direction"], "asc");

    Ok(())
}

#[tokio::test]
async fn unknown_collection_is_not_found() -> Result<()> {
    let server = common::students_server().await?;

    let (status, body) = server.get("/api/invoices?city=Madrid").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "NOT_FOUND");

    Ok(())
}
