//! Frontend serving mode tests.

use gridbnb_server::frontend::ServingMode;
use gridbnb_tests::{APP_JS, BuildDir, INDEX_HTML, spawn_app};
use serde_json::Value;

#[tokio::test]
async fn test_degraded_root_reports_expected_path() {
    let build = BuildDir::missing();
    let server = spawn_app(&build).await;
    assert_eq!(server.mode, ServingMode::Degraded);

    let response = server.get("/").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["error"], "Frontend not built");
    assert_eq!(
        body["expected_path"],
        build.dist().display().to_string().as_str()
    );
    assert!(body["message"].is_string());
    assert!(body["troubleshooting"]["check_docker_build"].is_string());
    assert!(body["troubleshooting"]["check_copy_instruction"].is_string());
    assert!(body["troubleshooting"]["check_build_output"].is_string());

    server.stop().await;
}

#[tokio::test]
async fn test_degraded_has_no_catch_all() {
    let build = BuildDir::missing();
    let server = spawn_app(&build).await;

    assert_eq!(server.get("/settings").await.status(), 404);
    assert_eq!(server.get("/assets/app.js").await.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_full_mode_serves_assets_and_shell() {
    let build = BuildDir::for_mode(ServingMode::Full);
    let server = spawn_app(&build).await;
    assert_eq!(server.mode, ServingMode::Full);

    let asset = server.get("/assets/app.js").await;
    assert_eq!(asset.status(), 200);
    assert_eq!(asset.text().await.unwrap(), APP_JS);

    for path in ["/", "/any/unknown/path", "/settings/general", "/grid?symbol=BNB"] {
        let response = server.get(path).await;
        assert_eq!(response.status(), 200, "{}", path);
        assert_eq!(response.text().await.unwrap(), INDEX_HTML, "{}", path);
    }

    server.stop().await;
}

#[tokio::test]
async fn test_full_mode_missing_asset_is_not_found() {
    let build = BuildDir::for_mode(ServingMode::Full);
    let server = spawn_app(&build).await;

    let response = server.get("/assets/missing.css").await;
    assert_eq!(response.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_shell_headers() {
    let build = BuildDir::for_mode(ServingMode::Full);
    let server = spawn_app(&build).await;

    let response = server.get("/dashboard").await;
    let headers = response.headers();
    assert_eq!(
        headers.get("content-type").unwrap(),
        "text/html; charset=utf-8"
    );
    assert_eq!(headers.get("cache-control").unwrap(), "no-cache");

    server.stop().await;
}

#[tokio::test]
async fn test_partial_mode_has_no_assets() {
    let build = BuildDir::for_mode(ServingMode::Partial);
    let server = spawn_app(&build).await;
    assert_eq!(server.mode, ServingMode::Partial);

    assert_eq!(server.get("/assets/app.js").await.status(), 404);

    let response = server.get("/unknown").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), INDEX_HTML);

    server.stop().await;
}

#[tokio::test]
async fn test_assets_only_mode_has_no_shell() {
    let build = BuildDir::for_mode(ServingMode::AssetsOnly);
    let server = spawn_app(&build).await;
    assert_eq!(server.mode, ServingMode::AssetsOnly);

    let asset = server.get("/assets/app.js").await;
    assert_eq!(asset.status(), 200);
    assert_eq!(asset.text().await.unwrap(), APP_JS);

    assert_eq!(server.get("/").await.status(), 404);
    assert_eq!(server.get("/settings").await.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_empty_build_serves_nothing() {
    let build = BuildDir::for_mode(ServingMode::Empty);
    let server = spawn_app(&build).await;
    assert_eq!(server.mode, ServingMode::Empty);

    assert_eq!(server.get("/").await.status(), 404);
    assert_eq!(server.get("/assets/app.js").await.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_shell_rejects_writes() {
    let build = BuildDir::for_mode(ServingMode::Full);
    let server = spawn_app(&build).await;

    let response = server
        .client
        .post(server.url("/settings"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 405);

    server.stop().await;
}

#[tokio::test]
async fn test_shell_ignores_other_spellings_of_reserved_paths() {
    let build = BuildDir::for_mode(ServingMode::Full);
    let server = spawn_app(&build).await;

    for path in ["/%61pi/configs", "//api/x", "/%61ssets/app.js"] {
        let response = server.get(path).await;
        assert_eq!(response.status(), 404, "{}", path);
        assert_ne!(response.text().await.unwrap(), INDEX_HTML, "{}", path);
    }

    server.stop().await;
}
