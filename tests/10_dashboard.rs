mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use serde_json::Value;

use common::{spawn_app, HOST, TEMPLATE_ID, USER_ID};

const BUILDER_HOST: &str = "p-5f0c3a52-1b7e-4c1d-9b43-2f7b8e6d9a01.studio.example.com";

#[tokio::test]
async fn dashboard_returns_projects_for_signed_in_user() -> Result<()> {
    let app = spawn_app().await;
    let cookie = app.session_cookie(USER_ID);

    let (status, headers, body) = app
        .get(
            HOST,
            "/dashboard",
            &[
                ("cookie", cookie),
                ("sec-fetch-site", "same-origin".to_string()),
                ("sec-fetch-dest", "document".to_string()),
            ],
        )
        .await?;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");

    assert_eq!(body["user"]["id"], USER_ID);
    assert_eq!(body["projects"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["projects"][0]["id"], "project-1");
    assert_eq!(body["projectTemplates"][0]["id"], TEMPLATE_ID);
    assert_eq!(body["userPlanFeatures"]["hasProPlan"], false);
    assert_eq!(body["publisherHost"], "publisher.example.com");
    assert_eq!(body["imageBaseUrl"], "/cgi/image/");
    assert_eq!(body["origin"], "http://studio.example.com");
    Ok(())
}

#[tokio::test]
async fn builder_host_is_not_found_even_when_signed_in() -> Result<()> {
    let app = spawn_app().await;

    let (status, _, _) = app.get(BUILDER_HOST, "/dashboard", &[]).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let cookie = app.session_cookie(USER_ID);
    let (status, _, _) = app.get(BUILDER_HOST, "/dashboard", &[("cookie", cookie)]).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.project_queries(), 0);
    Ok(())
}

#[tokio::test]
async fn forwarded_host_is_ignored_by_default() -> Result<()> {
    let app = spawn_app().await;
    let cookie = app.session_cookie(USER_ID);

    let (status, _, body) = app
        .get(
            HOST,
            "/dashboard",
            &[("cookie", cookie), ("x-forwarded-host", BUILDER_HOST.to_string())],
        )
        .await?;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["origin"], "http://studio.example.com");
    Ok(())
}

#[tokio::test]
async fn anonymous_request_redirects_to_login() -> Result<()> {
    let app = spawn_app().await;

    let (status, headers, body) = app.get(HOST, "/dashboard", &[]).await?;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "/login?returnTo=%2Fdashboard");
    assert_eq!(body, Value::Null);
    assert_eq!(app.store.project_queries(), 0);
    Ok(())
}

#[tokio::test]
async fn session_for_unknown_user_redirects_to_login() -> Result<()> {
    let app = spawn_app().await;
    let cookie = app.session_cookie("ghost");

    let (status, _, _) = app.get(HOST, "/dashboard", &[("cookie", cookie)]).await?;
    assert_eq!(status, StatusCode::FOUND);
    Ok(())
}

#[tokio::test]
async fn cross_site_fetch_is_rejected_before_any_lookup() -> Result<()> {
    let app = spawn_app().await;
    let cookie = app.session_cookie(USER_ID);

    let (status, _, body) = app
        .get(
            HOST,
            "/dashboard",
            &[
                ("cookie", cookie),
                ("sec-fetch-site", "cross-site".to_string()),
                ("sec-fetch-mode", "cors".to_string()),
                ("sec-fetch-dest", "empty".to_string()),
            ],
        )
        .await?;

    assert!(status.is_server_error());
    assert!(body.get("projects").is_none());
    assert_eq!(app.store.project_queries(), 0);
    Ok(())
}

#[tokio::test]
async fn iframe_destination_is_rejected() -> Result<()> {
    let app = spawn_app().await;
    let cookie = app.session_cookie(USER_ID);

    let (status, _, body) = app
        .get(
            HOST,
            "/dashboard",
            &[
                ("cookie", cookie),
                ("sec-fetch-site", "same-origin".to_string()),
                ("sec-fetch-dest", "iframe".to_string()),
            ],
        )
        .await?;

    assert!(status.is_server_error());
    assert!(body.get("user").is_none());
    assert_eq!(app.store.project_queries(), 0);
    Ok(())
}

#[tokio::test]
async fn unknown_auth_token_fails_the_request() -> Result<()> {
    let app = spawn_app().await;
    let cookie = app.session_cookie(USER_ID);

    let (status, _, body) = app
        .get(HOST, "/dashboard?authToken=does-not-exist", &[("cookie", cookie)])
        .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert_eq!(app.store.project_queries(), 0);
    Ok(())
}

#[tokio::test]
async fn health_reports_memory_backend() -> Result<()> {
    let app = spawn_app().await;

    let (status, _, body) = app.get(HOST, "/health", &[]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "memory");
    Ok(())
}
