mod common;

use std::time::{Duration, Instant};

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use finsight_api::database::MemoryRecordStore;

#[tokio::test]
async fn login_burst_runs_one_background_analysis() -> Result<()> {
    let server = common::spawn_app(common::month_of_activity("1001"), common::StubBackend::replying(common::REPLY)).await?;

    let first = server.post_authed("/api/auth/session", "1001").await?;
    assert_eq!(first.status(), StatusCode::ACCEPTED);
    assert_eq!(first.json::<Value>().await?["data"]["dispatched"], true);

    let second = server.post_authed("/api/auth/session", "1001").await?;
    assert_eq!(second.status(), StatusCode::ACCEPTED);
    assert_eq!(second.json::<Value>().await?["data"]["dispatched"], false);

    server.backend.wait_for_calls(1, Duration::from_secs(5)).await?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.backend.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn login_does_not_wait_for_the_analysis() -> Result<()> {
    let backend = common::StubBackend::slow(common::REPLY, Duration::from_secs(3));
    let server = common::spawn_app(common::month_of_activity("1001"), backend).await?;

    let started = Instant::now();
    let res = server.post_authed("/api/auth/session", "1001").await?;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert!(started.elapsed() < Duration::from_secs(2));
    Ok(())
}

#[tokio::test]
async fn background_failure_never_reaches_the_login_caller() -> Result<()> {
    let server = common::spawn_app(MemoryRecordStore::new(), common::StubBackend::failing("provider down")).await?;

    let res = server.post_authed("/api/auth/session", "1001").await?;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    server.backend.wait_for_calls(1, Duration::from_secs(5)).await?;

    // The explicit run still retries the work and reports the failure
    let res = server.post_authed("/api/agent/run", "1001").await?;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(server.backend.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn customers_are_deduplicated_independently() -> Result<()> {
    let server = common::spawn_app(MemoryRecordStore::new(), common::StubBackend::replying(common::REPLY)).await?;

    for customer in ["1001", "1002"] {
        let body = server.post_authed("/api/auth/session", customer).await?.json::<Value>().await?;
        assert_eq!(body["data"]["dispatched"], true, "{}", customer);
    }
    server.backend.wait_for_calls(2, Duration::from_secs(5)).await?;
    Ok(())
}
