/*
 * http_integration.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * Integration tests for the HTTP/1.1 client. The local tests drive HttpClient and
 * HttpConnection directly against an in-process server; the ignored tests perform real
 * HTTPS requests to httpbin.org through the await entry points.
 *
 * Run with:
 *   cargo test -p corriere_core --test http_integration
 * Network tests:
 *   cargo test -p corriere_core --test http_integration -- --ignored --nocapture
 */

mod common;

use serde::Deserialize;

use common::MockServer;
use corriere_core::http::{CollectingHandler, HttpClient};
use corriere_core::{AwaitClient, ClientConfig, Json, Request};

#[tokio::test]
async fn connection_collects_chunked_response() {
    let server = MockServer::start().await;
    let mut conn = HttpClient::connect("127.0.0.1", server.addr.port(), false)
        .await
        .expect("connect failed");
    assert!(!conn.is_secure());

    let mut req = Request::get("/chunked");
    req.header("Connection", "close");
    let handler = CollectingHandler::new();
    let state = handler.state();
    conn.send(&req, handler).await.expect("request failed");

    let mut collected = state.lock().unwrap();
    assert!(collected.completed);
    assert!(collected.failure.is_none());
    assert_eq!(collected.response.as_ref().map(|r| r.code), Some(200));
    assert!(collected
        .headers
        .iter()
        .any(|(k, v)| k.eq_ignore_ascii_case("transfer-encoding") && v == "chunked"));
    assert_eq!(&collected.take_body()[..], b"hello, world");
}

#[tokio::test]
async fn connection_reports_error_status_through_handler() {
    let server = MockServer::start().await;
    let mut conn = HttpClient::connect("127.0.0.1", server.addr.port(), false)
        .await
        .expect("connect failed");

    let handler = CollectingHandler::new();
    let state = handler.state();
    conn.send(&Request::get("/missing"), handler).await.expect("request failed");

    let collected = state.lock().unwrap();
    let response = collected.response.as_ref().expect("status line");
    assert_eq!(response.code, 404);
    assert!(!response.is_success());
    assert_eq!(&collected.body[..], b"<h1>Not Found</h1>");
}

#[derive(Debug, Deserialize)]
struct Uuid {
    uuid: String,
}

#[derive(Debug, Deserialize)]
struct Origin {
    origin: String,
}

fn httpbin() -> AwaitClient<corriere_core::HttpExecutor> {
    let mut config = ClientConfig::new();
    config
        .set_base_path("https://httpbin.org")
        .add_base_header("User-Agent", "corriere/0.1 (integration-test)");
    AwaitClient::http(config)
}

#[tokio::test]
#[ignore] // requires network
async fn httpbin_uuid_and_ip() {
    let client = httpbin();

    let uuid = client
        .await_object(Request::get("/uuid"), &Json::<Uuid>::new())
        .await
        .expect("uuid request failed");
    println!("uuid: {}", uuid.uuid);
    assert!(!uuid.uuid.is_empty());

    let origin = client
        .await_object(Request::get("/ip"), &Json::<Origin>::new())
        .await
        .expect("ip request failed");
    println!("origin: {}", origin.origin);
    assert!(!origin.origin.is_empty());

    let mismatch = client
        .await_object_result(Request::get("/ip"), &Json::<Uuid>::new())
        .await;
    assert!(mismatch.fold(|_| false, |e| e.deserialization_error().is_some()));
}

#[tokio::test]
#[ignore] // requires network
async fn httpbin_not_found() {
    let client = httpbin();
    let (_, response, result) = client.await_string_response(Request::get("/status/404")).await;
    assert_eq!(response.map(|r| r.code), Some(404));
    let message = result.fold(|_| String::new(), |e| e.message());
    println!("{}", message);
    assert!(message.contains("HTTP Exception 404"));
}
