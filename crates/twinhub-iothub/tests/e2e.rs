// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the registry client.
//!
//! Each test builds its own client against an in-memory backend, a mock
//! transport, or a wiremock server. Tests are independent and
//! order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use reqwest::StatusCode;
use twinhub_iothub::{
    ClientOptions, ConnectionString, Context, ContextError, Device, DeviceStatus, DeviceTwin,
    HttpResponse, IotHubClient, TwinhubError,
};
use twinhub_test_utils::{ADMIN_CONNECTION_STRING, FakeTwinBackend, MockTransport, TestHub};
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn admin() -> ConnectionString {
    ConnectionString::parse(ADMIN_CONNECTION_STRING).unwrap()
}

fn mock_client(transport: MockTransport) -> (IotHubClient, Arc<MockTransport>) {
    let transport = Arc::new(transport);
    let client = IotHubClient::new(ClientOptions::new().with_transport(transport.clone())).unwrap();
    (client, transport)
}

// ---- Test 1: Twin enumeration ----

#[tokio::test]
async fn test_enumerates_all_twins_then_end_of_sequence() {
    let hub = TestHub::builder().with_twins(101).build().unwrap();
    let ctx = Context::background();

    let mut cursor = hub
        .client
        .get_device_twins(&ctx, &hub.connection_string)
        .await
        .unwrap();

    let mut count = 0;
    while cursor.next(&ctx).await {
        let twin: DeviceTwin = cursor.decode().unwrap();
        assert_eq!(twin, FakeTwinBackend::twin(count));
        count += 1;
    }

    assert_eq!(count, 101);
    assert!(cursor.err().is_none());
    assert!(cursor.decode::<DeviceTwin>().unwrap_err().is_end_of_sequence());
    assert_eq!(hub.backend.pages_served(), 2);
}

#[tokio::test]
async fn test_small_pages_follow_continuation_tokens() {
    let hub = TestHub::builder()
        .with_twins(101)
        .with_page_size(10)
        .build()
        .unwrap();
    let ctx = Context::background();

    let mut cursor = hub
        .client
        .get_device_twins(&ctx, &hub.connection_string)
        .await
        .unwrap();
    let mut ids = Vec::new();
    while cursor.next(&ctx).await {
        ids.push(cursor.decode::<DeviceTwin>().unwrap().device_id);
    }

    assert_eq!(ids.len(), 101);
    assert_eq!(ids.first().map(String::as_str), Some("device-0000"));
    assert_eq!(ids.last().map(String::as_str), Some("device-0100"));
    assert_eq!(hub.backend.pages_served(), 11);
}

#[tokio::test]
async fn test_empty_hub_has_no_twins() {
    let hub = TestHub::builder().build().unwrap();
    let ctx = Context::background();
    let mut cursor = hub
        .client
        .get_device_twins(&ctx, &hub.connection_string)
        .await
        .unwrap();
    assert!(!cursor.next(&ctx).await);
    assert!(cursor.err().is_none());
}

#[tokio::test]
async fn test_twins_as_stream() {
    let hub = TestHub::builder()
        .with_twins(25)
        .with_page_size(7)
        .build()
        .unwrap();
    let ctx = Context::background();
    let cursor = hub
        .client
        .get_device_twins(&ctx, &hub.connection_string)
        .await
        .unwrap();

    let twins: Vec<DeviceTwin> = cursor
        .into_stream(ctx)
        .map(|twin| twin.unwrap())
        .collect()
        .await;
    assert_eq!(twins.len(), 25);
    assert_eq!(twins[24].version, 25);
}

// ---- Test 2: Cancellation and deadlines ----

#[tokio::test]
async fn test_canceled_context_fails_enumeration_call() {
    let hub = TestHub::builder().with_twins(10).build().unwrap();
    let ctx = Context::background();
    ctx.cancel();

    let err = hub
        .client
        .get_device_twins(&ctx, &hub.connection_string)
        .await
        .unwrap_err();
    assert!(matches!(err, TwinhubError::Context(ContextError::Canceled)));
    assert_eq!(hub.backend.pages_served(), 0);
}

#[tokio::test]
async fn test_cancel_at_page_boundary_stops_cursor() {
    let hub = TestHub::builder()
        .with_twins(30)
        .with_page_size(10)
        .build()
        .unwrap();
    let ctx = Context::background();
    let mut cursor = hub
        .client
        .get_device_twins(&ctx, &hub.connection_string)
        .await
        .unwrap();

    for _ in 0..10 {
        assert!(cursor.next(&ctx).await);
    }
    ctx.cancel();

    assert!(!cursor.next(&ctx).await);
    assert_eq!(
        cursor.err().and_then(TwinhubError::context_error),
        Some(ContextError::Canceled)
    );
    let err = cursor.decode::<DeviceTwin>().unwrap_err();
    assert_eq!(err.context_error(), Some(ContextError::Canceled));
    assert_eq!(hub.backend.pages_served(), 1);
}

#[tokio::test]
async fn test_cancel_mid_page_yields_nothing_more() {
    let hub = TestHub::builder()
        .with_twins(30)
        .with_page_size(10)
        .build()
        .unwrap();
    let ctx = Context::background();
    let mut cursor = hub
        .client
        .get_device_twins(&ctx, &hub.connection_string)
        .await
        .unwrap();

    for _ in 0..3 {
        assert!(cursor.next(&ctx).await);
    }
    ctx.cancel();

    let mut after_cancel = 0;
    while cursor.next(&ctx).await {
        after_cancel += 1;
    }
    assert_eq!(after_cancel, 0);
    assert_eq!(
        cursor.err().and_then(TwinhubError::context_error),
        Some(ContextError::Canceled)
    );
    assert_eq!(hub.backend.pages_served(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_expires_mid_enumeration() {
    let hub = TestHub::builder()
        .with_twins(101)
        .with_page_size(10)
        .with_latency(Duration::from_millis(100))
        .build()
        .unwrap();
    let ctx = Context::background().with_timeout(Duration::from_millis(250));

    let mut cursor = hub
        .client
        .get_device_twins(&ctx, &hub.connection_string)
        .await
        .unwrap();
    let mut count = 0;
    while cursor.next(&ctx).await {
        count += 1;
    }

    // Pages land at 100ms and 200ms; the third is still in flight at 250ms.
    assert_eq!(count, 20);
    let err = cursor.err().unwrap();
    assert_eq!(err.context_error(), Some(ContextError::DeadlineExceeded));
    assert!(matches!(err, TwinhubError::ExecuteRequest { .. }));
    assert!(!matches!(
        cursor.decode::<DeviceTwin>().unwrap_err(),
        TwinhubError::Decode { .. }
    ));
}

// ---- Test 3: Request validation ----

#[tokio::test]
async fn test_invalid_connection_string_fails_before_io() {
    let hub = TestHub::builder().with_twins(3).build().unwrap();
    let invalid = ConnectionString {
        name: "bad".into(),
        ..Default::default()
    };

    let err = hub
        .client
        .get_device_twins(&Context::background(), &invalid)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to prepare request: invalid connection string"
    );
    assert_eq!(hub.backend.pages_served(), 0);
}

// ---- Test 4: Registry operations and error classification ----

#[tokio::test]
async fn test_upsert_server_error_is_status_500() {
    let (client, _) = mock_client(MockTransport::respond_with(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"deviceId":"dev-1"}"#,
    ));
    let update = Device {
        status: Some(DeviceStatus::Enabled),
        ..Default::default()
    };

    let err = client
        .upsert_device(&Context::background(), &admin(), "dev-1", [&update])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, TwinhubError::Http(_)));
}

#[tokio::test]
async fn test_upsert_returns_updated_device() {
    let (client, transport) = mock_client(MockTransport::echo());
    let first = Device {
        status: Some(DeviceStatus::Disabled),
        ..Default::default()
    };
    let second = Device {
        status: Some(DeviceStatus::Enabled),
        ..Default::default()
    };

    let device = client
        .upsert_device(&Context::background(), &admin(), "dev-1", [&first, &second])
        .await
        .unwrap();
    assert_eq!(device.device_id, "dev-1");
    assert_eq!(device.status, Some(DeviceStatus::Enabled));
    assert_eq!(transport.request_count().await, 1);
}

#[tokio::test]
async fn test_upsert_bad_body_names_updated_device() {
    let (client, _) = mock_client(MockTransport::respond_with(StatusCode::OK, "]"));
    let err = client
        .upsert_device(&Context::background(), &admin(), "dev-1", Vec::<&Device>::new())
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("failed to decode updated device"));
}

#[tokio::test]
async fn test_get_device_bad_body_names_device() {
    let (client, transport) = mock_client(MockTransport::respond_with(StatusCode::OK, "nope"));
    let err = client
        .get_device(&Context::background(), &admin(), "dev-1")
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("failed to decode device"));

    let requests = transport.requests().await;
    assert_eq!(requests[0].url.path(), "/devices/dev-1");
}

#[tokio::test]
async fn test_transport_failure_is_execute_error() {
    let (client, _) = mock_client(MockTransport::failing("idk"));
    let err = client
        .get_device(&Context::background(), &admin(), "dev-1")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "failed to execute request: idk");
}

#[tokio::test]
async fn test_delete_sends_precondition() {
    let (client, transport) =
        mock_client(MockTransport::new(|_| Ok(HttpResponse::new(StatusCode::NO_CONTENT, ""))));
    client
        .delete_device(&Context::background(), &admin(), "dev-1", Some("qwerty"))
        .await
        .unwrap();

    let requests = transport.requests().await;
    assert_eq!(requests[0].method, reqwest::Method::DELETE);
    assert_eq!(requests[0].headers["if-match"], "\"qwerty\"");
}

// ---- Test 5: Real HTTP through reqwest ----

#[tokio::test]
async fn test_reqwest_transport_against_local_gateway() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/devices/dev-1"))
        .and(query_param("api-version", "2021-04-12"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "deviceId": "dev-1",
            "etag": "e1",
            "status": "enabled"
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/devices/dev-1"))
        .and(header("if-match", "\"e1\""))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({
            "deviceId": "dev-1",
            "etag": "e1",
            "status": "disabled"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "deviceId": "dev-1",
            "etag": "e2",
            "status": "disabled"
        })))
        .mount(&server)
        .await;

    let cs = ConnectionString::parse(&format!(
        "HostName=myhub.example.net;SharedAccessKeyName=admin;SharedAccessKey=c3VwZXIgc2VjcmV0Cg==;GatewayHostName={}",
        server.address()
    ))
    .unwrap();
    let client = IotHubClient::new(
        ClientOptions::new()
            .with_tls(false)
            .with_request_timeout(Duration::from_secs(5)),
    )
    .unwrap();
    let ctx = Context::background();

    let existing = client.get_device(&ctx, &cs, "dev-1").await.unwrap();
    assert_eq!(existing.etag, "e1");

    let disable = Device {
        status: Some(DeviceStatus::Disabled),
        ..Default::default()
    };
    let updated = client
        .upsert_device(&ctx, &cs, "dev-1", [&existing, &disable])
        .await
        .unwrap();
    assert_eq!(updated.etag, "e2");
    assert_eq!(updated.status, Some(DeviceStatus::Disabled));
}

#[tokio::test]
async fn test_reqwest_transport_maps_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/twins/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "Message": "ErrorCode:DeviceNotFound;ghost"
        })))
        .mount(&server)
        .await;

    let cs = ConnectionString::parse(&format!(
        "{ADMIN_CONNECTION_STRING};GatewayHostName={}",
        server.address()
    ))
    .unwrap();
    let client = IotHubClient::new(ClientOptions::new().with_tls(false)).unwrap();

    let err = client
        .get_device_twin(&Context::background(), &cs, "ghost")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "http error 404: ErrorCode:DeviceNotFound;ghost");
}
