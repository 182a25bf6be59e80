//! Completion waits in sync mode, against a wiremock server.

use gsclient::resources::firewall::{CreateFirewall, FirewallRules, UpdateFirewall};
use gsclient::resources::server::LinkStorage;
use gsclient::{Client, Config, Context, Error, ErrorCategory};
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REQUEST_UUID: &str = "x123xx1x-123x-1x12-123x-123xxx123x1x";
const FIREWALL_ID: &str = "690de890-13c0-4e76-8a01-e10ba8786e53";
const SERVER_ID: &str = "2f5a1b9c-8d4e-4c2a-9f6b-1e3d5c7a9b02";
const STORAGE_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

fn client(server: &MockServer, sync: bool) -> Client {
    let config = Config::builder("user", "token")
        .api_url(server.uri())
        .unwrap()
        .sync(sync)
        .delay_interval(Duration::from_millis(10))
        .request_check_timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    Client::new(config)
}

fn create_firewall() -> CreateFirewall {
    CreateFirewall {
        name: "web".to_string(),
        rules: FirewallRules::default(),
        labels: None,
    }
}

async fn mount_accepted_create(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/objects/firewalls"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "object_uuid": FIREWALL_ID,
            "request_uuid": REQUEST_UUID,
        })))
        .mount(server)
        .await;
}

async fn mount_request_status(server: &MockServer, status: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/requests/{REQUEST_UUID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            REQUEST_UUID: {"status": status, "message": "", "create_time": "2024-05-01T09:30:00Z"},
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sync_create_waits_for_request_then_object() {
    let server = MockServer::start().await;
    mount_accepted_create(&server).await;
    mount_request_status(&server, "done").await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/firewalls/{FIREWALL_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firewall": {"object_uuid": FIREWALL_ID, "name": "web", "status": "active"},
        })))
        .mount(&server)
        .await;

    let created = client(&server, true)
        .firewalls()
        .create(&Context::background(), &create_firewall())
        .await
        .unwrap();

    assert_eq!(created.object_uuid, FIREWALL_ID);
    assert_eq!(created.request_uuid, REQUEST_UUID);

    let received = server.received_requests().await.unwrap();
    let calls: Vec<_> = received
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect();
    assert_eq!(
        calls,
        [
            "POST /objects/firewalls".to_string(),
            format!("GET /requests/{REQUEST_UUID}"),
            format!("GET /objects/firewalls/{FIREWALL_ID}"),
        ]
    );
}

#[tokio::test]
async fn test_sync_create_keeps_polling_until_active() {
    let server = MockServer::start().await;
    mount_accepted_create(&server).await;
    mount_request_status(&server, "done").await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/firewalls/{FIREWALL_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firewall": {"object_uuid": FIREWALL_ID, "status": "in-provisioning"},
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/firewalls/{FIREWALL_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firewall": {"object_uuid": FIREWALL_ID, "status": "active"},
        })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, true)
        .firewalls()
        .create(&Context::background(), &create_firewall())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_async_create_returns_at_once() {
    let server = MockServer::start().await;
    mount_accepted_create(&server).await;

    let created = client(&server, false)
        .firewalls()
        .create(&Context::background(), &create_firewall())
        .await
        .unwrap();

    assert_eq!(created.object_uuid, FIREWALL_ID);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_request_ends_the_wait() {
    let server = MockServer::start().await;
    mount_accepted_create(&server).await;
    mount_request_status(&server, "failed").await;

    let err = client(&server, true)
        .firewalls()
        .create(&Context::background(), &create_firewall())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RequestFailed { .. }));
    assert_eq!(err.request_uuid(), Some(REQUEST_UUID));
}

#[tokio::test]
async fn test_pending_request_times_out() {
    let server = MockServer::start().await;
    mount_accepted_create(&server).await;
    mount_request_status(&server, "pending").await;

    let config = Config::builder("user", "token")
        .api_url(server.uri())
        .unwrap()
        .sync(true)
        .delay_interval(Duration::from_millis(10))
        .request_check_timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let err = Client::new(config)
        .firewalls()
        .create(&Context::background(), &create_firewall())
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Timeout);
    assert!(err.to_string().contains(REQUEST_UUID));
}

#[tokio::test]
async fn test_cancellation_stops_a_pending_wait() {
    let server = MockServer::start().await;
    mount_request_status(&server, "pending").await;

    let delay_interval = Duration::from_millis(500);
    let config = Config::builder("user", "token")
        .api_url(server.uri())
        .unwrap()
        .sync(true)
        .delay_interval(delay_interval)
        .request_check_timeout(Duration::from_secs(10))
        .build()
        .unwrap();
    let client = Client::new(config);

    let ctx = Context::background();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let err = client
        .wait_for_request_completed(&ctx, REQUEST_UUID)
        .await
        .unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(err.category(), ErrorCategory::Timeout);
    assert!(elapsed < Duration::from_millis(250), "took {elapsed:?}");
    assert!(elapsed < delay_interval);
}

#[tokio::test]
async fn test_cancellation_interrupts_create_wait() {
    let server = MockServer::start().await;
    mount_accepted_create(&server).await;
    mount_request_status(&server, "pending").await;

    let client = client(&server, true);
    let ctx = Context::background();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let err = client
        .firewalls()
        .create(&ctx, &create_firewall())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_sync_update_waits_until_active() {
    let server = MockServer::start().await;
    let object_path = format!("/objects/firewalls/{FIREWALL_ID}");
    Mock::given(method("PATCH"))
        .and(path(object_path.as_str()))
        .and(body_json(json!({"name": "web-2"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(object_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firewall": {"object_uuid": FIREWALL_ID, "status": "in-provisioning"},
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(object_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firewall": {"object_uuid": FIREWALL_ID, "status": "active"},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let update = UpdateFirewall {
        name: Some("web-2".to_string()),
        ..Default::default()
    };
    client(&server, true)
        .firewalls()
        .update(&Context::background(), FIREWALL_ID, &update)
        .await
        .unwrap();

    let calls: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect();
    assert_eq!(
        calls,
        [
            format!("PATCH {object_path}"),
            format!("GET {object_path}"),
            format!("GET {object_path}"),
        ]
    );
}

#[tokio::test]
async fn test_unbounded_check_timeout_still_completes() {
    let server = MockServer::start().await;
    let object_path = format!("/objects/storages/{STORAGE_ID}");
    Mock::given(method("DELETE"))
        .and(path(object_path.as_str()))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(object_path.as_str()))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config::builder("user", "token")
        .api_url(server.uri())
        .unwrap()
        .sync(true)
        .delay_interval(Duration::from_millis(10))
        .request_check_timeout(Duration::MAX)
        .build()
        .unwrap();

    Client::new(config)
        .storages()
        .delete(&Context::background().with_timeout(Duration::MAX), STORAGE_ID)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sync_delete_waits_for_not_found() {
    let server = MockServer::start().await;
    let object_path = format!("/objects/storages/{STORAGE_ID}");
    Mock::given(method("DELETE"))
        .and(path(object_path.as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(object_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"storage": {}})))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(object_path.as_str()))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, true)
        .storages()
        .delete(&Context::background(), STORAGE_ID)
        .await
        .unwrap();

    let gets = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(gets, 3);
}

#[tokio::test]
async fn test_async_delete_does_not_poll() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/objects/storages/{STORAGE_ID}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, false)
        .storages()
        .delete(&Context::background(), STORAGE_ID)
        .await
        .unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_power_on_waits_for_power_flag() {
    let server = MockServer::start().await;
    let object_path = format!("/objects/servers/{SERVER_ID}");
    Mock::given(method("GET"))
        .and(path(object_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server": {"object_uuid": SERVER_ID, "power": false},
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(object_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server": {"object_uuid": SERVER_ID, "power": true},
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{object_path}/power")))
        .and(body_json(json!({"power": true})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, true)
        .servers()
        .power_on(&Context::background(), SERVER_ID)
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert!(received.iter().all(|r| !r.url.path().starts_with("/requests")));
}

#[tokio::test]
async fn test_power_on_skips_running_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/servers/{SERVER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server": {"object_uuid": SERVER_ID, "power": true},
        })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, true)
        .servers()
        .power_on(&Context::background(), SERVER_ID)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_link_storage_waits_for_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/objects/servers/{SERVER_ID}/storages")))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("x-request-id", REQUEST_UUID)
                .set_body_json(json!({})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_request_status(&server, "done").await;

    let link = LinkStorage {
        object_uuid: STORAGE_ID.to_string(),
        bootdevice: Some(true),
    };
    client(&server, true)
        .servers()
        .link_storage(&Context::background(), SERVER_ID, &link)
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[1].url.path(), format!("/requests/{REQUEST_UUID}"));
}
