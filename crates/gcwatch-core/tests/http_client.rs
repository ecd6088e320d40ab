use std::sync::Arc;
use std::time::Duration;

use gcwatch_core::app::{ActionOutcome, ViewBuilder};
use gcwatch_core::domain::{ApiError, EditorClose, TaskRunState, Upid};
use gcwatch_core::impls::{
    HttpApiClient, HttpClientConfig, RecordingAlertSink, RecordingTaskViewer,
    ScriptedScheduleEditor,
};
use gcwatch_core::ports::ApiClient;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

const UPID: &str = "UPID:pbs:000004D2:0001E240:00000003:65A2B0C0:garbage_collection:A:root@pam:";

fn client(server: &MockServer) -> HttpApiClient {
    HttpApiClient::new(HttpClientConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        node: "pbs".to_string(),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_gc_jobs_unwraps_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api2/json/admin/gc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "store": "A", "schedule": null, "last-run-endtime": null },
                {
                    "store": "B",
                    "schedule": "daily",
                    "last-run-upid": UPID,
                    "last-run-endtime": 1_705_161_021,
                    "last-run-state": "OK",
                    "next-run": 1_705_247_296,
                    "removed-chunks": 12,
                    "pending-chunks": 3
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let jobs = client(&server).list_gc_jobs().await.unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].store, "A");
    assert_eq!(jobs[0].schedule, None);
    assert_eq!(jobs[0].duration(), None);
    assert_eq!(jobs[1].duration(), Some(125));
    assert_eq!(jobs[1].removed_chunks, Some(12));
}

#[tokio::test]
async fn test_start_gc_returns_upid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api2/json/admin/datastore/A/gc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": UPID })))
        .mount(&server)
        .await;

    let upid = client(&server).start_gc("A").await.unwrap();

    assert_eq!(upid, Upid::new(UPID));
    assert_eq!(upid.starttime(), Ok(1_705_160_896));
}

#[tokio::test]
async fn test_error_message_becomes_status_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api2/json/admin/datastore/A/gc"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "data": null,
            "message": "garbage collection already running"
        })))
        .mount(&server)
        .await;

    let err = client(&server).start_gc("A").await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Status {
            code: 400,
            status_text: "garbage collection already running".into(),
        }
    );
}

#[tokio::test]
async fn test_plain_text_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api2/json/admin/gc"))
        .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
        .mount(&server)
        .await;

    let err = client(&server).list_gc_jobs().await.unwrap_err();

    assert_eq!(err.status_text(), "service unavailable");
}

#[tokio::test]
async fn test_api_token_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api2/json/admin/gc"))
        .and(header("Authorization", "PBSAPIToken=root@pam!gc:secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpApiClient::new(HttpClientConfig {
        base_url: server.uri(),
        api_token: Some("root@pam!gc:secret".to_string()),
        ..Default::default()
    })
    .unwrap();

    assert!(client.list_gc_jobs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_gc_schedule_bodies() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api2/json/config/datastore/A"))
        .and(body_json(json!({ "gc-schedule": "daily" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api2/json/config/datastore/A"))
        .and(body_json(json!({ "delete": ["gc-schedule"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.update_gc_schedule("A", Some("daily")).await.unwrap();
    client.update_gc_schedule("A", None).await.unwrap();
}

#[tokio::test]
async fn test_namespaces_path_is_percent_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api2/json/admin/datastore/my%20store/namespace"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "ns": "" }, { "ns": "dev", "comment": "development" } ]
        })))
        .mount(&server)
        .await;

    let entries = client(&server).list_namespaces("my store").await.unwrap();

    assert_eq!(entries.len(), 2);
    assert!(entries[0].is_root());
    assert_eq!(entries[1].comment.as_deref(), Some("development"));
}

#[tokio::test]
async fn test_task_status_uses_node() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/api2/json/nodes/pbs/tasks/{UPID}/status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "upid": UPID, "status": "stopped", "exitstatus": "OK" }
        })))
        .mount(&server)
        .await;

    let status = client(&server).task_status(&Upid::new(UPID)).await.unwrap();

    assert_eq!(status.status, TaskRunState::Stopped);
    assert!(status.is_finished());
}

#[tokio::test]
async fn test_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api2/json/admin/gc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).list_gc_jobs().await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_run_now_over_http_opens_task_viewer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api2/json/admin/gc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "store": "A" } ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/admin/datastore/A/gc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": UPID })))
        .expect(1)
        .mount(&server)
        .await;

    let viewer = Arc::new(RecordingTaskViewer::new());
    let view = ViewBuilder::new(Arc::new(client(&server)))
        .task_viewer(viewer.clone())
        .alerts(Arc::new(RecordingAlertSink::new()))
        .schedule_editor(Arc::new(ScriptedScheduleEditor::new(EditorClose::Cancelled)))
        .build()
        .unwrap();

    view.store().load().await.unwrap();
    let rows = view.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].schedule, "None");
    assert_eq!(rows[0].duration, "");

    let outcome = view.run_now().await;

    assert_eq!(outcome, ActionOutcome::Opened(Upid::new(UPID)));
    assert_eq!(viewer.opened(), vec![Upid::new(UPID)]);
}
