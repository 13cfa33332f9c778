//! Resumable upload against a mock upload endpoint.

mod common;

use std::fs;
use std::path::PathBuf;

use common::{test_auth, FakeRpc};
use notebooklm_sources::traits::{RpcError, RpcMethod};
use notebooklm_sources::{Config, FileUpload, ResumableUploadClient, UploadError};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UPLOAD_PATH: &str = "/upload/notebooklm/v1/sources";
const SESSION_PATH: &str = "/upload/session/abc";

fn config_for(server: &MockServer, chunk_size: usize) -> Config {
    let mut config = Config::default();
    config.service.base_url = server.uri();
    config.service.upload_url = format!("{}{UPLOAD_PATH}", server.uri());
    config.upload.chunk_size = chunk_size;
    config
}

fn write_file(dir: &TempDir, name: &str, len: usize) -> PathBuf {
    let path = dir.path().join(name);
    let data: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
    fs::write(&path, data).unwrap();
    path
}

async fn mount_negotiate(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .and(query_param("authuser", "0"))
        .and(header("x-goog-upload-command", "start"))
        .and(header("x-goog-upload-protocol", "resumable"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-url", format!("{}{SESSION_PATH}", server.uri()).as_str()),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn header_value<'a>(request: &'a wiremock::Request, name: &str) -> &'a str {
    request.headers.get(name).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn test_upload_runs_three_phases_once() {
    let server = MockServer::start().await;
    mount_negotiate(&server).await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let file_path = write_file(&tmp, "report.pdf", 10_000);
    let file = FileUpload::from_path(&file_path).unwrap();

    let rpc = FakeRpc::new().reply(RpcMethod::AddSourceFile, json!([[[["src-1"]]]]));
    let client =
        ResumableUploadClient::new(&config_for(&server, 1024), rpc.clone(), test_auth()).unwrap();

    let session = client.upload("nb-1", &file).await.unwrap();
    assert_eq!(session.source_id, "src-1");
    assert_eq!(session.filename, "report.pdf");
    assert_eq!(session.file_size_bytes, 10_000);
    assert_eq!(session.upload_url, format!("{}{SESSION_PATH}", server.uri()));

    let registrations = rpc.calls_to(RpcMethod::AddSourceFile);
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].source_path, "/notebook/nb-1");
    assert!(registrations[0].allow_null);
    assert_eq!(registrations[0].params[0], json!([["report.pdf"]]));
    assert_eq!(registrations[0].params[1], json!("nb-1"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let negotiate = &requests[0];
    assert_eq!(header_value(negotiate, "x-goog-upload-header-content-length"), "10000");
    assert_eq!(header_value(negotiate, "x-goog-authuser"), "0");
    assert_eq!(header_value(negotiate, "origin"), server.uri());
    assert_eq!(header_value(negotiate, "referer"), format!("{}/", server.uri()));
    assert_eq!(header_value(negotiate, "cookie"), "HSID=hsid-value; SID=sid-value");
    let body: Value = serde_json::from_slice(&negotiate.body).unwrap();
    assert_eq!(
        body,
        json!({"PROJECT_ID": "nb-1", "SOURCE_NAME": "report.pdf", "SOURCE_ID": "src-1"})
    );

    let transfer = &requests[1];
    assert_eq!(transfer.url.path(), SESSION_PATH);
    assert_eq!(header_value(transfer, "x-goog-upload-command"), "upload, finalize");
    assert_eq!(header_value(transfer, "x-goog-upload-offset"), "0");
    assert_eq!(transfer.body.len(), 10_000);
    assert_eq!(transfer.body, fs::read(&file_path).unwrap());
}

#[tokio::test]
async fn test_registration_without_id_stops_before_http() {
    let server = MockServer::start().await;

    let tmp = TempDir::new().unwrap();
    let file = FileUpload::from_path(&write_file(&tmp, "notes.txt", 10)).unwrap();

    let rpc = FakeRpc::new().reply(RpcMethod::AddSourceFile, json!([]));
    let client =
        ResumableUploadClient::new(&config_for(&server, 1024), rpc, test_auth()).unwrap();

    let err = client.upload("nb-1", &file).await.unwrap_err();
    assert!(matches!(err, UploadError::SourceRegistration { cause: None, .. }));
    assert_eq!(err.orphaned_source_id(), None);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_registration_rpc_failure_keeps_cause() {
    let server = MockServer::start().await;

    let tmp = TempDir::new().unwrap();
    let file = FileUpload::from_path(&write_file(&tmp, "notes.txt", 10)).unwrap();

    let rpc = FakeRpc::new().fail(
        RpcMethod::AddSourceFile,
        RpcError::Transport {
            method: RpcMethod::AddSourceFile,
            message: "connection reset".to_string(),
        },
    );
    let client =
        ResumableUploadClient::new(&config_for(&server, 1024), rpc, test_auth()).unwrap();

    match client.upload("nb-1", &file).await.unwrap_err() {
        UploadError::SourceRegistration { cause: Some(cause), .. } => {
            assert!(matches!(cause, RpcError::Transport { .. }));
        }
        other => panic!("expected SourceRegistration, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_session_header_is_session_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let file = FileUpload::from_path(&write_file(&tmp, "notes.txt", 10)).unwrap();

    let rpc = FakeRpc::new().reply(RpcMethod::AddSourceFile, json!(["src-2"]));
    let client =
        ResumableUploadClient::new(&config_for(&server, 1024), rpc, test_auth()).unwrap();

    let err = client.upload("nb-1", &file).await.unwrap_err();
    assert!(matches!(err, UploadError::UploadSession { .. }));
    assert_eq!(err.orphaned_source_id(), Some("src-2"));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_negotiate_rejected_is_session_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let file = FileUpload::from_path(&write_file(&tmp, "notes.txt", 10)).unwrap();

    let rpc = FakeRpc::new().reply(RpcMethod::AddSourceFile, json!(["src-2"]));
    let client =
        ResumableUploadClient::new(&config_for(&server, 1024), rpc, test_auth()).unwrap();

    let err = client.upload("nb-1", &file).await.unwrap_err();
    assert!(matches!(err, UploadError::UploadSession { .. }));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_transfer_failure_reports_orphaned_source() {
    let server = MockServer::start().await;
    mount_negotiate(&server).await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let file = FileUpload::from_path(&write_file(&tmp, "slides.pptx", 300)).unwrap();

    let rpc = FakeRpc::new().reply(RpcMethod::AddSourceFile, json!([["src-3"]]));
    let client =
        ResumableUploadClient::new(&config_for(&server, 64), rpc.clone(), test_auth()).unwrap();

    let err = client.upload("nb-1", &file).await.unwrap_err();
    assert!(matches!(err, UploadError::UploadTransfer { .. }));
    assert_eq!(err.orphaned_source_id(), Some("src-3"));

    // No compensating delete.
    assert!(rpc.calls_to(RpcMethod::DeleteSource).is_empty());
}

#[tokio::test]
async fn test_empty_file_uploads_zero_bytes() {
    let server = MockServer::start().await;
    mount_negotiate(&server).await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let file = FileUpload::from_path(&write_file(&tmp, "empty.txt", 0)).unwrap();

    let rpc = FakeRpc::new().reply(RpcMethod::AddSourceFile, json!("src-4"));
    let client =
        ResumableUploadClient::new(&config_for(&server, 1024), rpc, test_auth()).unwrap();

    let session = client.upload("nb-1", &file).await.unwrap();
    assert_eq!(session.file_size_bytes, 0);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(header_value(&requests[0], "x-goog-upload-header-content-length"), "0");
    assert!(requests[1].body.is_empty());
}
