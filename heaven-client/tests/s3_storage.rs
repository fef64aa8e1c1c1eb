//! Integration tests for the S3 storage client.
//!
//! Both SDK clients are pointed at a wiremock server: S3 in path-style
//! addressing, Elastic Beanstalk for storage-location provisioning.

use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use heaven_client::{ClientError, S3Storage, StorageClient};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn storage(server: &MockServer) -> S3Storage {
    let credentials = Credentials::new("AKIAEXAMPLE", "secret", None, None, "tests");

    let s3 = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials.clone())
        .endpoint_url(server.uri())
        .force_path_style(true)
        .retry_config(RetryConfig::disabled())
        .build();

    let beanstalk = aws_sdk_elasticbeanstalk::Config::builder()
        .behavior_version(aws_sdk_elasticbeanstalk::config::BehaviorVersion::latest())
        .region(aws_sdk_elasticbeanstalk::config::Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(server.uri())
        .retry_config(aws_sdk_elasticbeanstalk::config::retry::RetryConfig::disabled())
        .build();

    S3Storage::new(
        aws_sdk_s3::Client::from_conf(s3),
        aws_sdk_elasticbeanstalk::Client::from_conf(beanstalk),
    )
}

fn storage_location_response(bucket: Option<&str>) -> ResponseTemplate {
    let result = match bucket {
        Some(bucket) => format!("<S3Bucket>{}</S3Bucket>", bucket),
        None => String::new(),
    };
    let body = format!(
        r#"<CreateStorageLocationResponse xmlns="http://elasticbeanstalk.amazonaws.com/docs/2010-12-01/">
  <CreateStorageLocationResult>{}</CreateStorageLocationResult>
  <ResponseMetadata><RequestId>req-1</RequestId></ResponseMetadata>
</CreateStorageLocationResponse>"#,
        result
    );
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "text/xml")
        .set_body_string(body)
}

#[tokio::test]
async fn test_bucket_exists() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/myapp-bucket"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let exists = storage(&mock_server)
        .bucket_exists("myapp-bucket")
        .await
        .unwrap();

    assert!(exists);
}

#[tokio::test]
async fn test_missing_bucket_is_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/myapp-bucket"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let exists = storage(&mock_server)
        .bucket_exists("myapp-bucket")
        .await
        .unwrap();

    assert!(!exists);
}

#[tokio::test]
async fn test_forbidden_bucket_is_a_provisioning_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/someone-elses-bucket"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = storage(&mock_server)
        .bucket_exists("someone-elses-bucket")
        .await;

    match result {
        Err(ClientError::StorageProvision { message }) => {
            assert!(message.contains("someone-elses-bucket"));
        }
        other => panic!("expected StorageProvision, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_bucket_returns_provisioned_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("Action=CreateStorageLocation"))
        .respond_with(storage_location_response(Some(
            "elasticbeanstalk-us-east-1-123456789012",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let bucket = storage(&mock_server).create_bucket().await.unwrap();

    assert_eq!(bucket, "elasticbeanstalk-us-east-1-123456789012");
}

#[tokio::test]
async fn test_create_bucket_without_bucket_in_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("Action=CreateStorageLocation"))
        .respond_with(storage_location_response(None))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = storage(&mock_server).create_bucket().await;

    match result {
        Err(ClientError::StorageProvision { message }) => {
            assert!(message.contains("no bucket"));
        }
        other => panic!("expected StorageProvision, got {:?}", other),
    }
}

#[tokio::test]
async fn test_put_object_uploads_to_key() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("heaven-abc123.zip");
    std::fs::write(&archive, b"PK\x03\x04").unwrap();

    Mock::given(method("PUT"))
        .and(path("/myapp-bucket/myapp/heaven-abc123.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    storage(&mock_server)
        .put_object("myapp-bucket", "myapp/heaven-abc123.zip", &archive)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_put_object_rejected_by_storage() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("heaven-abc123.zip");
    std::fs::write(&archive, b"PK\x03\x04").unwrap();

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = storage(&mock_server)
        .put_object("myapp-bucket", "myapp/heaven-abc123.zip", &archive)
        .await;

    assert!(matches!(
        result,
        Err(ClientError::Upload { ref bucket, ref key, .. })
            if bucket == "myapp-bucket" && key == "myapp/heaven-abc123.zip"
    ));
}

#[tokio::test]
async fn test_put_object_unreadable_file_sends_nothing() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = storage(&mock_server)
        .put_object(
            "myapp-bucket",
            "myapp/heaven-abc123.zip",
            &dir.path().join("missing.zip"),
        )
        .await;

    assert!(matches!(result, Err(ClientError::Upload { .. })));
}
