//! Integration tests using wiremock to simulate HTTP servers.

use api_manager::date::backend_date;
use api_manager::{ApiClient, CredentialStore, Error, MemoryCredentialStore, StatusCategory, TOKEN_KEY};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Employees {
    data: Vec<Employee>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Employee {
    id: u32,
    employee_name: String,
    employee_salary: f64,
    employee_age: u32,
    profile_image: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct NewEmployee {
    name: String,
    salary: String,
    age: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Created {
    status: String,
    data: NewEmployee,
}

fn employees() -> Employees {
    Employees {
        data: vec![Employee {
            id: 1,
            employee_name: "Tiger Nixon".to_string(),
            employee_salary: 320800.0,
            employee_age: 61,
            profile_image: String::new(),
        }],
    }
}

fn new_employee() -> NewEmployee {
    NewEmployee {
        name: "test".to_string(),
        salary: "123".to_string(),
        age: "23".to_string(),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn client_for(server: &MockServer) -> ApiClient {
    init_tracing();
    let client = ApiClient::new(server.uri(), "TestService").unwrap();
    client.ready().await;
    client
}

#[tokio::test]
async fn test_successful_get_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/employees"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(employees()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let response: Employees = client.get("/api/v1/employees").await.unwrap();

    assert_eq!(response, employees());
    assert!(!response.data[0].employee_name.is_empty());
}

#[tokio::test]
async fn test_get_without_token_sends_no_authorization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/employees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(employees()))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let _: Employees = client.get("/api/v1/employees").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_successful_post_request() {
    let mock_server = MockServer::start().await;

    let response_data = Created {
        status: "success".to_string(),
        data: new_employee(),
    };

    Mock::given(method("POST"))
        .and(path("/api/v1/create"))
        .and(header("content-type", "application/json"))
        .and(body_json(new_employee()))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_data))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let response: Created = client
        .post("/api/v1/create", &new_employee())
        .await
        .unwrap();

    assert_eq!(response.status, "success");
    assert_eq!(response, response_data);
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/logout"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    client.set_token("abc123");

    let _: serde_json::Value = client.post_empty("/api/v1/logout").await.unwrap();
}

#[tokio::test]
async fn test_hydrated_token_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .and(header("authorization", "Bearer from-keychain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store
        .set("TestService", TOKEN_KEY, b"from-keychain")
        .await
        .unwrap();

    let client = ApiClient::builder()
        .base_url(mock_server.uri())
        .service_name("TestService")
        .credential_store(store)
        .build()
        .unwrap();
    client.ready().await;

    let _: serde_json::Value = client.get("/api/v1/me").await.unwrap();
}

#[tokio::test]
async fn test_http_error_4xx() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/employees"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let result = client.get::<Employees>("/api/v1/employees").await;

    match result {
        Err(Error::InvalidStatusCode {
            code,
            category,
            raw_response,
        }) => {
            assert_eq!(code, 404);
            assert_eq!(category, StatusCategory::ClientError(404));
            assert_eq!(raw_response, "Not found");
        }
        _ => panic!("Expected InvalidStatusCode, got {:?}", result),
    }
}

#[tokio::test]
async fn test_http_error_5xx() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/employees"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client
        .get::<Employees>("/api/v1/employees")
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.category(), Some(StatusCategory::ServerError(500)));
    assert_eq!(err.describe(), "Invalid response code 500: ServerError(500).");
}

#[tokio::test]
async fn test_201_and_204_are_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/create"))
        .respond_with(ResponseTemplate::new(201).set_body_json(new_employee()))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/delete/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    let created = client
        .post::<_, NewEmployee>("/api/v1/create", &new_employee())
        .await;
    assert!(matches!(
        created,
        Err(Error::InvalidStatusCode {
            code: 201,
            category: StatusCategory::Success(201),
            ..
        })
    ));

    let deleted = client.delete::<serde_json::Value>("/api/v1/delete/1").await;
    assert!(matches!(
        deleted,
        Err(Error::InvalidStatusCode {
            code: 204,
            category: StatusCategory::Success(204),
            ..
        })
    ));
}

#[tokio::test]
async fn test_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/employees"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let result = client.get::<Employees>("/api/v1/employees").await;

    match result {
        Err(Error::DecodeFailure {
            raw_response,
            serde_error,
        }) => {
            assert_eq!(raw_response, "invalid json");
            assert!(serde_error.contains("expected"));
        }
        _ => panic!("Expected DecodeFailure, got {:?}", result),
    }
}

#[tokio::test]
async fn test_upload_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/upload"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"uploaded".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    client.set_token("abc123");

    let response = client
        .upload(
            "/api/v1/upload",
            b"%PDF-1.7".to_vec(),
            "report.pdf",
            "application/pdf",
            None,
        )
        .await
        .unwrap();
    assert_eq!(response, b"uploaded");

    let requests = mock_server.received_requests().await.unwrap();
    let request = &requests[0];
    let content_type = request
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();

    let expected = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"report.pdf\"\r\n\
         Content-Type: application/pdf\r\n\
         \r\n\
         %PDF-1.7\r\n\
         --{boundary}--\r\n"
    );
    assert_eq!(String::from_utf8_lossy(&request.body), expected);
}

#[tokio::test]
async fn test_upload_custom_field_and_fresh_boundary() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    for _ in 0..2 {
        let response = client
            .upload("/api/v1/upload", b"a".to_vec(), "a.txt", "text/plain", Some("attachment"))
            .await
            .unwrap();
        assert!(response.is_empty());
    }

    let requests = mock_server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(body.contains("name=\"attachment\"; filename=\"a.txt\""));
    assert_ne!(
        requests[0].headers.get("content-type"),
        requests[1].headers.get("content-type")
    );
}

#[tokio::test]
async fn test_dates_use_backend_format() {
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Shift {
        #[serde(with = "backend_date")]
        starts_at: DateTime<Utc>,
    }

    let mock_server = MockServer::start().await;
    let shift = Shift {
        starts_at: Utc.with_ymd_and_hms(2024, 3, 22, 8, 30, 0).unwrap(),
    };

    Mock::given(method("PUT"))
        .and(path("/api/v1/shift"))
        .and(body_json(serde_json::json!({ "starts_at": "2024-03-22T08:30:00.000+0000" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"starts_at":"2024-03-22T10:30:00.000+0200"}"#, "application/json"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let echoed: Shift = client.put("/api/v1/shift", &shift).await.unwrap();
    assert_eq!(echoed, shift);
}

#[tokio::test]
async fn test_invalid_url() {
    let client = ApiClient::new("not a url", "TestService").unwrap();
    let result = client.get::<Employees>("/api/v1/employees").await;

    match result {
        Err(e @ Error::InvalidUrl(_)) => assert_eq!(e.to_string(), "Invalid URL."),
        _ => panic!("Expected InvalidUrl, got {:?}", result),
    }
}

#[tokio::test]
async fn test_connection_refused_is_invalid_response() {
    // Nothing listens on port 1.
    let client = ApiClient::new("http://127.0.0.1:1", "TestService").unwrap();
    let result = client.get::<Employees>("/api/v1/employees").await;
    assert!(matches!(result, Err(Error::InvalidResponse)));
}

#[tokio::test]
async fn test_timeout_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = ApiClient::builder()
        .base_url(mock_server.uri())
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let start = std::time::Instant::now();
    let result = client.get::<serde_json::Value>("/slow").await;

    assert!(matches!(result, Err(Error::InvalidResponse)));
    assert!(start.elapsed() < Duration::from_secs(2));
}
