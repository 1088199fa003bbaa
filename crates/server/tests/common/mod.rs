//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling comprehensive E2E testing
//! without a signing service, object storage, or a payment provider.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use cratedig_core::testing::{MockCredentialSigner, MockObjectUploader, MockPaymentProcessor};
use cratedig_core::{
    create_audit_system, AuditStore, AuthConfig, AuthMethod, Config, CredentialSigner,
    CreatorStore, DatabaseConfig, NoneAuthenticator, ObjectUploader, PackPublisher, PackStore,
    PaymentProcessor, PaymentsConfig, ServerConfig, SqliteAuditStore, SqliteCatalog,
    StorageConfig,
};

/// Re-export fixtures for test convenience
pub use cratedig_core::testing::fixtures;

/// Boundary used by every multipart body built in tests.
const BOUNDARY: &str = "cratedig-test-boundary";

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - Upload credential issuance (MockCredentialSigner)
/// - Object storage puts (MockObjectUploader)
/// - Commerce provisioning (MockPaymentProcessor)
///
/// Requests that act as a creator carry the forwarded identity header,
/// which the `none` authenticator trusts.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_publish() {
///     let fixture = TestFixture::new().await;
///     fixture.onboard_creator("creator-1", "beatsmith").await;
///
///     let response = fixture
///         .post_multipart_as("creator-1", "/api/v1/packs", publish_form("Night Drums", "9.99", 2))
///         .await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock signer - inspect issued credentials or fail issuance
    pub signer: Arc<MockCredentialSigner>,
    /// Mock uploader - inspect recorded puts, reject individual keys
    pub uploader: Arc<MockObjectUploader>,
    /// Mock payment processor - prime commerce failures
    pub payments: Arc<MockPaymentProcessor>,
    /// Catalog handle for direct state assertions
    pub catalog: Arc<SqliteCatalog>,
    /// Temporary directory holding the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        // Create mocks
        let signer = Arc::new(MockCredentialSigner::new());
        let uploader = Arc::new(MockObjectUploader::new());
        let payments = Arc::new(MockPaymentProcessor::new());

        // Create config
        let config = Config {
            auth: AuthConfig {
                method: AuthMethod::None,
                api_key: None,
            },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            storage: StorageConfig {
                signer_url: "http://signer.test".to_string(),
                public_bucket: "public-assets".to_string(),
                private_bucket: "private-archives".to_string(),
                public_base_url: "https://cdn.test".to_string(),
                timeout_secs: 5,
            },
            payments: PaymentsConfig {
                api_base: "https://api.stripe.test".to_string(),
                secret_key: "sk_test_123".to_string(),
                application_fee_percent: 10.0,
                timeout_secs: 5,
            },
        };

        // Create stores on a shared database file
        let audit_store: Arc<dyn AuditStore> = Arc::new(
            SqliteAuditStore::new(&db_path).expect("Failed to create audit store"),
        );
        let catalog = Arc::new(
            SqliteCatalog::new(&db_path).expect("Failed to create catalog"),
        );

        // Create audit system
        let (audit_handle, audit_writer) = create_audit_system(Arc::clone(&audit_store), 100);

        // Spawn audit writer
        tokio::spawn(audit_writer.run());

        // Create the publication pipeline with mocks
        let publisher = Arc::new(
            PackPublisher::new(
                Arc::clone(&signer) as Arc<dyn CredentialSigner>,
                Arc::clone(&uploader) as Arc<dyn ObjectUploader>,
                Arc::clone(&payments) as Arc<dyn PaymentProcessor>,
                Arc::clone(&catalog) as Arc<dyn CreatorStore>,
                Arc::clone(&catalog) as Arc<dyn PackStore>,
                config.storage.public_base_url.clone(),
            )
            .with_audit(audit_handle.clone()),
        );

        // Create app state
        let state = Arc::new(cratedig_server::state::AppState::new(
            config,
            Arc::new(NoneAuthenticator::new()),
            audit_handle,
            audit_store,
            Arc::clone(&catalog) as Arc<dyn CreatorStore>,
            Arc::clone(&catalog) as Arc<dyn PackStore>,
            publisher,
        ));

        // Create router
        let router = cratedig_server::api::create_router(state);

        Self {
            router,
            signer,
            uploader,
            payments,
            catalog,
            temp_dir,
        }
    }

    /// Register a creator and complete payment onboarding through the API.
    ///
    /// After this the creator holds a connected account and can publish.
    pub async fn onboard_creator(&self, creator_id: &str, username: &str) {
        let response = self
            .post_as(creator_id, "/api/v1/creators", json!({ "username": username }))
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Creator registration failed: {}",
            response.body
        );

        let response = self
            .post_as(
                creator_id,
                "/api/v1/onboarding",
                json!({
                    "refresh_url": "https://app.test/onboarding/refresh",
                    "return_url": "https://app.test/onboarding/return"
                }),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Onboarding failed: {}",
            response.body
        );
    }

    /// Send a GET request without a creator identity.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a GET request as the given creator.
    pub async fn get_as(&self, creator_id: &str, path: &str) -> TestResponse {
        self.request("GET", path, Some(creator_id), None).await
    }

    /// Send a POST request with JSON body, without a creator identity.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, None, Some(body)).await
    }

    /// Send a POST request with JSON body as the given creator.
    pub async fn post_as(&self, creator_id: &str, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(creator_id), Some(body)).await
    }

    /// Send a PUT request with JSON body as the given creator.
    pub async fn put_as(&self, creator_id: &str, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(creator_id), Some(body)).await
    }

    /// Send a DELETE request as the given creator.
    pub async fn delete_as(&self, creator_id: &str, path: &str) -> TestResponse {
        self.request("DELETE", path, Some(creator_id), None).await
    }

    /// Send a multipart POST request without a creator identity.
    pub async fn post_multipart(&self, path: &str, form: MultipartForm) -> TestResponse {
        self.multipart_request(path, None, form).await
    }

    /// Send a multipart POST request as the given creator.
    pub async fn post_multipart_as(
        &self,
        creator_id: &str,
        path: &str,
        form: MultipartForm,
    ) -> TestResponse {
        self.multipart_request(path, Some(creator_id), form).await
    }

    /// Poll the audit API until at least `min_count` events of the given
    /// type are visible, then return them. The audit writer runs on its own
    /// task, so records land shortly after the triggering request returns.
    pub async fn wait_for_audit_events(&self, event_type: &str, min_count: usize) -> Vec<Value> {
        for _ in 0..40 {
            let response = self
                .get(&format!("/api/v1/audit?event_type={}", event_type))
                .await;
            if let Some(events) = response.body["events"].as_array() {
                if events.len() >= min_count {
                    return events.clone();
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        }
        panic!(
            "Timed out waiting for {} audit event(s) of type {}",
            min_count, event_type
        );
    }

    /// Send a GET request and return the raw body text (for /metrics).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a multipart request to the test server.
    async fn multipart_request(
        &self,
        path: &str,
        creator_id: Option<&str>,
        form: MultipartForm,
    ) -> TestResponse {
        let mut request_builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", MultipartForm::content_type());

        if let Some(creator_id) = creator_id {
            request_builder = request_builder.header("x-creator-id", creator_id);
        }

        let request = request_builder.body(Body::from(form.finish())).unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        creator_id: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(creator_id) = creator_id {
            request_builder = request_builder.header("x-creator-id", creator_id);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Builder for multipart/form-data request bodies.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    /// Append a text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    /// Append a file field with a filename and content type.
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }

    fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }
}

/// A complete publish form with cover, archive, and preview samples.
pub fn publish_form(title: &str, price: &str, sample_count: usize) -> MultipartForm {
    let cover = fixtures::cover_file();
    let archive = fixtures::archive_file();

    let mut form = MultipartForm::new()
        .text("title", title)
        .text("description", "Dusty drum breaks and one-shots.")
        .text("price", price)
        .file("cover", &cover.file_name, &cover.content_type, &cover.bytes)
        .file(
            "archive",
            &archive.file_name,
            &archive.content_type,
            &archive.bytes,
        );

    for sample in fixtures::sample_files(sample_count) {
        form = form.file(
            "samples",
            &sample.file_name,
            &sample.content_type,
            &sample.bytes,
        );
    }

    form
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
