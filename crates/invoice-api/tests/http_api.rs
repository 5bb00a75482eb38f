//! End-to-end tests driving the real router with in-process collaborators.

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use invoice_api::middleware::{AuthGate, LoginRateLimiter};
use invoice_api::{build_router, AppState, HttpSettings};
use invoice_core::domain::User;
use invoice_core::error::DomainError;
use invoice_core::ports::{Mailer, OutgoingMail, PdfRenderer};
use invoice_core::repositories::UserRepository;
use invoice_core::services::{AuthService, AuthSettings, DocumentService};
use invoice_infrastructure::InMemoryUserRepository;
use invoice_security::{JwtService, PasswordService, ResetTokenHasher};

const SECRET: &str = "e2e-secret";

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    fn last_reset_token(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let mail = sent.last().expect("a mail was sent");
        let marker = "reset-password?token=";
        let start = mail.html_body.find(marker).expect("reset link") + marker.len();
        mail.html_body[start..]
            .chars()
            .take_while(|c| c.is_ascii_hexdigit())
            .collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

/// Echoes a fake PDF, or fails when the HTML asks it to.
struct StubRenderer;

#[async_trait]
impl PdfRenderer for StubRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, DomainError> {
        if html.contains("fail-render") {
            return Err(DomainError::RenderError("browser crashed".to_string()));
        }
        Ok(format!("%PDF-1.7\n{}", html).into_bytes())
    }
}

/// Store whose next token write first lands a queued password reset, the
/// interleaving of a reset finishing while a forgot-password is in flight.
struct InterleavedResetRepository {
    inner: Arc<InMemoryUserRepository>,
    queued_reset: Mutex<Option<(String, String)>>,
}

impl InterleavedResetRepository {
    fn queue_reset(&self, token_hash: String, new_password_hash: String) {
        *self.queued_reset.lock().unwrap() = Some((token_hash, new_password_hash));
    }
}

#[async_trait]
impl UserRepository for InterleavedResetRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.inner.find_by_email(email).await
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        self.inner.create(user).await
    }

    async fn set_reset_token(
        &self,
        id: &Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let queued = self.queued_reset.lock().unwrap().take();
        if let Some((pending_hash, new_password_hash)) = queued {
            self.inner
                .consume_reset_token(&pending_hash, &new_password_hash, Utc::now())
                .await?
                .expect("queued reset token is live");
        }
        self.inner.set_reset_token(id, token_hash, expires_at).await
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError> {
        self.inner
            .consume_reset_token(token_hash, new_password_hash, now)
            .await
    }
}

struct TestApp {
    router: Router,
    repo: Arc<InMemoryUserRepository>,
    mailer: Arc<RecordingMailer>,
    tokens: Arc<JwtService>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_reset_ttl(Duration::minutes(15))
    }

    fn with_reset_ttl(reset_token_ttl: Duration) -> Self {
        let repo = Arc::new(InMemoryUserRepository::new());
        Self::with_store(reset_token_ttl, repo.clone(), repo)
    }

    /// `store` backs the service; `repo` is the same data, for assertions.
    fn with_store(
        reset_token_ttl: Duration,
        repo: Arc<InMemoryUserRepository>,
        store: Arc<dyn UserRepository>,
    ) -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let tokens = Arc::new(JwtService::new(SECRET, Duration::hours(1)));

        let auth_service = AuthService::new(
            store,
            mailer.clone(),
            tokens.clone(),
            ResetTokenHasher::new(SECRET).unwrap(),
            AuthSettings {
                reset_token_ttl,
                frontend_url: "https://client.example.com".to_string(),
            },
        );

        let state = AppState {
            auth_service: Arc::new(auth_service),
            document_service: Arc::new(DocumentService::new(Arc::new(StubRenderer))),
            auth_gate: Arc::new(AuthGate::new(tokens.clone())),
            login_limiter: Arc::new(LoginRateLimiter::new(10, StdDuration::from_secs(15 * 60))),
        };
        let settings = HttpSettings {
            allowed_origins: vec!["https://client.example.com".to_string()],
            body_limit_bytes: 1024 * 1024,
        };

        Self {
            router: build_router(state, &settings),
            repo,
            mailer,
            tokens,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, bytes) = self.send(json_request(uri, body, None)).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.post_json(
            "/api/auth/register",
            json!({ "name": name, "email": email, "password": password }),
        )
        .await
    }

    async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post_json(
            "/api/auth/login",
            json!({ "email": email, "password": password }),
        )
        .await
    }
}

fn json_request(uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn login_from(ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            json!({ "email": "nobody@x.com", "password": "whatever" }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_register_twice_conflicts() {
    let app = TestApp::new();

    let (status, body) = app.register("Alice", "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");

    let (status, body) = app.register("Alice Again", "A@X.com", "secret2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");

    let stored = app.repo.find_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(stored.name, "Alice");
}

#[tokio::test]
async fn test_register_reports_every_violation() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/auth/register", json!({ "email": "bad", "password": "123" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "name", "password"]);
}

#[tokio::test]
async fn test_login_flow() {
    let app = TestApp::new();
    app.register("Alice", "a@x.com", "secret1").await;

    let (status, body) = app.login("a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Alice");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(body["user"].get("password_hash").is_none());

    let claims = app
        .tokens
        .verify(body["token"].as_str().unwrap())
        .expect("login token verifies");
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.id, body["user"]["id"].as_str().unwrap());

    let (status, body) = app.login("a@x.com", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = app.login("ghost@x.com", "secret1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new();
    app.register("Alice", "a@x.com", "secret1").await;

    let (status, body) = app
        .post_json("/api/auth/forgot-password", json!({ "email": "a@x.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset email sent!");

    let token = app.mailer.last_reset_token();
    assert_eq!(token.len(), 64);
    let pending = app
        .repo
        .find_by_email("a@x.com")
        .await
        .unwrap()
        .unwrap()
        .reset_token
        .expect("reset token stored");
    assert_ne!(pending.token_hash, token);
    assert!(pending.expires_at > Utc::now());

    let (status, body) = app
        .post_json(
            "/api/auth/reset-password",
            json!({ "token": token, "password": "newpass1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset successfully");

    let stored = app.repo.find_by_email("a@x.com").await.unwrap().unwrap();
    assert!(stored.reset_token.is_none());

    let (status, _) = app.login("a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.login("a@x.com", "newpass1").await;
    assert_eq!(status, StatusCode::OK);

    // Single use.
    let (status, body) = app
        .post_json(
            "/api/auth/reset-password",
            json!({ "token": token, "password": "another1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_forgot_password_keeps_password_reset_in_between() {
    let inner = Arc::new(InMemoryUserRepository::new());
    let store = Arc::new(InterleavedResetRepository {
        inner: inner.clone(),
        queued_reset: Mutex::new(None),
    });
    let app = TestApp::with_store(Duration::minutes(15), inner, store.clone());
    app.register("Alice", "a@x.com", "secret1").await;

    app.post_json("/api/auth/forgot-password", json!({ "email": "a@x.com" }))
        .await;
    let first = app.mailer.last_reset_token();

    // The reset with the first token completes after the second request has
    // loaded the user but before it stores its own token.
    store.queue_reset(
        ResetTokenHasher::new(SECRET).unwrap().hash(&first),
        PasswordService::hash("newpass1").unwrap(),
    );
    let (status, _) = app
        .post_json("/api/auth/forgot-password", json!({ "email": "a@x.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.login("a@x.com", "newpass1").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.login("a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let stored = app.repo.find_by_email("a@x.com").await.unwrap().unwrap();
    assert!(stored.reset_token.is_some());
}

#[tokio::test]
async fn test_expired_reset_token_rejected() {
    let app = TestApp::with_reset_ttl(Duration::seconds(-1));
    app.register("Alice", "a@x.com", "secret1").await;
    app.post_json("/api/auth/forgot-password", json!({ "email": "a@x.com" }))
        .await;
    let token = app.mailer.last_reset_token();

    let (status, body) = app
        .post_json(
            "/api/auth/reset-password",
            json!({ "token": token, "password": "newpass1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired token");

    let (status, _) = app.login("a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_and_reset_validation() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/auth/forgot-password", json!({ "email": "nope" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "Invalid email format");

    let (status, body) = app
        .post_json("/api/auth/forgot-password", json!({ "email": "ghost@x.com" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (status, body) = app
        .post_json(
            "/api/auth/reset-password",
            json!({ "token": "", "password": "123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_generate_pdf_requires_token() {
    let app = TestApp::new();
    let html = json!({ "htmlContent": "<h1>Invoice</h1>" });

    let (status, bytes) = app
        .send(json_request("/api/invoices/generate-pdf", html.clone(), None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Access denied. No token provided.");

    let (status, bytes) = app
        .send(json_request(
            "/api/invoices/generate-pdf",
            html,
            Some("garbage.token.value"),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Invalid token.");
}

#[tokio::test]
async fn test_generate_pdf_with_session() {
    let app = TestApp::new();
    app.register("Alice", "a@x.com", "secret1").await;
    let (_, login) = app.login("a@x.com", "secret1").await;
    let token = login["token"].as_str().unwrap().to_string();

    let (status, bytes) = app
        .send(json_request(
            "/api/invoices/generate-pdf",
            json!({}),
            Some(&token),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "HTML content is required.");

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "/api/invoices/generate-pdf",
            json!({ "htmlContent": "<h1>Invoice #42</h1>" }),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=invoice.pdf"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF"));

    let (status, bytes) = app
        .send(json_request(
            "/api/invoices/generate-pdf",
            json!({ "htmlContent": "<p>fail-render</p>" }),
            Some(&token),
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Failed to generate PDF.");
    assert_eq!(body["error"], "browser crashed");
}

#[tokio::test]
async fn test_login_rate_limited_per_caller() {
    let app = TestApp::new();

    for _ in 0..10 {
        let (status, _) = app.send(login_from("198.51.100.9")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (status, bytes) = app.send(login_from("198.51.100.9")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body["message"],
        "Too many login attempts, please try again later."
    );

    let (status, _) = app.send(login_from("198.51.100.10")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_routes_and_fallback() {
    let app = TestApp::new();
    let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

    let (status, bytes) = app.send(get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"Server is running...");

    let (status, bytes) = app.send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");

    let (status, bytes) = app.send(get("/api/auth/test")).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Auth route is working!");

    let (status, bytes) = app.send(get("/api/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Not Found");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let (status, bytes) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].is_string());
}
