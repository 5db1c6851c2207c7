use gatehouse_directory::CacheBackend;
use gatehouse_server::{AppConfig, build_app, build_state};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.secret = "integration-test-secret".into();
    cfg
}

async fn start_server(cfg: AppConfig) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let state = build_state(&cfg, CacheBackend::new_local()).expect("build state");
    let app = build_app(&cfg, state);

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = rx.await;
        })
        .await;
    });

    (format!("http://{addr}"), tx, server)
}

async fn register(
    client: &reqwest::Client,
    base: &str,
    username: &str,
    email: &str,
    role: Option<&str>,
) -> (reqwest::StatusCode, Value) {
    let mut body = json!({
        "username": username,
        "email": email,
        "password": "secret1",
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    let resp = client
        .post(format!("{base}/api/v1/auth/register"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn health_and_fallback() {
    let (base, shutdown_tx, handle) = start_server(test_config()).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let resp = client
        .get(format!("{base}/api/v1/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "NotFoundError");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let (base, shutdown_tx, handle) = start_server(test_config()).await;
    let client = reqwest::Client::new();

    let resp = client
        .request(
            reqwest::Method::OPTIONS,
            format!("{base}/api/v1/auth/login"),
        )
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "authorization,content-type")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let headers = resp.headers();
    assert_eq!(
        headers["access-control-allow-origin"].to_str().unwrap(),
        "*"
    );
    assert!(headers.contains_key("access-control-allow-methods"));

    // Plain responses carry the allow-origin header too.
    let resp = client
        .get(format!("{base}/health"))
        .header("origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();
    assert!(resp.headers().contains_key("access-control-allow-origin"));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn register_login_me_flow() {
    let (base, shutdown_tx, handle) = start_server(test_config()).await;
    let client = reqwest::Client::new();

    let (status, body) = register(&client, &base, "alice", "Alice@Example.com", None).await;
    assert_eq!(status, 201);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"]["createdAt"].is_string());
    assert!(body["user"].get("passwordHash").is_none());
    let register_token = body["token"].as_str().unwrap().to_string();
    assert!(!register_token.is_empty());

    // Login with the original casing; email matching is case-insensitive.
    let resp = client
        .post(format!("{base}/api/v1/auth/login"))
        .json(&json!({"email": "ALICE@example.COM", "password": "secret1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Login successful");
    let token = body["token"].as_str().unwrap().to_string();

    let resp = client
        .get(format!("{base}/api/v1/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("passwordHash").is_none());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn register_validation_errors_accumulate() {
    let (base, shutdown_tx, handle) = start_server(test_config()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/v1/auth/register"))
        .json(&json!({"username": "ab", "email": "nope", "password": "123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|e| e["location"] == "body"));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn duplicate_registration_rejected() {
    let (base, shutdown_tx, handle) = start_server(test_config()).await;
    let client = reqwest::Client::new();

    let (status, _) = register(&client, &base, "alice", "a@x.com", None).await;
    assert_eq!(status, 201);

    let (status, body) = register(&client, &base, "bob", "A@X.com", None).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "DuplicateEmailError");

    let (status, body) = register(&client, &base, "alice", "b@x.com", None).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "DuplicateUsernameError");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let (base, shutdown_tx, handle) = start_server(test_config()).await;
    let client = reqwest::Client::new();

    let (status, _) = register(&client, &base, "alice", "a@x.com", None).await;
    assert_eq!(status, 201);

    for payload in [
        json!({"email": "a@x.com", "password": "wrong-password"}),
        json!({"email": "ghost@x.com", "password": "secret1"}),
    ] {
        let resp = client
            .post(format!("{base}/api/v1/auth/login"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "InvalidCredentialsError");
    }

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn token_rejections() {
    let (base, shutdown_tx, handle) = start_server(test_config()).await;
    let client = reqwest::Client::new();

    // No token at all
    let resp = client
        .get(format!("{base}/api/v1/profile"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "MissingTokenError");

    // Garbage token
    let resp = client
        .get(format!("{base}/api/v1/profile"))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "InvalidTokenError");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn user_listing_is_admin_only() {
    let (base, shutdown_tx, handle) = start_server(test_config()).await;
    let client = reqwest::Client::new();

    let (_, body) = register(&client, &base, "alice", "a@x.com", None).await;
    let user_token = body["token"].as_str().unwrap().to_string();
    let (_, body) = register(&client, &base, "root", "root@x.com", Some("admin")).await;
    let admin_token = body["token"].as_str().unwrap().to_string();

    let resp = client
        .get(format!("{base}/api/v1/users"))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "ForbiddenError");

    let resp = client
        .get(format!("{base}/api/v1/users"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    // Creation order, no hashes
    assert_eq!(users[0]["username"], "alice");
    assert_eq!(users[1]["username"], "root");
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn profile_and_dashboard() {
    let (base, shutdown_tx, handle) = start_server(test_config()).await;
    let client = reqwest::Client::new();

    let (_, body) = register(&client, &base, "alice", "a@x.com", None).await;
    let token = body["token"].as_str().unwrap().to_string();

    let resp = client
        .get(format!("{base}/api/v1/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Profile data");
    assert_eq!(body["user"]["email"], "a@x.com");

    let resp = client
        .get(format!("{base}/api/v1/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Welcome to your dashboard");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(body["data"]["stats"]["serverTime"].is_string());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn unconfigured_secret_is_a_server_error() {
    let mut cfg = test_config();
    cfg.auth.secret = String::new();
    let (base, shutdown_tx, handle) = start_server(cfg).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/v1/auth/register"))
        .json(&json!({"username": "alice", "email": "a@x.com", "password": "secret1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "ConfigurationError");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
