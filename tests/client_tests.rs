//! End-to-end behavior of the client and flows against a recording fake
//! of the attendance service.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{extract::State, Json, Router};
use face_attendance::{
    capture::{CaptureConfig, CaptureError, CaptureSession, MockSource, PreviewTarget, SessionState},
    client::ApiClient,
    config::ApiConfig,
    flows::{messages, AttendanceFlow, AuthFlow, Dashboard, SignupForm},
    session::{SessionStore, UserIdentity},
    StillImage,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct FakeService {
    requests: Arc<Mutex<Vec<Recorded>>>,
    marked: Arc<Mutex<Vec<String>>>,
}

impl FakeService {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn last(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }
}

fn user(id: u32, name: &str, email: &str) -> Value {
    json!({"id": id, "name": name, "email": email})
}

async fn handle(
    State(service): State<FakeService>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_str = |name| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let authorization = header_str(header::AUTHORIZATION);
    service.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        authorization: authorization.clone(),
        content_type: header_str(header::CONTENT_TYPE),
        body: body.clone(),
    });

    let email = body.get("email").and_then(Value::as_str).unwrap_or("");
    match (method.as_str(), uri.path()) {
        ("POST", "/auth/signup") if email == "taken@b.com" => (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Email already registered"})),
        )
            .into_response(),
        ("POST", "/auth/signup") => {
            Json(json!({"message": "User created", "user": user(3, "Ada", email)})).into_response()
        }
        ("POST", "/auth/login") if email == "crash@b.com" => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
        ("POST", "/auth/login") => {
            let password = body.get("password").and_then(Value::as_str);
            match (email, password) {
                ("a@b.com", Some("pw")) => Json(json!({
                    "access_token": "T1",
                    "token_type": "bearer",
                    "user": user(1, "Ada", "a@b.com"),
                }))
                .into_response(),
                ("g@b.com", Some("pw")) => Json(json!({
                    "access_token": "T2",
                    "token_type": "bearer",
                    "user": user(2, "Grace", "g@b.com"),
                }))
                .into_response(),
                _ => (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"detail": "Invalid email or password"})),
                )
                    .into_response(),
            }
        }
        ("POST", "/auth/login-face") => Json(json!({
            "access_token": "TF",
            "token_type": "bearer",
            "user": user(1, "Ada", "a@b.com"),
        }))
        .into_response(),
        ("POST", "/attendance/mark") => {
            let Some(token) = authorization else {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"detail": "Not authenticated"})),
                )
                    .into_response();
            };
            if token == "Bearer plain" {
                return (StatusCode::OK, "Attendance marked").into_response();
            }
            let mut marked = service.marked.lock().unwrap();
            if marked.contains(&token) {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"detail": "Already marked today"})),
                )
                    .into_response();
            }
            marked.push(token);
            Json(json!({"message": "Attendance marked", "user_name": "Ada"})).into_response()
        }
        ("GET", "/attendance/all") => {
            if authorization.as_deref() == Some("Bearer expired") {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"detail": "Token expired"})),
                )
                    .into_response();
            }
            Json(json!([
                {"id": "c", "user_name": "Grace", "timestamp": "2024-03-02T08:00:00"},
                {"id": "a", "user_name": "Ada", "timestamp": "2024-03-03T09:30:00"},
                {"id": "b", "user_name": "Ada", "timestamp": "2024-03-01T10:15:00"},
            ]))
            .into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not Found"}))).into_response(),
    }
}

async fn spawn_service() -> (String, FakeService) {
    let service = FakeService::default();
    let app = Router::new()
        .fallback(handle)
        .with_state(service.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind failed");
    let addr = listener.local_addr().expect("no local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve failed");
    });

    (format!("http://{}", addr), service)
}

fn client_for(base_url: &str, store: &Arc<SessionStore>) -> ApiClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
    };
    ApiClient::new(&config, Arc::clone(store)).expect("client build failed")
}

fn capture_face(source: &MockSource) -> (StillImage, CaptureSession) {
    let mut session = CaptureSession::new(
        CaptureConfig::with_dimensions(64, 48),
        Arc::new(source.clone()),
        Arc::new(PreviewTarget::new()),
    );
    session.activate().expect("activate failed");
    let still = session.capture().expect("capture failed");
    (still, session)
}

#[tokio::test]
async fn test_no_credential_sends_no_authorization() {
    let (url, service) = spawn_service().await;
    let store = Arc::new(SessionStore::in_memory());
    let client = client_for(&url, &store);

    let records = client.list_attendance().await.unwrap();
    assert_eq!(records.len(), 3);

    let request = service.last();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/attendance/all");
    assert_eq!(request.authorization, None);
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_login_then_mark_carries_bearer() {
    let (url, service) = spawn_service().await;
    let store = Arc::new(SessionStore::in_memory());
    let client = client_for(&url, &store);

    let user = AuthFlow::new(client.clone()).login("a@b.com", "pw").await.unwrap();
    assert_eq!(user.email, "a@b.com");
    assert_eq!(store.token().as_deref(), Some("T1"));
    assert_eq!(service.last().authorization, None);

    let source = MockSource::new();
    let (face, mut session) = capture_face(&source);
    assert_eq!(session.state(), SessionState::Released);
    assert_eq!(source.counters().open_streams(), 0);

    let mut attendance = AttendanceFlow::new(client);
    let confirmation = attendance.mark(&face).await.unwrap();
    assert_eq!(confirmation["message"], "Attendance marked");
    assert!(attendance.is_marked());

    let request = service.last();
    assert_eq!(request.path, "/attendance/mark");
    assert_eq!(request.authorization.as_deref(), Some("Bearer T1"));
    assert_eq!(request.body["face_image"], face.as_data_uri());

    // No second picture without a fresh activation
    assert!(matches!(session.capture(), Err(CaptureError::InvalidState(_))));
}

#[tokio::test]
async fn test_plain_text_confirmation_is_success() {
    let (url, service) = spawn_service().await;
    let store = Arc::new(SessionStore::in_memory());
    store.set_credential(
        "plain",
        UserIdentity {
            id: "1".to_string(),
            name: "Ada".to_string(),
            email: "a@b.com".to_string(),
        },
    );

    let (face, _) = capture_face(&MockSource::new());
    let mut attendance = AttendanceFlow::new(client_for(&url, &store));
    let confirmation = attendance.mark(&face).await.unwrap();

    assert_eq!(confirmation, Value::String("Attendance marked".to_string()));
    assert!(attendance.is_marked());
    assert_eq!(service.last().path, "/attendance/mark");
}

#[tokio::test]
async fn test_already_marked_detail_surfaces_and_session_unchanged() {
    let (url, _service) = spawn_service().await;
    let store = Arc::new(SessionStore::in_memory());
    let client = client_for(&url, &store);
    AuthFlow::new(client.clone()).login("a@b.com", "pw").await.unwrap();
    let before = store.current();

    let source = MockSource::new();
    let mut attendance = AttendanceFlow::new(client.clone());
    let (first, _) = capture_face(&source);
    attendance.mark(&first).await.unwrap();

    let mut retry = AttendanceFlow::new(client);
    let (second, _) = capture_face(&source);
    let err = retry.mark(&second).await.unwrap_err();

    assert_eq!(err.user_message(), "Already marked today");
    assert_eq!(err.request_failure().and_then(|f| f.status), Some(400));
    assert!(!retry.is_marked());
    assert_eq!(store.current(), before);
    assert_eq!(source.counters().open_streams(), 0);
}

#[tokio::test]
async fn test_failed_login_keeps_store_empty() {
    let (url, _service) = spawn_service().await;
    let store = Arc::new(SessionStore::in_memory());
    let flow = AuthFlow::new(client_for(&url, &store));

    let err = flow.login("a@b.com", "wrong").await.unwrap_err();
    assert_eq!(err.user_message(), "Invalid email or password");
    assert!(store.current().is_none());
}

#[tokio::test]
async fn test_failure_without_detail_uses_fallback() {
    let (url, _service) = spawn_service().await;
    let store = Arc::new(SessionStore::in_memory());
    let flow = AuthFlow::new(client_for(&url, &store));

    let err = flow.login("crash@b.com", "pw").await.unwrap_err();
    let failure = err.request_failure().unwrap();
    assert_eq!(failure.status, Some(500));
    assert_eq!(failure.detail, None);
    assert_eq!(err.user_message(), messages::LOGIN_FAILED);
}

#[tokio::test]
async fn test_unreachable_service_has_no_status() {
    // Bind and drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = Arc::new(SessionStore::in_memory());
    let dashboard = Dashboard::new(client_for(&format!("http://{}", addr), &store));

    let err = dashboard.load().await.unwrap_err();
    assert_eq!(err.request_failure().and_then(|f| f.status), None);
    assert_eq!(err.user_message(), messages::LIST_FAILED);
}

#[tokio::test]
async fn test_signup_sends_face_and_does_not_sign_in() {
    let (url, service) = spawn_service().await;
    let store = Arc::new(SessionStore::in_memory());
    let flow = AuthFlow::new(client_for(&url, &store));
    let (face, _) = capture_face(&MockSource::new());

    let form = SignupForm {
        name: "Ada".to_string(),
        email: "ada@b.com".to_string(),
        password: "secret1".to_string(),
    };
    flow.signup(&form, Some(&face)).await.unwrap();

    let request = service.last();
    assert_eq!(request.path, "/auth/signup");
    assert_eq!(request.body["name"], "Ada");
    assert_eq!(request.body["email"], "ada@b.com");
    assert_eq!(request.body["password"], "secret1");
    assert!(request.body["face_image"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
    assert!(store.current().is_none());

    let taken = SignupForm {
        email: "taken@b.com".to_string(),
        ..form
    };
    let err = flow.signup(&taken, Some(&face)).await.unwrap_err();
    assert_eq!(err.user_message(), "Email already registered");
}

#[tokio::test]
async fn test_invalid_signup_form_sends_nothing() {
    let (url, service) = spawn_service().await;
    let store = Arc::new(SessionStore::in_memory());
    let flow = AuthFlow::new(client_for(&url, &store));

    let form = SignupForm {
        name: "Ada".to_string(),
        email: "ada@b.com".to_string(),
        password: "12345".to_string(),
    };
    let err = form.validate().unwrap_err();
    assert!(err.user_message().contains("at least 6"));

    let (face, _) = capture_face(&MockSource::new());
    assert!(flow.signup(&form, Some(&face)).await.is_err());
    assert!(flow.login("", "pw").await.is_err());
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn test_face_login_and_relogin_overwrite() {
    let (url, service) = spawn_service().await;
    let store = Arc::new(SessionStore::in_memory());
    let flow = AuthFlow::new(client_for(&url, &store));

    let (face, _) = capture_face(&MockSource::new());
    flow.login_face(&face).await.unwrap();
    assert_eq!(store.token().as_deref(), Some("TF"));
    assert_eq!(service.last().body["face_image"], face.as_data_uri());

    flow.login("g@b.com", "pw").await.unwrap();
    let current = store.current().unwrap();
    assert_eq!(current.token, "T2");
    assert_eq!(
        current.user,
        Some(UserIdentity {
            id: "2".to_string(),
            name: "Grace".to_string(),
            email: "g@b.com".to_string(),
        })
    );

    // Requests after re-login carry the new token only
    Dashboard::new(client_for(&url, &store)).load().await.unwrap();
    assert_eq!(service.last().authorization.as_deref(), Some("Bearer T2"));

    flow.logout();
    Dashboard::new(client_for(&url, &store)).load().await.unwrap();
    assert_eq!(service.last().authorization, None);
}

#[tokio::test]
async fn test_records_keep_server_order() {
    let (url, _service) = spawn_service().await;
    let store = Arc::new(SessionStore::in_memory());
    let summary = Dashboard::new(client_for(&url, &store)).load().await.unwrap();

    let ids: Vec<_> = summary.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["c", "a", "b"]);
    assert_eq!(summary.unique_users(), 2);
}

#[tokio::test]
async fn test_unauthorized_does_not_clear_session() {
    let (url, _service) = spawn_service().await;
    let store = Arc::new(SessionStore::in_memory());
    store.set_credential(
        "expired",
        UserIdentity {
            id: "1".to_string(),
            name: "Ada".to_string(),
            email: "a@b.com".to_string(),
        },
    );

    let err = Dashboard::new(client_for(&url, &store)).load().await.unwrap_err();
    assert!(err.request_failure().unwrap().is_unauthorized());
    assert_eq!(err.user_message(), "Token expired");
    assert_eq!(store.token().as_deref(), Some("expired"));
}

#[tokio::test]
async fn test_raw_request_primitive() {
    let (url, service) = spawn_service().await;
    let store = Arc::new(SessionStore::in_memory());
    let client = client_for(&url, &store);

    let err = client
        .request(Method::GET, "/does-not-exist", None::<&Value>)
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(404));
    assert_eq!(err.detail.as_deref(), Some("Not Found"));

    assert_eq!(service.requests().len(), 1);
}
