//! Authenticated HTTP client for the attendance service.

use super::models::{
    AttendanceRecord, FaceImageRequest, LoginRequest, LoginResponse, SignupRequest,
};
use super::RequestFailure;
use crate::capture::StillImage;
use crate::config::ApiConfig;
use crate::session::SessionStore;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Sends every request to the service with the current session's bearer
/// token attached.
///
/// Each call is exactly one round trip: no retries, no caching. A 401 is
/// reported like any other failure; the session is left untouched.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Builds a client for `config.base_url`.
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Service root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session whose token is attached to requests.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Sends `method path` with an optional JSON body and returns the
    /// decoded JSON response.
    ///
    /// A successful response with an empty body yields `Null`. A successful
    /// non-JSON body is passed through as a JSON string.
    pub async fn request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, RequestFailure>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        let authenticated = match self.session.current() {
            Some(credential) => {
                request = request.header(AUTHORIZATION, credential.bearer());
                true
            }
            None => false,
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, authenticated, "Sending request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Request failed without response");
            RequestFailure::transport(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(RequestFailure::transport)?;
        let payload = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice::<Value>(&bytes).ok()
        };

        if !status.is_success() {
            let failure = RequestFailure::from_response(status.as_u16(), payload.as_ref());
            tracing::warn!(
                %method,
                path,
                status = status.as_u16(),
                detail = failure.detail.as_deref().unwrap_or(""),
                "Request rejected"
            );
            return Err(failure);
        }

        tracing::debug!(%method, path, status = status.as_u16(), "Request succeeded");
        Ok(match payload {
            Some(value) => value,
            None if bytes.is_empty() => Value::Null,
            None => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        })
    }

    async fn call<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, RequestFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.request(method, path, body).await?;
        serde_json::from_value(value)
            .map_err(|e| RequestFailure::transport(format!("unexpected response shape: {}", e)))
    }

    /// Registers a new user with their face image.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        face_image: &StillImage,
    ) -> Result<Value, RequestFailure> {
        let body = SignupRequest {
            name,
            email,
            password,
            face_image: face_image.as_data_uri(),
        };
        self.request(Method::POST, "/auth/signup", Some(&body)).await
    }

    /// Password login. Does not touch the session store.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, RequestFailure> {
        let body = LoginRequest { email, password };
        self.call(Method::POST, "/auth/login", Some(&body)).await
    }

    /// Face login. Does not touch the session store.
    pub async fn login_face(&self, face_image: &StillImage) -> Result<LoginResponse, RequestFailure> {
        let body = FaceImageRequest {
            face_image: face_image.as_data_uri(),
        };
        self.call(Method::POST, "/auth/login-face", Some(&body)).await
    }

    /// Marks attendance for the face in `face_image`.
    pub async fn mark_attendance(&self, face_image: &StillImage) -> Result<Value, RequestFailure> {
        let body = FaceImageRequest {
            face_image: face_image.as_data_uri(),
        };
        self.request(Method::POST, "/attendance/mark", Some(&body)).await
    }

    /// All attendance records, in the order the server returns them.
    pub async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>, RequestFailure> {
        self.call::<Value, _>(Method::GET, "/attendance/all", None).await
    }
}
