//! Signup, login and logout.

use super::{messages, FlowError};
use crate::capture::StillImage;
use crate::client::{ApiClient, LoginResponse};
use crate::session::UserIdentity;
use serde_json::Value;

/// Shortest password the signup form accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Fields of the signup form.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password, at least [`MIN_PASSWORD_LEN`] characters.
    pub password: String,
}

impl SignupForm {
    /// Client-side checks run before any capture or request.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.name.trim().is_empty() {
            return Err(FlowError::Invalid("Name is required".to_string()));
        }
        if self.email.trim().is_empty() {
            return Err(FlowError::Invalid("Email is required".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FlowError::Invalid(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

/// Account flows. Successful logins replace the stored credential.
#[derive(Debug, Clone)]
pub struct AuthFlow {
    client: ApiClient,
}

impl AuthFlow {
    /// Flows that sign in through `client`'s session store.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Creates an account. Signing up does not sign in; the caller sends
    /// the user on to login afterwards.
    pub async fn signup(
        &self,
        form: &SignupForm,
        face_image: Option<&StillImage>,
    ) -> Result<Value, FlowError> {
        let face_image =
            face_image.ok_or_else(|| FlowError::Invalid(messages::FACE_REQUIRED.to_string()))?;
        form.validate()?;

        let created = self
            .client
            .signup(form.name.trim(), form.email.trim(), &form.password, face_image)
            .await
            .map_err(|f| FlowError::rejected(f, messages::SIGNUP_FAILED))?;

        tracing::info!(email = %form.email.trim(), "Account created");
        Ok(created)
    }

    /// Password login. Blank fields are rejected without a request.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserIdentity, FlowError> {
        if email.trim().is_empty() {
            return Err(FlowError::Invalid("Email is required".to_string()));
        }
        if password.is_empty() {
            return Err(FlowError::Invalid("Password is required".to_string()));
        }

        let response = self
            .client
            .login(email.trim(), password)
            .await
            .map_err(|f| FlowError::rejected(f, messages::LOGIN_FAILED))?;
        Ok(self.establish(response))
    }

    /// Face login.
    pub async fn login_face(&self, face_image: &StillImage) -> Result<UserIdentity, FlowError> {
        let response = self
            .client
            .login_face(face_image)
            .await
            .map_err(|f| FlowError::rejected(f, messages::FACE_LOGIN_FAILED))?;
        Ok(self.establish(response))
    }

    /// Forgets the stored credential.
    pub fn logout(&self) {
        self.client.session().clear();
    }

    fn establish(&self, response: LoginResponse) -> UserIdentity {
        let user = response.user;
        self.client
            .session()
            .set_credential(response.access_token, user.clone());
        user
    }
}
