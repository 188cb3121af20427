//! Credential and identity types.

use serde::{Deserialize, Deserializer, Serialize};

/// The authenticated user as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Service-side identifier. Numeric ids are kept in their decimal form.
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
}

/// Bearer token plus the identity it was issued for.
///
/// The identity is `None` when the token was restored from durable storage
/// at startup; only the token is persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Opaque bearer token.
    pub token: String,
    /// Who the token belongs to, when known.
    pub user: Option<UserIdentity>,
}

impl Credential {
    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
    })
}
