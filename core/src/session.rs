//! Session value and login wire types.

use serde::{Deserialize, Serialize};

/// The current authentication state of the client.
///
/// A session is always replaced as a whole (login, logout, invalidation);
/// it is never edited field by field.
///
/// The `is_admin` flag is only meaningful while `token` is non-empty. Use
/// [`Session::is_admin`] rather than reading the field directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token, empty when anonymous.
    pub token: String,
    /// Server-side user id, 0 when anonymous.
    pub user_id: u64,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Role flag as reported by the server at login.
    pub is_admin: bool,
}

impl Session {
    /// Build a session from a token and the persisted profile.
    #[must_use]
    pub fn from_parts(token: impl Into<String>, user: UserInfo) -> Self {
        Self {
            token: token.into(),
            user_id: user.id,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
        }
    }

    /// Returns `true` when a bearer token is present.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty()
    }

    /// Returns `true` only for an authenticated administrator.
    ///
    /// An anonymous session is never admin, whatever the stored flag says.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_logged_in() && self.is_admin
    }

    /// The profile in its persisted shape.
    #[must_use]
    pub fn user_info(&self) -> UserInfo {
        UserInfo {
            id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
        }
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: response.token,
            user_id: response.user_id,
            username: response.username,
            email: response.email,
            is_admin: response.is_admin,
        }
    }
}

/// Persisted user profile, stored as JSON under the `userInfo` key.
///
/// Every field defaults so that `{}` decodes to the empty profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User id.
    #[serde(default)]
    pub id: u64,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Administrator flag.
    #[serde(default)]
    pub is_admin: bool,
}

/// Body of `POST /api/user/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password (sent over TLS).
    pub password: String,
}

/// Successful response of `POST /api/user/login`.
///
/// The login endpoint answers with a flat object rather than the usual
/// `{success, data}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent calls.
    pub token: String,
    /// User id.
    pub user_id: u64,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Administrator flag.
    #[serde(default)]
    pub is_admin: bool,
}
