//! Explicit authentication state.
//!
//! A [`Session`] is created by [`ConsoleApi::login`] or
//! [`ConsoleApi::restore_session`] and attached to the client with
//! [`ConsoleApi::with_session`]. Callers decide where tokens live.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ConsoleApi;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Absent when the backend accepted the login without issuing a token.
    pub token: Option<String>,
    pub user: Option<AuthUser>,
}

impl Session {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            user: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Build a session from a login response. The token may arrive as
/// `access_token` or `token`; the user falls back to the submitted email.
fn session_from_login(data: &Value, email: &str) -> Session {
    let token = ["access_token", "token"]
        .iter()
        .find_map(|k| data.get(*k).and_then(|t| t.as_str()))
        .filter(|t| !t.is_empty())
        .map(String::from);

    let user = data
        .get("user")
        .filter(|u| u.is_object())
        .and_then(|u| serde_json::from_value::<AuthUser>(u.clone()).ok())
        .unwrap_or_else(|| AuthUser {
            email: email.to_string(),
            name: data.get("name").and_then(|n| n.as_str()).map(String::from),
            ..Default::default()
        });

    Session {
        token,
        user: Some(user),
    }
}

/// The user record in a register response, bare or under `user`.
fn registered_user(data: &Value) -> Option<AuthUser> {
    let record = data
        .get("user")
        .filter(|u| u.is_object())
        .or_else(|| Some(data).filter(|d| d.get("email").is_some()))?;
    serde_json::from_value::<AuthUser>(record.clone())
        .ok()
        .filter(|u| !u.email.is_empty())
}

impl ConsoleApi {
    /// `POST /auth/login`. Does not attach the session; the caller does.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let builder = self
            .request(Method::POST, "/auth/login")
            .json(&Credentials { email, password });
        let data: Value = self.send_json(builder, "Login failed").await?;
        let session = session_from_login(&data, email);
        if session.token.is_none() {
            tracing::warn!("login for {} succeeded without a token", email);
        } else {
            tracing::info!("logged in as {}", email);
        }
        Ok(session)
    }

    /// `POST /auth/register`. Registration never signs the user in.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthUser>> {
        let builder = self
            .request(Method::POST, "/auth/register")
            .json(&Registration {
                name,
                email,
                password,
            });
        let data: Value = self.send_json(builder, "Register failed").await?;
        tracing::info!("registered {}", email);
        Ok(registered_user(&data))
    }

    /// Validate a saved token with `GET /auth/me`. On error the caller
    /// should discard the token.
    pub async fn restore_session(&self, token: &str) -> Result<Session> {
        let probe = self.clone().with_session(Session::with_token(token));
        let user: AuthUser = probe
            .send_json(probe.request(Method::GET, "/auth/me"), "Unauthorized")
            .await?;
        Ok(Session {
            token: Some(token.to_string()),
            user: Some(user),
        })
    }

    pub fn sign_out(&mut self) {
        self.set_session(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_reads_access_token() {
        let data = json!({
            "access_token": "tok-1",
            "user": { "id": "u1", "email": "chef@example.com", "name": "Chef", "role": "admin" }
        });
        let s = session_from_login(&data, "chef@example.com");
        assert_eq!(s.token.as_deref(), Some("tok-1"));
        assert_eq!(s.user.unwrap().role.as_deref(), Some("admin"));
    }

    #[test]
    fn test_login_reads_legacy_token_key() {
        let s = session_from_login(&json!({ "token": "tok-2", "name": "Sam" }), "sam@example.com");
        assert_eq!(s.token.as_deref(), Some("tok-2"));
        let user = s.user.unwrap();
        assert_eq!(user.email, "sam@example.com");
        assert_eq!(user.name.as_deref(), Some("Sam"));
    }

    #[test]
    fn test_login_without_token_is_anonymous() {
        let s = session_from_login(&json!({ "ok": true }), "a@b.c");
        assert!(!s.is_authenticated());
        assert!(s.user.is_some());
    }

    #[test]
    fn test_register_returns_user_record_when_present() {
        let nested = json!({ "user": { "id": "u9", "email": "new@example.com", "name": "New" } });
        assert_eq!(registered_user(&nested).unwrap().id.as_deref(), Some("u9"));

        let bare = json!({ "email": "bare@example.com", "role": "staff" });
        assert_eq!(registered_user(&bare).unwrap().role.as_deref(), Some("staff"));

        assert!(registered_user(&json!({ "message": "created" })).is_none());
        assert!(registered_user(&Value::Null).is_none());
    }

    #[test]
    fn test_sign_out_drops_session() {
        let mut api = ConsoleApi::new("http://localhost").with_session(Session::with_token("t"));
        assert!(api.session().is_some());
        api.sign_out();
        assert!(api.session().is_none());
    }
}
