//! Password login and signed session cookies.
//!
//! A session token is `<issued>.<id>.<sig>` where `issued` is a unix
//! timestamp, `id` a random `UUIDv4`, and `sig` the hex SHA-256 of
//! `<secret>:<issued>.<id>`. Tokens older than [`SESSION_MAX_AGE_SECS`] are
//! rejected even if the browser still presents them.

use std::sync::Arc;

use axum::http::{header::COOKIE, HeaderMap};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;
use wbdash_core::AppConfig;

pub const SESSION_COOKIE: &str = "wbdash_session";

/// Fourteen days.
pub const SESSION_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60;

#[derive(Debug)]
struct Credentials {
    password: String,
    secret: String,
}

/// Session gate settings shared with middleware and login handlers.
///
/// `None` credentials disable the gate; only allowed in development.
#[derive(Debug, Clone)]
pub struct SessionState {
    credentials: Option<Arc<Credentials>>,
}

impl SessionState {
    #[must_use]
    pub fn new(password: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            credentials: Some(Arc::new(Credentials {
                password: password.into(),
                secret: secret.into(),
            })),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self { credentials: None }
    }

    /// Builds the gate from config.
    ///
    /// In development a missing password disables the gate, and a missing
    /// secret is replaced by a per-process random one (sessions then do not
    /// survive a restart). Outside development both are required.
    ///
    /// # Errors
    ///
    /// Returns an error outside development when either value is missing.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match (&config.auth_password, &config.session_secret) {
            (Some(password), Some(secret)) => Ok(Self::new(password, secret)),
            (Some(password), None) if config.is_development() => {
                tracing::warn!("WBDASH_SESSION_SECRET not set; using a per-process secret");
                Ok(Self::new(password, Uuid::new_v4().simple().to_string()))
            }
            (None, _) if config.is_development() => {
                tracing::warn!("WBDASH_AUTH_PASSWORD not set; session gate disabled in development");
                Ok(Self::disabled())
            }
            _ => anyhow::bail!(
                "WBDASH_AUTH_PASSWORD and WBDASH_SESSION_SECRET are required outside development"
            ),
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Constant-time password comparison. Always `false` when disabled.
    #[must_use]
    pub fn check_password(&self, candidate: &str) -> bool {
        self.credentials.as_ref().is_some_and(|c| {
            bool::from(c.password.as_bytes().ct_eq(candidate.as_bytes()))
        })
    }

    /// Issues a fresh signed token, or `None` when the gate is disabled.
    #[must_use]
    pub fn issue(&self, now: DateTime<Utc>) -> Option<String> {
        let creds = self.credentials.as_ref()?;
        let issued = now.timestamp();
        let id = Uuid::new_v4().simple().to_string();
        let sig = sign(&creds.secret, issued, &id);
        Some(format!("{issued}.{id}.{sig}"))
    }

    /// Checks signature and age of a presented token.
    #[must_use]
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> bool {
        let Some(creds) = self.credentials.as_ref() else {
            return false;
        };
        let mut parts = token.splitn(3, '.');
        let (Some(issued), Some(id), Some(sig)) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };
        let Ok(issued) = issued.parse::<i64>() else {
            return false;
        };
        let age = now.timestamp() - issued;
        if !(0..=SESSION_MAX_AGE_SECS).contains(&age) {
            return false;
        }
        let expected = sign(&creds.secret, issued, id);
        bool::from(expected.as_bytes().ct_eq(sig.as_bytes()))
    }

    /// True when the gate is disabled or the request carries a valid cookie.
    #[must_use]
    pub fn is_authenticated(&self, headers: &HeaderMap, now: DateTime<Utc>) -> bool {
        if !self.enabled() {
            return true;
        }
        cookie_value(headers, SESSION_COOKIE).is_some_and(|token| self.verify(token, now))
    }
}

fn sign(secret: &str, issued: i64, id: &str) -> String {
    format!("{:x}", Sha256::digest(format!("{secret}:{issued}.{id}").as_bytes()))
}

/// `Set-Cookie` value carrying a session token.
#[must_use]
pub fn session_cookie(token: &str) -> String {
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={SESSION_MAX_AGE_SECS}"
    )
}

/// `Set-Cookie` value that clears the session.
#[must_use]
pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// First value of cookie `name` across all `Cookie` headers.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
