//! Credentials attached to every request sent to the server under test.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Session cookie the gateway expects alongside basic auth.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
}

impl SessionCookie {
    /// Creates a session cookie.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Value for a `Cookie` request header.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Basic-auth identity plus session cookie issued by the fixture.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// Session cookie.
    pub cookie: SessionCookie,
}

impl Credential {
    /// Creates a credential.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        cookie: SessionCookie,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            cookie,
        }
    }
}

impl Default for Credential {
    /// The identity the gateway's test configuration provisions.
    fn default() -> Self {
        Self::new(
            "test",
            "test",
            SessionCookie::new("OpenBazaar_Auth_Cookie", "supersecret"),
        )
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("cookie", &self.cookie)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_joins_name_and_value() {
        let cookie = SessionCookie::new("session", "abc123");
        assert_eq!(cookie.header_value(), "session=abc123");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let credential = Credential::new("alice", "hunter2", SessionCookie::new("s", "token"));
        let printed = format!("{credential:?}");
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("token"));
    }
}
