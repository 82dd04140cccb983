use super::Claims;
use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use std::fmt;

const REFRESH_HANDLE_LEN: usize = 43;

/// Signed, self-contained access credential. Never stored server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque lookup key into the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshHandle(pub String);

impl RefreshHandle {
    /// ~256 bits from the URL-safe nanoid alphabet.
    pub fn generate() -> Self {
        RefreshHandle(nanoid!(REFRESH_HANDLE_LEN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefreshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RefreshHandle {
    fn from(s: &str) -> Self {
        RefreshHandle(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: AccessToken,
    pub refresh: RefreshHandle,
    pub claims: Claims,
}
