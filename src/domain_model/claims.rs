use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload bound to an access credential and to the stored refresh record.
///
/// The registered fields follow the JWT names. Anything else a caller wants to
/// carry lives in `extra` and is flattened into the same JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    pub fn with_audience(mut self, aud: impl Into<String>) -> Self {
        self.aud = Some(aud.into());
        self
    }

    /// Adds a domain field. Registered names are ignored; set those through the
    /// typed fields.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        match name.as_str() {
            "aud" | "sub" | "iat" | "exp" => {}
            _ => {
                self.extra.insert(name, value.into());
            }
        }
        self
    }

    /// Returns a copy with `iat = now` and `exp = now + ttl_secs`.
    ///
    /// Both timestamps come from the same instant so a single issuance or
    /// rotation is internally consistent. `exp` saturates at `i64::MAX`.
    pub fn stamped(&self, now: DateTime<Utc>, ttl_secs: i64) -> Self {
        let iat = now.timestamp();
        Self {
            iat,
            exp: iat.saturating_add(ttl_secs),
            ..self.clone()
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Expiry is exclusive: at `now == exp` the claims are already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Reads the claims into a caller-defined shape.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::to_value(self).and_then(serde_json::from_value)
    }
}
