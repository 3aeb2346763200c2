use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of the logged-in principal as reported by the backend.
///
/// Only the fields the client displays are typed; everything else the
/// backend sends is kept in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("unknown")
    }

    pub fn role_display(&self) -> &'static str {
        if self.is_superuser.unwrap_or(false) {
            "Administrator"
        } else {
            "User"
        }
    }
}

/// Backend columns are naive UTC, so timestamps usually arrive without an
/// offset. RFC 3339 is accepted too; anything else reads as absent.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::String(raw)) = value else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    Ok(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
