use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Role id carried by the virtual root superadmin.
pub const ROOT_ROLE_ID: &str = "auth:root";

/// Decoded payload of a bearer token.
///
/// Only `exp` is interpreted; every other field is kept as-is so callers
/// can read the subject, display name or roles without this crate having
/// to know the issuer's schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiration (unix seconds). `None` means the token counts as expired.
    #[serde(
        default,
        deserialize_with = "deserialize_exp",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<i64>,

    /// All other fields of the payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accept any JSON number for `exp`; anything else counts as absent.
fn deserialize_exp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.floor() as i64)),
        _ => None,
    }))
}

impl Claims {
    /// Raw access to an uninterpreted claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Subject: user id.
    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// Display name.
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Issued at (unix seconds).
    pub fn issued_at(&self) -> Option<i64> {
        self.get("iat").and_then(Value::as_i64)
    }

    /// Role ids; non-string entries are ignored.
    pub fn roles(&self) -> Vec<&str> {
        self.get("roles")
            .and_then(Value::as_array)
            .map(|roles| roles.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether the token belongs to the root superadmin.
    pub fn is_root(&self) -> bool {
        self.roles().contains(&ROOT_ROLE_ID)
    }
}
