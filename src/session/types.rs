use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity presented to `POST /jwt`, embedded verbatim in the issued token.
/// Must be a JSON object; its shape is otherwise unchecked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct IdentityClaims(pub Map<String, Value>);

impl IdentityClaims {
    pub fn email(&self) -> Option<&str> {
        self.0.get("email").and_then(Value::as_str)
    }
}

/// JWT claims structure: the identity plus the registered timestamps
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    #[serde(flatten)]
    pub identity: IdentityClaims,
    pub iat: i64, // Issued at, seconds since epoch
    pub exp: i64, // Expiration, seconds since epoch
}

/// Body returned by `/jwt` and `/logout`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_claims_serialize_flat() {
        let claims = SessionClaims {
            identity: serde_json::from_value(json!({"email": "a@x.com"})).unwrap(),
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        };

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            value,
            json!({"email": "a@x.com", "iat": 1_700_000_000, "exp": 1_700_086_400})
        );

        let decoded: SessionClaims = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, claims);
        assert_eq!(decoded.identity.email(), Some("a@x.com"));
    }

    #[test]
    fn test_identity_claims_must_be_object() {
        assert!(serde_json::from_value::<IdentityClaims>(json!("a@x.com")).is_err());
        assert!(serde_json::from_value::<IdentityClaims>(json!([1, 2])).is_err());

        let empty: IdentityClaims = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.email(), None);
    }
}
