use std::collections::BTreeSet;

use serde::Deserialize;

/// Decoded access token payload, reduced to what the guard and handlers read.
///
/// NOTE:
/// - `iss`, `aud` and `exp` are checked by `jsonwebtoken::Validation` on the
///   raw payload and are not kept here. Other issuer claims are ignored.
/// - `permissions: None` means the issuer sent no permission information;
///   `Some(empty)` means it sent an empty list. The two are judged differently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,

    #[serde(default)]
    pub permissions: Option<BTreeSet<String>>,
}

impl Claims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|set| set.contains(permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_and_empty_permissions_are_distinct() {
        let absent: Claims = serde_json::from_value(json!({"sub": "auth0|1"})).unwrap();
        let empty: Claims =
            serde_json::from_value(json!({"sub": "auth0|1", "permissions": []})).unwrap();

        assert!(absent.permissions.is_none());
        assert_eq!(empty.permissions, Some(BTreeSet::new()));
    }

    #[test]
    fn null_permissions_count_as_absent() {
        let claims: Claims = serde_json::from_value(json!({"permissions": null})).unwrap();
        assert!(claims.permissions.is_none());
    }

    #[test]
    fn tolerates_registered_and_issuer_specific_claims() {
        let claims: Claims = serde_json::from_value(json!({
            "iss": "https://tenant.example.com/",
            "aud": ["drinks", "https://tenant.example.com/userinfo"],
            "exp": 1_900_000_000u64,
            "azp": "client-id",
            "sub": "auth0|1",
            "permissions": ["get:drinks-detail"]
        }))
        .unwrap();

        assert_eq!(claims.sub.as_deref(), Some("auth0|1"));
        assert!(claims.has_permission("get:drinks-detail"));
        assert!(!claims.has_permission("post:drinks"));
    }
}
