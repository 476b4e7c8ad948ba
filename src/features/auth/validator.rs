use super::model::{AuthenticatedUser, CustomClaims};
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
    claims_namespace: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    // Namespaced custom claims are looked up by the configured key
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
        claims_namespace: String,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
            claims_namespace,
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        Ok(self.to_user(token_data.claims))
    }

    fn to_user(&self, claims: Claims) -> AuthenticatedUser {
        let custom = claims
            .extra
            .get(&self.claims_namespace)
            .cloned()
            .and_then(|v| serde_json::from_value::<CustomClaims>(v).ok())
            .unwrap_or_default();

        AuthenticatedUser {
            sub: claims.sub,
            name: custom.name,
            phone: custom.phone,
            roles: custom.roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> JwtValidator {
        JwtValidator::new(
            Arc::new(JwksClient::new(
                "http://localhost/.well-known/jwks.json",
                Duration::from_secs(60),
            )),
            "http://localhost".to_string(),
            "storefront".to_string(),
            Duration::from_secs(0),
            "https://storefront.local/claims".to_string(),
        )
    }

    #[test]
    fn test_custom_claims_are_read_from_namespace() {
        let claims: Claims = serde_json::from_value(json!({
            "sub": "admin-1",
            "iss": "http://localhost",
            "https://storefront.local/claims": {
                "roles": ["admin"],
                "name": "Linh",
                "phone": "0900000000"
            }
        }))
        .unwrap();

        let user = validator().to_user(claims);
        assert_eq!(user.sub, "admin-1");
        assert_eq!(user.roles, vec!["admin".to_string()]);
        assert_eq!(user.phone.as_deref(), Some("0900000000"));
    }

    #[test]
    fn test_missing_namespace_yields_no_roles() {
        let claims: Claims = serde_json::from_value(json!({ "sub": "someone" })).unwrap();
        let user = validator().to_user(claims);
        assert!(user.roles.is_empty());
        assert!(!user.has_staff_access());
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected_before_key_lookup() {
        let err = validator().validate_token("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }
}
