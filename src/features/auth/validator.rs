use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;
use super::model::AuthenticatedUser;
use super::verifier::AuthVerifier;
use crate::core::error::{AppError, Result};

enum KeySource {
    /// RS256 keys looked up by `kid`
    Jwks {
        client: Arc<JwksClient>,
        issuer: String,
    },
    /// HS256 shared secret
    Secret(DecodingKey),
}

/// Bearer token verifier backed by `jsonwebtoken`
pub struct JwtValidator {
    keys: KeySource,
    audience: Option<String>,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "exp")]
    _exp: u64,
    #[serde(rename = "accountId", default)]
    account_id_camel: Option<String>,
    #[serde(default)]
    account_id: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

impl Claims {
    /// First non-empty of `accountId`, `account_id`, `user_id`, then `sub`
    fn resolved_account_id(&self) -> String {
        [&self.account_id_camel, &self.account_id, &self.user_id]
            .into_iter()
            .flatten()
            .find(|id| !id.is_empty())
            .unwrap_or(&self.sub)
            .clone()
    }
}

impl JwtValidator {
    pub fn with_jwks(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: Option<String>,
        leeway: Duration,
    ) -> Self {
        Self {
            keys: KeySource::Jwks {
                client: jwks_client,
                issuer,
            },
            audience,
            leeway: leeway.as_secs(),
        }
    }

    pub fn with_secret(secret: &str, audience: Option<String>, leeway: Duration) -> Self {
        Self {
            keys: KeySource::Secret(DecodingKey::from_secret(secret.as_bytes())),
            audience,
            leeway: leeway.as_secs(),
        }
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let KeySource::Jwks { issuer, .. } = &self.keys {
            validation.set_issuer(&[issuer]);
        }

        validation
    }
}

#[async_trait]
impl AuthVerifier for JwtValidator {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser> {
        let header = decode_header(token).map_err(|e| AppError::Unauthorized(e.to_string()))?;

        let (decoding_key, algorithm) = match &self.keys {
            KeySource::Jwks { client, .. } => {
                if header.alg != Algorithm::RS256 {
                    return Err(AppError::Unauthorized(format!(
                        "Unsupported algorithm: {:?}. Only RS256 is allowed",
                        header.alg
                    )));
                }
                let kid = header.kid.ok_or_else(|| {
                    AppError::Unauthorized("Missing kid in token header".to_string())
                })?;
                let key = client
                    .get_key(&kid)
                    .await
                    .map_err(|e| AppError::Unauthorized(e.to_string()))?;
                (key, Algorithm::RS256)
            }
            KeySource::Secret(key) => {
                if header.alg != Algorithm::HS256 {
                    return Err(AppError::Unauthorized(format!(
                        "Unsupported algorithm: {:?}. Only HS256 is allowed",
                        header.alg
                    )));
                }
                (key.clone(), Algorithm::HS256)
            }
        };

        let token_data = decode::<Claims>(token, &decoding_key, &self.validation(algorithm))
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;

        let claims = token_data.claims;

        Ok(AuthenticatedUser {
            account_id: claims.resolved_account_id(),
            sub: claims.sub,
        })
    }
}
