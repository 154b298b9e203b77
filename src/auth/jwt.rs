use axum::extract::FromRef;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{config::AuthConfig, state::AppState};

/// Claims carried by access tokens from the hosted auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<Value>,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub audience: String,
    pub issuer: Option<String>,
    #[cfg(test)]
    pub secret: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.auth)
    }
}

impl JwtKeys {
    pub fn new(cfg: &AuthConfig) -> Self {
        Self {
            decoding: DecodingKey::from_secret(cfg.jwt_secret.as_bytes()),
            audience: cfg.audience.clone(),
            issuer: cfg.issuer.clone(),
            #[cfg(test)]
            secret: cfg.jwt_secret.clone(),
        }
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(std::slice::from_ref(&self.audience));
        if let Some(iss) = &self.issuer {
            validation.set_issuer(std::slice::from_ref(iss));
        }
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }

    /// Issues a token the way the auth service would. Only tests need this.
    #[cfg(test)]
    pub fn sign(&self, user_id: Uuid, email: &str, metadata: Option<Value>) -> String {
        use jsonwebtoken::{encode, EncodingKey, Header};
        use time::{Duration, OffsetDateTime};

        let exp = OffsetDateTime::now_utc() + Duration::hours(1);
        let claims = Claims {
            sub: user_id,
            exp: exp.unix_timestamp() as usize,
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
            email: Some(email.to_string()),
            user_metadata: metadata,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("sign test token")
    }
}
