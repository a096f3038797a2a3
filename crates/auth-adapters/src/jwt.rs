use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use domains::{DomainError, IssuedToken, Requester, Result, TokenService};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    iat: i64,
    exp: i64,
}

/// Signs and checks HS256 access tokens carrying the user's id and name.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    fn unauthorized() -> DomainError {
        DomainError::Unauthorized("Invalid or expired token.".into())
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, requester: &Requester) -> Result<IssuedToken> {
        let now = Utc::now();
        let claims = Claims {
            sub: requester.id.to_string(),
            username: requester.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::Internal(format!("Failed to sign token: {e}")))?;
        Ok(IssuedToken {
            access_token,
            expires_in: self.ttl.num_seconds().max(0) as u64,
        })
    }

    fn verify(&self, token: &str) -> Result<Requester> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            if !matches!(
                err.kind(),
                ErrorKind::ExpiredSignature | ErrorKind::InvalidSignature
            ) {
                debug!(error = ?err.kind(), "malformed bearer token");
            }
            Self::unauthorized()
        })?;
        let id = Uuid::parse_str(&data.claims.sub).map_err(|_| Self::unauthorized())?;
        Ok(Requester {
            id,
            username: data.claims.username,
        })
    }
}
