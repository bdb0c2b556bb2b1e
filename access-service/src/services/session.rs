use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;

/// Verifies session tokens minted by the platform's login system.
#[derive(Clone)]
pub struct SessionVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl SessionVerifier {
    pub fn new(config: &SessionConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
        }
    }

    /// Mint a session token for `user_id`. Used by tests and local tooling.
    pub fn issue(&self, user_id: &str, ttl: Duration) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode session token: {}", e))
    }

    /// Validate signature, expiry and issuer, returning the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, anyhow::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid session token: {}", e))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier(secret: &str, issuer: &str) -> SessionVerifier {
        SessionVerifier::new(&SessionConfig {
            jwt_secret: secret.to_string(),
            issuer: issuer.to_string(),
        })
    }

    #[test]
    fn issued_token_verifies() -> Result<(), anyhow::Error> {
        let sessions = verifier("test-secret-test-secret-test-secret", "business-platform");
        let token = sessions.issue("owner-1", Duration::minutes(15))?;

        let claims = sessions.verify(&token)?;
        assert_eq!(claims.sub, "owner-1");
        assert_eq!(claims.iss, "business-platform");
        Ok(())
    }

    #[test]
    fn wrong_secret_is_rejected() -> Result<(), anyhow::Error> {
        let token = verifier("secret-a", "business-platform").issue("u", Duration::minutes(5))?;
        assert!(verifier("secret-b", "business-platform").verify(&token).is_err());
        Ok(())
    }

    #[test]
    fn wrong_issuer_is_rejected() -> Result<(), anyhow::Error> {
        let token = verifier("secret", "someone-else").issue("u", Duration::minutes(5))?;
        assert!(verifier("secret", "business-platform").verify(&token).is_err());
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> Result<(), anyhow::Error> {
        let sessions = verifier("secret", "business-platform");
        let token = sessions.issue("u", Duration::minutes(-10))?;
        assert!(sessions.verify(&token).is_err());
        Ok(())
    }
}
