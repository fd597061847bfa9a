//! GraphQL authentication
//!
//! Tokens are issued by the account service; this module only verifies
//! them and exposes the resulting caller identity to resolvers.

use async_graphql::Context;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::error::LinkError;
use crate::services::UserId;

/// User context extracted from a verified JWT, stored in request data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// Claims carried by access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User id, as a decimal string
    pub sub: String,
    pub exp: i64,
}

/// Verify an HS256 token and extract the caller
pub fn verify_token(token: &str, secret: &str) -> Result<AuthUser, LinkError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_aud = false;

    let token_data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.trim().as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT verification failed");
        LinkError::Unauthenticated(format!("Invalid token: {}", e))
    })?;

    let user_id = token_data.claims.sub.parse::<UserId>().map_err(|_| {
        LinkError::Unauthenticated(format!("Invalid token subject '{}'", token_data.claims.sub))
    })?;

    Ok(AuthUser { user_id })
}

/// Extension trait to read the caller from GraphQL context
pub trait AuthExt {
    /// The authenticated user id, or `None` for anonymous requests
    fn caller(&self) -> Option<UserId>;
}

impl<'a> AuthExt for Context<'a> {
    fn caller(&self) -> Option<UserId> {
        self.data_opt::<AuthUser>().map(|user| user.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret";

    fn token(sub: &str, exp_offset_secs: i64) -> String {
        let claims = AccessTokenClaims {
            sub: sub.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset_secs,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token() {
        let user = verify_token(&token("42", 3600), SECRET).unwrap();
        assert_eq!(user.user_id, 42);
    }

    #[test]
    fn test_wrong_secret() {
        let result = verify_token(&token("42", 3600), "other-secret");
        assert_matches!(result, Err(LinkError::Unauthenticated(_)));
    }

    #[test]
    fn test_expired_token() {
        let result = verify_token(&token("42", -3600), SECRET);
        assert_matches!(result, Err(LinkError::Unauthenticated(_)));
    }

    #[test]
    fn test_non_numeric_subject() {
        let result = verify_token(&token("alice", 3600), SECRET);
        assert_matches!(result, Err(LinkError::Unauthenticated(msg)) if msg.contains("alice"));
    }

    #[test]
    fn test_malformed_token() {
        assert_matches!(
            verify_token("not-a-jwt", SECRET),
            Err(LinkError::Unauthenticated(_))
        );
    }
}
