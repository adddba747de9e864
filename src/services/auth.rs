//! Authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::member::{Member, MemberClaims},
    repository::Gateway,
};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Clone)]
pub struct AuthService {
    gateway: Arc<dyn Gateway>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn Gateway>, config: AuthConfig) -> Self {
        Self { gateway, config }
    }

    /// Authenticate a member by username and return a JWT token.
    ///
    /// The same error covers unknown usernames and wrong passwords so the
    /// response does not leak which usernames exist.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, Member)> {
        let member = self
            .gateway
            .get_member_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        if !verify_password(password, &member.password_hash)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.create_token(&member)?;
        tracing::info!(member_id = member.id, "member authenticated");
        Ok((token, member))
    }

    /// Create a JWT token for a member
    pub fn create_token(&self, member: &Member) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = MemberClaims {
            sub: member.username.clone(),
            member_id: member.id,
            membership_type: member.membership_type,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::member::MembershipType, repository::MockGateway};

    fn member_with_password(password: &str) -> Member {
        Member {
            id: 1,
            username: "alice".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.org".to_string(),
            password_hash: hash_password(password).unwrap(),
            membership_type: MembershipType::Member,
        }
    }

    #[test]
    fn password_hash_verify_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[tokio::test]
    async fn authenticate_issues_token_for_valid_credentials() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_get_member_by_username()
            .returning(|_| Ok(Some(member_with_password("s3cret"))));

        let service = AuthService::new(Arc::new(gateway), AuthConfig::default());
        let (token, member) = service.authenticate("alice", "s3cret").await.unwrap();

        let claims = MemberClaims::from_token(&token, &AuthConfig::default().jwt_secret).unwrap();
        assert_eq!(claims.member_id, member.id);
    }

    #[tokio::test]
    async fn authenticate_rejects_wrong_password() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_get_member_by_username()
            .returning(|_| Ok(Some(member_with_password("s3cret"))));

        let service = AuthService::new(Arc::new(gateway), AuthConfig::default());
        let err = service.authenticate("alice", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn authenticate_rejects_unknown_username() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_get_member_by_username()
            .returning(|_| Ok(None));

        let service = AuthService::new(Arc::new(gateway), AuthConfig::default());
        let err = service.authenticate("nobody", "s3cret").await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }
}
