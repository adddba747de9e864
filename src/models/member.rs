//! Member model and related types

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Membership tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MembershipType {
    Admin,
    Librarian,
    Member,
}

impl MembershipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipType::Admin => "admin",
            MembershipType::Librarian => "librarian",
            MembershipType::Member => "member",
        }
    }

    /// Librarians and admins manage the catalog and loans desk.
    pub fn is_staff(&self) -> bool {
        matches!(self, MembershipType::Admin | MembershipType::Librarian)
    }
}

impl std::fmt::Display for MembershipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MembershipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(MembershipType::Admin),
            "librarian" => Ok(MembershipType::Librarian),
            "member" => Ok(MembershipType::Member),
            _ => Err(format!(
                "Invalid membership type '{}'. Allowed values: admin, librarian, member",
                s
            )),
        }
    }
}

// SQLx conversion, the tier is stored as text
impl sqlx::Type<Postgres> for MembershipType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for MembershipType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for MembershipType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Member model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i32,
    /// Stored lowercased, unique case-insensitively
    pub username: String,
    pub name: String,
    pub email: String,
    /// Argon2 hash, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub membership_type: MembershipType,
}

/// A member not yet persisted, credentials already hashed
#[derive(Debug, Clone)]
pub struct NewMember {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub membership_type: MembershipType,
}

/// Member registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterMember {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    /// Membership tier: admin, librarian or member
    pub membership_type: String,
}

/// Partial member update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMember {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: Option<String>,
    pub membership_type: Option<String>,
}

/// JWT claims for authenticated members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberClaims {
    pub sub: String,
    pub member_id: i32,
    pub membership_type: MembershipType,
    pub exp: i64,
    pub iat: i64,
}

impl MemberClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.membership_type == MembershipType::Admin
    }

    /// Require librarian or admin privileges
    pub fn require_librarian(&self) -> Result<(), AppError> {
        if self.membership_type.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Librarian privileges required".to_string(),
            ))
        }
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ))
        }
    }

    /// Allow members to act on their own account, staff on anyone's
    pub fn require_self_or_librarian(&self, member_id: i32) -> Result<(), AppError> {
        if self.member_id == member_id || self.membership_type.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Access restricted to own account".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn membership_type_parses_case_insensitively() {
        assert_eq!(
            "Librarian".parse::<MembershipType>().unwrap(),
            MembershipType::Librarian
        );
        assert!("superuser".parse::<MembershipType>().is_err());
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let now = Utc::now().timestamp();
        let claims = MemberClaims {
            sub: "alice".to_string(),
            member_id: 7,
            membership_type: MembershipType::Member,
            exp: now + 3600,
            iat: now,
        };

        let token = claims.create_token("test-secret").unwrap();
        let parsed = MemberClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(parsed.member_id, 7);
        assert_eq!(parsed.membership_type, MembershipType::Member);
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = MemberClaims {
            sub: "alice".to_string(),
            member_id: 7,
            membership_type: MembershipType::Member,
            exp: now + 3600,
            iat: now,
        };

        let token = claims.create_token("test-secret").unwrap();
        assert!(MemberClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn self_or_librarian_check() {
        let now = Utc::now().timestamp();
        let claims = MemberClaims {
            sub: "alice".to_string(),
            member_id: 7,
            membership_type: MembershipType::Member,
            exp: now + 3600,
            iat: now,
        };

        assert!(claims.require_self_or_librarian(7).is_ok());
        assert!(claims.require_self_or_librarian(8).is_err());
        assert!(claims.require_librarian().is_err());
    }
}
