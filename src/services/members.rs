//! Member management service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::member::{Member, MembershipType, NewMember, RegisterMember, UpdateMember},
    repository::Gateway,
    services::auth,
};

#[derive(Clone)]
pub struct MembersService {
    gateway: Arc<dyn Gateway>,
}

impl MembersService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// List all members
    pub async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.gateway.list_members().await
    }

    /// Get member by id
    pub async fn get_member(&self, id: i32) -> AppResult<Member> {
        self.gateway
            .get_member(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Register a new member, username unique case-insensitively
    pub async fn register(&self, registration: RegisterMember) -> AppResult<Member> {
        let membership_type: MembershipType = registration
            .membership_type
            .parse()
            .map_err(AppError::Validation)?;

        let username = registration.username.trim().to_lowercase();

        if self
            .gateway
            .get_member_by_username(&username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                registration.username
            )));
        }

        let member = NewMember {
            username,
            name: registration.name.trim().to_string(),
            email: registration.email.trim().to_string(),
            password_hash: auth::hash_password(&registration.password)?,
            membership_type,
        };

        let created = self.gateway.insert_member(&member).await?;
        tracing::info!(member_id = created.id, "member registered");
        Ok(created)
    }

    /// Apply a partial update, leaving absent fields untouched
    pub async fn update_member(&self, id: i32, update: UpdateMember) -> AppResult<Member> {
        let existing = self
            .gateway
            .get_member(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))?;

        let membership_type = match &update.membership_type {
            Some(raw) => raw.parse().map_err(AppError::Validation)?,
            None => existing.membership_type,
        };

        let password_hash = match &update.password {
            Some(password) => auth::hash_password(password)?,
            None => existing.password_hash.clone(),
        };

        let member = Member {
            id: existing.id,
            username: existing.username,
            name: update.name.unwrap_or(existing.name),
            email: update.email.unwrap_or(existing.email),
            password_hash,
            membership_type,
        };

        self.gateway.save_member(&member).await?;
        Ok(member)
    }

    /// Delete a member, restricted while loans reference them
    pub async fn delete_member(&self, id: i32) -> AppResult<()> {
        self.gateway
            .get_member(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))?;

        if self.gateway.has_loans_for_member(id).await? {
            return Err(AppError::Conflict(
                "Member cannot be deleted while loans reference them".to_string(),
            ));
        }

        self.gateway.delete_member(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockGateway;

    fn registration(username: &str) -> RegisterMember {
        RegisterMember {
            username: username.to_string(),
            name: "Alice".to_string(),
            email: "alice@example.org".to_string(),
            password: "s3cret".to_string(),
            membership_type: "member".to_string(),
        }
    }

    fn member(id: i32, username: &str) -> Member {
        Member {
            id,
            username: username.to_string(),
            name: "Alice".to_string(),
            email: "alice@example.org".to_string(),
            password_hash: "hash".to_string(),
            membership_type: MembershipType::Member,
        }
    }

    #[tokio::test]
    async fn register_normalizes_username_and_hashes_password() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_get_member_by_username()
            .withf(|username| username == "alice")
            .returning(|_| Ok(None));
        gateway
            .expect_insert_member()
            .withf(|m| m.username == "alice" && m.password_hash != "s3cret")
            .returning(|m| {
                Ok(Member {
                    id: 1,
                    username: m.username.clone(),
                    name: m.name.clone(),
                    email: m.email.clone(),
                    password_hash: m.password_hash.clone(),
                    membership_type: m.membership_type,
                })
            });

        let service = MembersService::new(Arc::new(gateway));
        let created = service.register(registration(" Alice ")).await.unwrap();
        assert_eq!(created.username, "alice");
    }

    #[tokio::test]
    async fn register_rejects_taken_username_case_insensitively() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_get_member_by_username()
            .returning(|username| Ok(Some(member(1, username))));

        let service = MembersService::new(Arc::new(gateway));
        let err = service.register(registration("ALICE")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn register_rejects_unknown_membership_type() {
        let gateway = MockGateway::new();
        let service = MembersService::new(Arc::new(gateway));

        let mut reg = registration("bob");
        reg.membership_type = "superuser".to_string();
        let err = service.register(reg).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_leaves_absent_fields_untouched() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_get_member()
            .returning(|id| Ok(Some(member(id, "alice"))));
        gateway
            .expect_save_member()
            .withf(|m| m.name == "Alice Liddell" && m.email == "alice@example.org")
            .returning(|_| Ok(()));

        let service = MembersService::new(Arc::new(gateway));
        let update = UpdateMember {
            name: Some("Alice Liddell".to_string()),
            email: None,
            password: None,
            membership_type: None,
        };
        let updated = service.update_member(1, update).await.unwrap();
        assert_eq!(updated.membership_type, MembershipType::Member);
    }

    #[tokio::test]
    async fn delete_member_is_restricted_while_loans_reference_them() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_get_member()
            .returning(|id| Ok(Some(member(id, "alice"))));
        gateway.expect_has_loans_for_member().returning(|_| Ok(true));

        let service = MembersService::new(Arc::new(gateway));
        let err = service.delete_member(1).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
