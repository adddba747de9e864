//! Members repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::member::{Member, NewMember},
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all members
    pub async fn list(&self) -> AppResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    /// Get member by username, case-insensitive
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(
            "SELECT * FROM members WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    /// Insert a new member
    pub async fn insert(&self, member: &NewMember) -> AppResult<Member> {
        let created = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (username, name, email, password_hash, membership_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&member.username)
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.password_hash)
        .bind(member.membership_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Save the full state of an existing member
    pub async fn save(&self, member: &Member) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE members
            SET username = $1, name = $2, email = $3, password_hash = $4, membership_type = $5
            WHERE id = $6
            "#,
        )
        .bind(&member.username)
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.password_hash)
        .bind(member.membership_type)
        .bind(member.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a member
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
