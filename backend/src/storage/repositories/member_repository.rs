use chrono::{DateTime, Utc};
use shared::Member;
use sqlx::Row;

use crate::domain::errors::Result;
use crate::storage::connection::DbConnection;

/// Repository for roster operations
#[derive(Clone)]
pub struct MemberRepository {
    db: DbConnection,
}

impl MemberRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a new member, returning their assigned id
    pub async fn store_member(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO members (name, email, phone, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(created_at)
        .execute(self.db.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get a member by id
    pub async fn get_member(&self, member_id: i64) -> Result<Option<Member>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, created_at
            FROM members
            WHERE id = ?
            "#,
        )
        .bind(member_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(Member {
                id: r.get("id"),
                name: r.get("name"),
                email: r.get("email"),
                phone: r.get("phone"),
                created_at: r.get("created_at"),
            })),
            None => Ok(None),
        }
    }

    /// List all members ordered by name, case-insensitively
    pub async fn list_members(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, phone, created_at
            FROM members
            ORDER BY name COLLATE NOCASE ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        let members = rows
            .iter()
            .map(|row| Member {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
                phone: row.get("phone"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(members)
    }

    /// Update a member's fields in place
    pub async fn update_member(&self, member: &Member) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE members
            SET name = ?, email = ?, phone = ?
            WHERE id = ?
            "#,
        )
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(member.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a member; their loans go too via ON DELETE CASCADE
    pub async fn delete_member(&self, member_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM members WHERE id = ?
            "#,
        )
        .bind(member_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}
