use chrono::Utc;
use tracing::{info, warn};

use crate::domain::errors::{LibraryError, Result};
use crate::storage::{DbConnection, MemberRepository};
use shared::{AddMemberRequest, Member, UpdateMemberRequest};

/// Service for managing the member roster
#[derive(Clone)]
pub struct MemberService {
    member_repository: MemberRepository,
}

impl MemberService {
    /// Create a new MemberService
    pub fn new(db: DbConnection) -> Self {
        let member_repository = MemberRepository::new(db);
        Self { member_repository }
    }

    /// Register a new member
    pub async fn add_member(&self, request: AddMemberRequest) -> Result<Member> {
        info!("Adding member: name={}, email={}", request.name, request.email);

        self.validate_member_fields(&request.name, &request.email)?;

        let phone = normalize_phone(request.phone.as_deref());
        let created_at = Utc::now();
        let id = self
            .member_repository
            .store_member(
                request.name.trim(),
                request.email.trim(),
                phone.as_deref(),
                created_at,
            )
            .await?;

        let member = Member {
            id,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone,
            created_at,
        };

        info!("Added member: {} with id: {}", member.name, member.id);

        Ok(member)
    }

    /// Get a member by id
    pub async fn get_member(&self, member_id: i64) -> Result<Option<Member>> {
        info!("Getting member: {}", member_id);

        let member = self.member_repository.get_member(member_id).await?;

        if member.is_none() {
            warn!("Member not found: {}", member_id);
        }

        Ok(member)
    }

    /// List all members, ordered by name case-insensitively
    pub async fn list_members(&self) -> Result<Vec<Member>> {
        info!("Listing all members");

        let members = self.member_repository.list_members().await?;

        info!("Found {} members", members.len());

        Ok(members)
    }

    /// Update an existing member; the join date is preserved
    pub async fn update_member(
        &self,
        member_id: i64,
        request: UpdateMemberRequest,
    ) -> Result<Member> {
        info!("Updating member: {}", member_id);

        // Get the existing member
        let existing = self
            .member_repository
            .get_member(member_id)
            .await?
            .ok_or_else(|| LibraryError::NotFound(format!("Member not found: {}", member_id)))?;

        self.validate_member_fields(&request.name, &request.email)?;

        let member = Member {
            id: existing.id,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: normalize_phone(request.phone.as_deref()),
            created_at: existing.created_at,
        };

        self.member_repository.update_member(&member).await?;

        info!("Updated member: {} with id: {}", member.name, member.id);

        Ok(member)
    }

    /// Delete a member; their loan history disappears with them
    pub async fn delete_member(&self, member_id: i64) -> Result<()> {
        info!("Deleting member: {}", member_id);

        // Verify the member exists
        let member = self
            .member_repository
            .get_member(member_id)
            .await?
            .ok_or_else(|| LibraryError::NotFound(format!("Member not found: {}", member_id)))?;

        self.member_repository.delete_member(member_id).await?;

        info!("Deleted member: {} with id: {}", member.name, member.id);

        Ok(())
    }

    /// Validate member fields shared by add and update
    fn validate_member_fields(&self, name: &str, email: &str) -> Result<()> {
        if name.trim().is_empty() {
            warn!("Rejected member: empty name");
            return Err(LibraryError::Validation(
                "Member name cannot be empty".to_string(),
            ));
        }

        if email.trim().is_empty() {
            warn!("Rejected member: empty email");
            return Err(LibraryError::Validation(
                "Member email cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Blank or whitespace-only phone numbers are stored as missing
fn normalize_phone(phone: Option<&str>) -> Option<String> {
    phone
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
}
